// Shelfmark platform paths
// Resolves where settings and the library database live on each OS.
//
// `SHELFMARK_DATA_DIR` overrides both directories, which keeps tests and
// portable installs out of the user's profile.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Environment variable that relocates all Shelfmark files.
pub const DATA_DIR_ENV: &str = "SHELFMARK_DATA_DIR";

/// File name of the SQLite store inside the data directory.
pub const DATABASE_FILE: &str = "shelfmark.db";

fn override_dir() -> Option<PathBuf> {
    env::var(DATA_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Returns the configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/shelfmark` or `~/.config/shelfmark`
/// - **macOS**: `~/Library/Preferences/Shelfmark`
/// - **Windows**: `%APPDATA%/Shelfmark/config`
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = override_dir() {
        return dir;
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory holding the library database.
///
/// - **Linux**: `$XDG_DATA_HOME/shelfmark` or `~/.local/share/shelfmark`
/// - **macOS**: `~/Library/Application Support/Shelfmark`
/// - **Windows**: `%APPDATA%/Shelfmark/data`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = override_dir() {
        return dir;
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Full path of the library database.
pub fn database_path() -> PathBuf {
    get_data_dir().join(DATABASE_FILE)
}
