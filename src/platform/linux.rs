// Shelfmark paths on Linux, following the XDG base directory layout.

use std::env;
use std::path::PathBuf;

fn xdg_or_home(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("shelfmark"),
        _ => {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            fallback
                .iter()
                .fold(PathBuf::from(home), |p, s| p.join(s))
                .join("shelfmark")
        }
    }
}

/// `$XDG_CONFIG_HOME/shelfmark`, else `~/.config/shelfmark`.
pub fn get_config_dir() -> PathBuf {
    xdg_or_home("XDG_CONFIG_HOME", &[".config"])
}

/// `$XDG_DATA_HOME/shelfmark`, else `~/.local/share/shelfmark`.
pub fn get_data_dir() -> PathBuf {
    xdg_or_home("XDG_DATA_HOME", &[".local", "share"])
}
