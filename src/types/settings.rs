use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::view::{Layout, SortOrder, ViewScope};

/// Top-level application settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub general: GeneralSettings,
    pub appearance: AppearanceSettings,
    pub storage: StorageSettings,
    pub sync: SyncSettings,
    pub shortcuts: HashMap<String, String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            appearance: AppearanceSettings::default(),
            storage: StorageSettings::default(),
            sync: SyncSettings::default(),
            shortcuts: Self::default_shortcuts(),
        }
    }
}

impl AppSettings {
    /// Returns the default keyboard shortcuts.
    pub fn default_shortcuts() -> HashMap<String, String> {
        let mut shortcuts = HashMap::new();
        shortcuts.insert("new_bookmark".to_string(), "Ctrl+D".to_string());
        shortcuts.insert("search".to_string(), "Ctrl+K".to_string());
        shortcuts.insert("toggle_layout".to_string(), "Ctrl+G".to_string());
        shortcuts.insert("new_folder".to_string(), "Ctrl+Shift+N".to_string());
        shortcuts.insert("favorites".to_string(), "Ctrl+Shift+F".to_string());
        shortcuts.insert("sync_now".to_string(), "Ctrl+Shift+S".to_string());
        shortcuts.insert("export".to_string(), "Ctrl+E".to_string());
        shortcuts.insert("import".to_string(), "Ctrl+I".to_string());
        shortcuts.insert("toggle_theme".to_string(), "Ctrl+Shift+L".to_string());
        shortcuts.insert("settings".to_string(), "Ctrl+Comma".to_string());
        shortcuts.insert("close_dialog".to_string(), "Escape".to_string());
        shortcuts
    }
}

/// What the main view shows on startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub default_scope: ViewScope,
    pub sort_order: SortOrder,
    pub page_size: usize,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_scope: ViewScope::All,
            sort_order: SortOrder::DateDesc,
            page_size: 50,
        }
    }
}

/// Appearance and visual settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub layout: Layout,
    #[serde(default = "default_true")]
    pub show_screenshots: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            layout: Layout::Grid,
            show_screenshots: true,
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}

/// Local persistence timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// Quiet period after the last edit before the library is written.
    pub save_debounce_ms: u64,
    /// How often a backup snapshot is taken while the app runs.
    pub backup_interval_secs: u64,
    /// Number of backup snapshots retained (oldest are pruned).
    pub max_backups: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            save_debounce_ms: 500,
            backup_interval_secs: 300,
            max_backups: 5,
        }
    }
}

/// WebDAV mirror configuration.
///
/// The password is kept in plain text in the settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    pub enabled: bool,
    pub url: String,
    pub username: String,
    pub password: String,
    pub remote_path: String,
    /// Upload after every flushed save.
    pub auto_sync: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            username: String::new(),
            password: String::new(),
            remote_path: "shelfmark".to_string(),
            auto_sync: false,
        }
    }
}

impl SyncSettings {
    /// Sync can run only when enabled and a server URL is present.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }
}
