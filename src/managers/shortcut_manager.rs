//! Shortcut Manager for Shelfmark.
//!
//! Keeps the keyboard bindings the front-end installs (new bookmark, search,
//! layout toggle, sync, ...) with conflict detection and platform-specific
//! modifier key adaptation.

use std::collections::HashMap;

use crate::types::errors::ShortcutError;
use crate::types::settings::AppSettings;

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, action: &str) -> Option<&str>;
    fn list_shortcuts(&self) -> &HashMap<String, String>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String>;
    fn get_default_shortcuts(&self) -> HashMap<String, String>;
}

/// Shortcut manager with in-memory storage and platform adaptation.
pub struct ShortcutManager {
    shortcuts: HashMap<String, String>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        let mut mgr = Self {
            shortcuts: HashMap::new(),
        };
        mgr.shortcuts = mgr.get_default_shortcuts();
        mgr
    }

    /// Builds a manager from persisted bindings (e.g. the settings file).
    pub fn from_bindings(bindings: &HashMap<String, String>) -> Self {
        let shortcuts = bindings
            .iter()
            .filter(|(_, keys)| !keys.trim().is_empty())
            .map(|(action, keys)| (action.clone(), Self::adapt_for_platform(keys)))
            .collect();
        Self { shortcuts }
    }

    /// Adapts modifier keys for the current platform.
    fn adapt_for_platform(keys: &str) -> String {
        if cfg!(target_os = "macos") {
            keys.replace("Ctrl+", "Cmd+")
        } else {
            keys.to_string()
        }
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, action: &str, keys: &str) -> Result<(), ShortcutError> {
        if keys.trim().is_empty() {
            return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
        }
        if keys.ends_with('+') || keys.starts_with('+') {
            return Err(ShortcutError::InvalidKeys(keys.to_string()));
        }

        if let Some(conflicting_action) = self.has_conflict(keys, Some(action)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                keys, conflicting_action
            )));
        }

        let adapted = Self::adapt_for_platform(keys);
        self.shortcuts.insert(action.to_string(), adapted);
        Ok(())
    }

    fn unregister_shortcut(&mut self, action: &str) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(action)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(action.to_string()))
    }

    fn get_shortcut(&self, action: &str) -> Option<&str> {
        self.shortcuts.get(action).map(|s| s.as_str())
    }

    fn list_shortcuts(&self) -> &HashMap<String, String> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = self.get_default_shortcuts();
    }

    fn has_conflict(&self, keys: &str, exclude_action: Option<&str>) -> Option<String> {
        let adapted = Self::adapt_for_platform(keys);
        self.shortcuts
            .iter()
            .find(|(action, bound)| {
                bound.eq_ignore_ascii_case(&adapted) && Some(action.as_str()) != exclude_action
            })
            .map(|(action, _)| action.clone())
    }

    fn get_default_shortcuts(&self) -> HashMap<String, String> {
        AppSettings::default_shortcuts()
            .into_iter()
            .map(|(a, k)| (a, Self::adapt_for_platform(&k)))
            .collect()
    }
}
