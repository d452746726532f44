//! Unit tests for the settings engine against on-disk files.

use serde_json::json;
use tempfile::TempDir;

use shelfmark::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use shelfmark::types::errors::SettingsError;
use shelfmark::types::settings::{AppSettings, ThemeMode};
use shelfmark::types::view::{SortOrder, ViewScope};

fn engine() -> (SettingsEngine, TempDir) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("conf").join("settings.json");
    (SettingsEngine::new(Some(path.to_string_lossy().to_string())), tmp)
}

#[test]
fn test_missing_file_yields_defaults() {
    let (mut engine, _tmp) = engine();
    let loaded = engine.load().unwrap();
    assert_eq!(loaded, AppSettings::default());
    assert_eq!(loaded.general.page_size, 50);
    assert_eq!(loaded.storage.max_backups, 5);
    assert_eq!(loaded.sync.remote_path, "shelfmark");
    assert_eq!(loaded.shortcuts.get("search").map(String::as_str), Some("Ctrl+K"));
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let (mut engine, _tmp) = engine();
    let path = engine.get_config_path().to_string();
    std::fs::create_dir_all(std::path::Path::new(&path).parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_set_value_persists_and_reloads() {
    let (mut engine, _tmp) = engine();
    engine.load().unwrap();
    engine.set_value("general.page_size", json!(25)).unwrap();
    engine.set_value("general.default_scope", json!("favorites")).unwrap();
    engine.set_value("general.sort_order", json!("title_asc")).unwrap();
    engine.set_value("appearance.theme", json!("Dark")).unwrap();
    engine.set_value("sync.url", json!("https://dav.example.com/")).unwrap();
    engine.set_value("shortcuts.search", json!("Ctrl+F")).unwrap();

    let mut reloaded = SettingsEngine::new(Some(engine.get_config_path().to_string()));
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.general.page_size, 25);
    assert_eq!(settings.general.default_scope, ViewScope::Favorites);
    assert_eq!(settings.general.sort_order, SortOrder::TitleAsc);
    assert_eq!(settings.appearance.theme, ThemeMode::Dark);
    assert_eq!(settings.sync.url, "https://dav.example.com/");
    assert_eq!(settings.shortcuts["search"], "Ctrl+F");
}

#[test]
fn test_set_value_wrong_type_is_rejected_and_state_kept() {
    let (mut engine, _tmp) = engine();
    engine.load().unwrap();
    let result = engine.set_value("appearance.show_screenshots", json!("sometimes"));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert!(engine.get_settings().appearance.show_screenshots);
}

#[test]
fn test_set_value_unknown_key_is_rejected() {
    let (mut engine, _tmp) = engine();
    engine.load().unwrap();
    assert!(matches!(
        engine.set_value("general.nonexistent", json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("shortcuts.unknown_action", json!("Ctrl+U")),
        Err(SettingsError::InvalidKey(_))
    ));
}

#[test]
fn test_reset_restores_defaults_on_disk() {
    let (mut engine, _tmp) = engine();
    engine.load().unwrap();
    engine.set_value("storage.max_backups", json!(12)).unwrap();
    engine.reset().unwrap();

    let mut reloaded = SettingsEngine::new(Some(engine.get_config_path().to_string()));
    assert_eq!(reloaded.load().unwrap(), AppSettings::default());
}
