//! RPC method handler for the Shelfmark JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a call to the managers and services behind the
//! `App`. Network calls (sync) run on the supplied tokio runtime with the app
//! lock released.

use std::sync::Mutex;
use std::time::Instant;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::runtime::Handle;

use crate::app::App;
use crate::managers::bookmark_manager::{parse_tags, BookmarkManager, BookmarkManagerTrait};
use crate::managers::folder_manager::{FolderManager, FolderManagerTrait};
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::storage_service::{ImportMode, StorageServiceTrait};
use crate::services::sync_service::SyncService;
use crate::services::{filter_engine, stats, tag_index, tag_suggester, view_builder};
use crate::types::bookmark::BookmarkDraft;
use crate::types::settings::{AppSettings, SyncSettings};
use crate::types::sync::{SyncMode, SyncReport};
use crate::types::view::{BookmarkFilter, Layout};

const PASSWORD_MASK: &str = "********";

fn param_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn param_u64(params: &Value, key: &str) -> Result<u64, String> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| format!("missing {}", key))
}

fn opt_u64(params: &Value, key: &str) -> Option<u64> {
    params.get(key).and_then(|v| v.as_u64())
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| format!("invalid params: {}", e))
}

/// Bookmark fields from params. `tags` may be an array or a comma-separated string.
fn draft_from(params: &Value) -> Result<BookmarkDraft, String> {
    let mut value = params.clone();
    if let Some(Value::String(raw)) = params.get("tags") {
        value["tags"] = json!(parse_tags(raw));
    }
    parse(value)
}

fn masked_sync(sync: &SyncSettings) -> Value {
    let mut value = json!(sync);
    if !sync.password.is_empty() {
        value["password"] = json!(PASSWORD_MASK);
    }
    value
}

fn masked_settings(settings: &AppSettings) -> Value {
    let mut value = json!(settings);
    value["sync"] = masked_sync(&settings.sync);
    value
}

/// Filter for card views: fields the caller leaves out come from settings.
fn view_filter(params: &Value, settings: &AppSettings) -> Result<BookmarkFilter, String> {
    let mut filter: BookmarkFilter = parse(params.clone())?;
    if params.get("scope").is_none() {
        filter.scope = settings.general.default_scope;
    }
    if params.get("sort").is_none() {
        filter.sort = settings.general.sort_order;
    }
    if params.get("limit").is_none() {
        filter.limit = Some(settings.general.page_size);
    }
    Ok(filter)
}

/// Runs one sync against the configured server.
///
/// The library is cloned under the lock, the network exchange runs unlocked,
/// and the result is applied under the lock again. Edits made in between are
/// superseded by a download or merge result.
pub async fn run_sync(app: &Mutex<App>, mode: SyncMode) -> Result<SyncReport, String> {
    let (settings, local) = {
        let a = app.lock().map_err(|e| e.to_string())?;
        (a.settings().sync.clone(), a.library.clone())
    };

    let outcome = match SyncService::from_settings(&settings) {
        Ok(service) => service.sync(&local, mode).await,
        Err(e) => Err(e),
    };

    let mut a = app.lock().map_err(|e| e.to_string())?;
    match outcome {
        Ok((library, report)) => {
            a.apply_sync_result(library, &report)
                .map_err(|e| e.to_string())?;
            Ok(report)
        }
        Err(e) => {
            a.record_sync_error(&e);
            Err(e.to_string())
        }
    }
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(
    app: &Mutex<App>,
    rt: &Handle,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "bookmark.add" => {
            let draft = draft_from(params)?;
            let allow_duplicate = params
                .get("allow_duplicate")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = BookmarkManager::new(&mut a.library);
            if !allow_duplicate {
                if let Some(url) = &draft.url {
                    if let Some(existing) = mgr.find_by_url(url) {
                        return Err(format!("Bookmark already exists: {}", existing.id));
                    }
                }
            }
            let id = mgr.add_bookmark(draft).map_err(|e| e.to_string())?;
            let bookmark = json!(mgr.get_bookmark(id).map_err(|e| e.to_string())?);
            a.mark_dirty(Instant::now());
            Ok(bookmark)
        }
        "bookmark.update" => {
            let id = param_u64(params, "id")?;
            let draft = draft_from(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = BookmarkManager::new(&mut a.library);
            mgr.update_bookmark(id, draft).map_err(|e| e.to_string())?;
            let bookmark = json!(mgr.get_bookmark(id).map_err(|e| e.to_string())?);
            a.mark_dirty(Instant::now());
            Ok(bookmark)
        }
        "bookmark.delete" => {
            let id = param_u64(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = BookmarkManager::new(&mut a.library)
                .remove_bookmark(id)
                .map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!(removed))
        }
        "bookmark.get" => {
            let id = param_u64(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mgr = BookmarkManager::new(&mut a.library);
            let bookmark = mgr.get_bookmark(id).map_err(|e| e.to_string())?;
            Ok(json!(bookmark))
        }
        "bookmark.list" => {
            let filter: BookmarkFilter = parse(params.clone())?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let result = filter_engine::apply(&a.library.bookmarks, &filter, Utc::now());
            Ok(json!(result))
        }
        "bookmark.favorite" => {
            let id = param_u64(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let favorite = BookmarkManager::new(&mut a.library)
                .toggle_favorite(id)
                .map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"id": id, "favorite": favorite}))
        }
        "bookmark.visit" => {
            let id = param_u64(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let visited = BookmarkManager::new(&mut a.library)
                .record_visit(id)
                .map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"id": id, "visited": visited}))
        }
        "bookmark.move" => {
            let id = param_u64(params, "id")?;
            let folder = params.get("folder").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            BookmarkManager::new(&mut a.library)
                .move_bookmark(id, folder)
                .map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"ok": true}))
        }

        // ─── Folders ───
        "folder.create" => {
            let name = param_str(params, "name")?;
            let parent = opt_u64(params, "parent");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = FolderManager::new(&mut a.library);
            let id = mgr.create_folder(name, parent).map_err(|e| e.to_string())?;
            let path = mgr.folder_path(id).map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"id": id, "path": path}))
        }
        "folder.rename" => {
            let id = param_u64(params, "id")?;
            let name = param_str(params, "name")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = FolderManager::new(&mut a.library);
            mgr.rename_folder(id, name).map_err(|e| e.to_string())?;
            let path = mgr.folder_path(id).map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"id": id, "path": path}))
        }
        "folder.move" => {
            let id = param_u64(params, "id")?;
            let parent = opt_u64(params, "parent");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut mgr = FolderManager::new(&mut a.library);
            mgr.move_folder(id, parent).map_err(|e| e.to_string())?;
            let path = mgr.folder_path(id).map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"id": id, "path": path}))
        }
        "folder.delete" => {
            let id = param_u64(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let moved = FolderManager::new(&mut a.library)
                .delete_folder(id)
                .map_err(|e| e.to_string())?;
            a.mark_dirty(Instant::now());
            Ok(json!({"ok": true, "moved": moved}))
        }
        "folder.tree" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mgr = FolderManager::new(&mut a.library);
            Ok(json!({"tree": mgr.tree(), "flat": mgr.flatten()}))
        }

        // ─── Tags ───
        "tag.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(tag_index::compute_tags(&a.library.bookmarks)))
        }
        "tag.rename" => {
            let from = param_str(params, "from")?;
            let to = param_str(params, "to")?;
            if to.trim().is_empty() {
                return Err("tag name cannot be empty".to_string());
            }
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let touched = tag_index::rename_tag(&mut a.library, from, to);
            if touched > 0 {
                a.mark_dirty(Instant::now());
            }
            Ok(json!({"touched": touched}))
        }
        "tag.delete" => {
            let name = param_str(params, "name")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let touched = tag_index::delete_tag(&mut a.library, name);
            if touched > 0 {
                a.mark_dirty(Instant::now());
            }
            Ok(json!({"touched": touched}))
        }
        "tag.suggest" => {
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let url = params.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let description = params.get("description").and_then(|v| v.as_str()).unwrap_or("");
            Ok(json!(tag_suggester::suggest(title, url, description)))
        }

        // ─── Stats & views ───
        "stats.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(stats::compute(&a.library, Utc::now())))
        }
        "view.cards" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings();
            let filter = view_filter(params, settings)?;
            let layout: Layout = match params.get("layout") {
                Some(v) => parse(v.clone())?,
                None => settings.appearance.layout,
            };
            let now = Utc::now();
            let page = filter_engine::apply(&a.library.bookmarks, &filter, now);
            let cards = view_builder::cards(
                &page.items,
                layout,
                settings.appearance.show_screenshots,
                now,
            );
            Ok(json!({
                "cards": cards,
                "total": page.total,
                "offset": filter.offset,
                "layout": layout,
            }))
        }
        "view.sidebar" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(view_builder::sidebar(&a.library)))
        }

        // ─── Storage ───
        "storage.save" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let checksum = a.flush().map_err(|e| e.to_string())?;
            Ok(json!({"checksum": checksum}))
        }
        "storage.backup" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let info = a.create_backup().map_err(|e| e.to_string())?;
            Ok(json!({"created": info.is_some(), "backup": info}))
        }
        "storage.backups" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let list = a.storage().list_backups().map_err(|e| e.to_string())?;
            Ok(json!(list))
        }
        "storage.restore" => {
            let id = param_str(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.restore_backup(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "bookmarks": a.library.bookmarks.len()}))
        }
        "storage.export" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let text = a.storage().export_json(&a.library).map_err(|e| e.to_string())?;
            Ok(json!({"json": text}))
        }
        "storage.import" => {
            let text = param_str(params, "json")?;
            let mode: ImportMode = match params.get("mode") {
                Some(v) => parse(v.clone())?,
                None => ImportMode::Merge,
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let (library, stats) = a
                .storage()
                .import_json(&a.library, text, mode)
                .map_err(|e| e.to_string())?;
            a.replace_library(library).map_err(|e| e.to_string())?;
            Ok(json!(stats))
        }

        // ─── Sync ───
        "sync.configure" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let mut settings = a.settings().clone();
            let mut merged = json!(settings.sync);
            if let Value::Object(fields) = params {
                for (key, value) in fields {
                    if merged.get(key).is_none() {
                        return Err(format!("Invalid settings key: sync.{}", key));
                    }
                    // The masked value echoes back from the UI unchanged
                    if key == "password" && value.as_str() == Some(PASSWORD_MASK) {
                        continue;
                    }
                    merged[key.as_str()] = value.clone();
                }
            }
            settings.sync = parse(merged)?;
            a.settings_engine.replace(settings).map_err(|e| e.to_string())?;
            Ok(masked_sync(&a.settings().sync))
        }
        "sync.test" => {
            let settings = {
                let a = app.lock().map_err(|e| e.to_string())?;
                a.settings().sync.clone()
            };
            let service = SyncService::from_settings(&settings).map_err(|e| e.to_string())?;
            let reachable = rt
                .block_on(service.test_connection())
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": reachable, "remote_file": service.remote_file()}))
        }
        "sync.run" => {
            let mode: SyncMode = match params.get("mode") {
                Some(v) => parse(v.clone())?,
                None => SyncMode::Merge,
            };
            let report = rt.block_on(run_sync(app, mode))?;
            Ok(json!(report))
        }
        "sync.status" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.sync_status().map_err(|e| e.to_string())?))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(masked_settings(a.settings()))
        }
        "settings.set" => {
            let key = param_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(masked_settings(a.settings()))
        }

        // ─── Shortcuts ───
        "shortcuts.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!(a.shortcut_manager.list_shortcuts()))
        }
        "shortcuts.set" => {
            let action = param_str(params, "action")?;
            let keys = param_str(params, "keys")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            // Empty keys clear the binding
            let changed = if keys.trim().is_empty() {
                a.shortcut_manager.unregister_shortcut(action)
            } else {
                a.shortcut_manager.register_shortcut(action, keys)
            };
            changed.map_err(|e| e.to_string())?;
            let mut settings = a.settings().clone();
            settings.shortcuts = a.shortcut_manager.list_shortcuts().clone();
            a.settings_engine.replace(settings).map_err(|e| e.to_string())?;
            Ok(json!(a.shortcut_manager.list_shortcuts()))
        }
        "shortcuts.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.shortcut_manager.reset_to_defaults();
            let mut settings = a.settings().clone();
            settings.shortcuts = AppSettings::default_shortcuts();
            a.settings_engine.replace(settings).map_err(|e| e.to_string())?;
            Ok(json!(a.shortcut_manager.list_shortcuts()))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
