//! Unit tests for the RPC handler: JSON-RPC methods dispatched by `handle_method`.
//!
//! These go through the same code path as the `shelfmark-rpc` binary, using a
//! temporary on-disk SQLite database and settings file.

#[path = "webdav_stub.rs"]
mod webdav_stub;

use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::runtime::Runtime;

use shelfmark::app::App;
use shelfmark::managers::folder_manager::{FolderManager, FolderManagerTrait};
use shelfmark::rpc_handler::handle_method;

struct Harness {
    app: Mutex<App>,
    rt: Runtime,
    _tmp: TempDir,
}

impl Harness {
    fn call(&self, method: &str, params: Value) -> Result<Value, String> {
        handle_method(&self.app, self.rt.handle(), method, &params)
    }

    fn ok(&self, method: &str, params: Value) -> Value {
        self.call(method, params)
            .unwrap_or_else(|e| panic!("{} failed: {}", method, e))
    }

    fn add(&self, url: &str, extra: Value) -> u64 {
        let mut params = json!({"url": url, "title": url});
        if let (Value::Object(p), Value::Object(e)) = (&mut params, extra) {
            p.extend(e);
        }
        self.ok("bookmark.add", params)["id"].as_u64().unwrap()
    }

    /// Creates every folder along `path`.
    fn mkdir(&self, path: &str) {
        let mut a = self.app.lock().unwrap();
        FolderManager::new(&mut a.library).ensure_path(path).unwrap();
    }
}

/// Create a fresh App backed by a temp directory.
fn setup() -> Harness {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let settings_path = tmp.path().join("settings.json");
    let app = App::new(
        db_path.to_str().unwrap(),
        Some(settings_path.to_string_lossy().to_string()),
    )
    .expect("Failed to init App");
    Harness {
        app: Mutex::new(app),
        rt: Runtime::new().unwrap(),
        _tmp: tmp,
    }
}

// ─── Ping ───

#[test]
fn test_ping() {
    let h = setup();
    let res = h.ok("ping", json!({}));
    assert_eq!(res["pong"], json!(true));
    assert!(res["version"].is_string());
}

#[test]
fn test_unknown_method_returns_error() {
    let h = setup();
    let err = h.call("nonexistent.method", json!({})).unwrap_err();
    assert!(err.contains("unknown method"));
}

// ─── Bookmarks ───

#[test]
fn test_bookmark_add_and_list() {
    let h = setup();
    let res = h.ok(
        "bookmark.add",
        json!({"url": "example.com", "title": "Example", "tags": "news, Daily"}),
    );
    assert_eq!(res["id"], json!(1));
    assert_eq!(res["url"], json!("https://example.com"));
    assert_eq!(res["tags"], json!(["news", "Daily"]));

    let list = h.ok("bookmark.list", json!({}));
    assert_eq!(list["total"], json!(1));
    assert_eq!(list["items"][0]["title"], json!("Example"));
}

#[test]
fn test_bookmark_add_rejects_duplicate_url() {
    let h = setup();
    h.add("https://example.com", json!({}));
    let err = h.call("bookmark.add", json!({"url": "https://example.com/"})).unwrap_err();
    assert!(err.contains("already exists"));
    let err = h.call("bookmark.add", json!({"url": "example.com"})).unwrap_err();
    assert!(err.contains("already exists"));

    let res = h.ok(
        "bookmark.add",
        json!({"url": "https://example.com", "allow_duplicate": true}),
    );
    assert_eq!(res["id"], json!(2));
}

#[test]
fn test_bookmark_add_invalid_url() {
    let h = setup();
    assert!(h.call("bookmark.add", json!({"url": "javascript:alert(1)"})).is_err());
    assert!(h.call("bookmark.add", json!({"title": "no url"})).is_err());
}

#[test]
fn test_bookmark_update_get_delete() {
    let h = setup();
    let id = h.add("https://example.com", json!({}));

    let updated = h.ok(
        "bookmark.update",
        json!({"id": id, "title": "Renamed", "description": "  notes  "}),
    );
    assert_eq!(updated["title"], json!("Renamed"));
    assert_eq!(updated["description"], json!("notes"));

    let got = h.ok("bookmark.get", json!({"id": id}));
    assert_eq!(got["title"], json!("Renamed"));

    let removed = h.ok("bookmark.delete", json!({"id": id}));
    assert_eq!(removed["id"], json!(id));
    assert!(h.call("bookmark.get", json!({"id": id})).is_err());
    assert!(h.call("bookmark.delete", json!({"id": id})).is_err());
}

#[test]
fn test_bookmark_favorite_and_visit() {
    let h = setup();
    let id = h.add("https://example.com", json!({}));

    assert_eq!(h.ok("bookmark.favorite", json!({"id": id}))["favorite"], json!(true));
    assert_eq!(h.ok("bookmark.favorite", json!({"id": id}))["favorite"], json!(false));

    h.ok("bookmark.visit", json!({"id": id}));
    let res = h.ok("bookmark.visit", json!({"id": id}));
    assert_eq!(res["visited"], json!(2));
}

#[test]
fn test_bookmark_move_requires_existing_folder() {
    let h = setup();
    let id = h.add("https://example.com", json!({}));
    assert!(h.call("bookmark.move", json!({"id": id, "folder": "Work/Reading"})).is_err());

    h.mkdir("Work/Reading");
    h.ok("bookmark.move", json!({"id": id, "folder": "Work/Reading"}));

    let got = h.ok("bookmark.get", json!({"id": id}));
    assert_eq!(got["folder"], json!("Work/Reading"));
    let tree = h.ok("folder.tree", json!({}));
    assert_eq!(tree["flat"].as_array().unwrap().len(), 2);
}

#[test]
fn test_bookmark_list_filters_by_folder_and_query() {
    let h = setup();
    h.mkdir("Dev/Rust");
    h.add("https://rust-lang.org", json!({"folder": "Dev/Rust"}));
    h.add("https://python.org", json!({"folder": "Dev"}));
    h.add("https://news.ycombinator.com", json!({}));

    assert_eq!(h.ok("bookmark.list", json!({"folder": "Dev"}))["total"], json!(2));
    assert_eq!(h.ok("bookmark.list", json!({"folder": "Dev/Rust"}))["total"], json!(1));
    assert_eq!(h.ok("bookmark.list", json!({"query": "python"}))["total"], json!(1));
}

// ─── Folders ───

#[test]
fn test_folder_create_rename_move_delete() {
    let h = setup();
    let work = h.ok("folder.create", json!({"name": "Work"}));
    let work_id = work["id"].as_u64().unwrap();
    assert_eq!(work["path"], json!("Work"));

    let sub = h.ok("folder.create", json!({"name": "Docs", "parent": work_id}));
    let sub_id = sub["id"].as_u64().unwrap();
    assert_eq!(sub["path"], json!("Work/Docs"));

    h.add("https://docs.rs", json!({"folder": "Work/Docs"}));

    let renamed = h.ok("folder.rename", json!({"id": work_id, "name": "Job"}));
    assert_eq!(renamed["path"], json!("Job"));
    let bookmark = h.ok("bookmark.get", json!({"id": 1}));
    assert_eq!(bookmark["folder"], json!("Job/Docs"));

    let moved = h.ok("folder.move", json!({"id": sub_id}));
    assert_eq!(moved["path"], json!("Docs"));

    let deleted = h.ok("folder.delete", json!({"id": sub_id}));
    assert_eq!(deleted["moved"], json!(1));
    let bookmark = h.ok("bookmark.get", json!({"id": 1}));
    assert_eq!(bookmark["folder"], json!(""));
}

#[test]
fn test_folder_create_rejects_duplicate_sibling() {
    let h = setup();
    h.ok("folder.create", json!({"name": "Work"}));
    assert!(h.call("folder.create", json!({"name": "Work"})).is_err());
    assert!(h.call("folder.create", json!({"name": "a/b"})).is_err());
    assert!(h.call("folder.create", json!({})).is_err());
}

// ─── Tags ───

#[test]
fn test_tag_list_rename_delete() {
    let h = setup();
    h.add("https://a.com", json!({"tags": ["rust", "web"]}));
    h.add("https://b.com", json!({"tags": ["rust"]}));

    let tags = h.ok("tag.list", json!({}));
    let rust = tags
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == json!("rust"))
        .unwrap();
    assert_eq!(rust["count"], json!(2));

    assert_eq!(h.ok("tag.rename", json!({"from": "rust", "to": "rustlang"}))["touched"], json!(2));
    assert_eq!(h.ok("tag.delete", json!({"name": "web"}))["touched"], json!(1));
    assert!(h.call("tag.rename", json!({"from": "rustlang", "to": " "})).is_err());

    let names: Vec<Value> = h
        .ok("tag.list", json!({}))
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("rustlang")]);
}

#[test]
fn test_tag_suggest() {
    let h = setup();
    let res = h.ok(
        "tag.suggest",
        json!({"title": "Rust tutorial", "url": "https://github.com/rust-lang/rust"}),
    );
    assert!(res.is_array());
}

// ─── Stats & views ───

#[test]
fn test_stats_get() {
    let h = setup();
    h.mkdir("Work");
    let id = h.add("https://a.com", json!({"tags": ["x"], "folder": "Work"}));
    h.add("https://b.com", json!({}));
    h.ok("bookmark.favorite", json!({"id": id}));

    let stats = h.ok("stats.get", json!({}));
    assert_eq!(stats["total_bookmarks"], json!(2));
    assert_eq!(stats["favorites"], json!(1));
    assert_eq!(stats["folders"], json!(1));
    assert_eq!(stats["untagged"], json!(1));
    assert_eq!(stats["added_this_week"], json!(2));
}

#[test]
fn test_view_cards_uses_settings_defaults() {
    let h = setup();
    h.add("https://a.com", json!({}));
    h.add("https://b.com", json!({}));

    let view = h.ok("view.cards", json!({}));
    assert_eq!(view["total"], json!(2));
    assert_eq!(view["layout"], json!("grid"));
    assert!(view["cards"][0]["domain"].is_string());

    h.ok("settings.set", json!({"key": "appearance.layout", "value": "list"}));
    let view = h.ok("view.cards", json!({"limit": 1}));
    assert_eq!(view["layout"], json!("list"));
    assert_eq!(view["cards"].as_array().unwrap().len(), 1);
    assert_eq!(view["total"], json!(2));
}

#[test]
fn test_view_sidebar_counts() {
    let h = setup();
    h.mkdir("Work/Docs");
    h.add("https://a.com", json!({"folder": "Work/Docs"}));
    h.add("https://b.com", json!({"folder": "Work"}));
    h.add("https://c.com", json!({}));

    let sidebar = h.ok("view.sidebar", json!({}));
    assert_eq!(sidebar["total"], json!(3));
    assert_eq!(sidebar["unfiled"], json!(1));
    assert_eq!(sidebar["folders"][0]["total_count"], json!(2));
    assert_eq!(sidebar["folders"][0]["direct_count"], json!(1));
}

// ─── Storage ───

#[test]
fn test_storage_save_backup_restore() {
    let h = setup();
    h.add("https://a.com", json!({}));
    let saved = h.ok("storage.save", json!({}));
    assert!(saved["checksum"].is_string());

    let backup = h.ok("storage.backup", json!({}));
    assert_eq!(backup["created"], json!(true));
    let backup_id = backup["backup"]["id"].as_str().unwrap().to_string();
    // Nothing changed, so no second snapshot
    assert_eq!(h.ok("storage.backup", json!({}))["created"], json!(false));

    h.add("https://b.com", json!({}));
    let restored = h.ok("storage.restore", json!({"id": backup_id}));
    assert_eq!(restored["bookmarks"], json!(1));
    assert_eq!(h.ok("bookmark.list", json!({}))["total"], json!(1));

    // Restoring snapshots the two-bookmark state first
    let backups = h.ok("storage.backups", json!({}));
    assert_eq!(backups.as_array().unwrap().len(), 2);
    assert!(h.call("storage.restore", json!({"id": "missing"})).is_err());
}

#[test]
fn test_storage_export_import() {
    let h = setup();
    h.mkdir("Work");
    h.add("https://a.com", json!({"folder": "Work"}));
    let exported = h.ok("storage.export", json!({}));
    let text = exported["json"].as_str().unwrap().to_string();

    let other = setup();
    other.add("https://b.com", json!({}));
    let stats = other.ok("storage.import", json!({"json": text}));
    assert_eq!(stats["added"], json!(1));
    assert_eq!(other.ok("bookmark.list", json!({}))["total"], json!(2));

    other.ok("storage.import", json!({"json": text, "mode": "replace"}));
    assert_eq!(other.ok("bookmark.list", json!({}))["total"], json!(1));

    assert!(other.call("storage.import", json!({"json": "not json"})).is_err());
    assert!(other.call("storage.import", json!({"json": text, "mode": "append"})).is_err());
}

// ─── Settings ───

#[test]
fn test_settings_get_set_reset() {
    let h = setup();
    let settings = h.ok("settings.get", json!({}));
    assert_eq!(settings["appearance"]["layout"], json!("grid"));

    h.ok("settings.set", json!({"key": "storage.max_backups", "value": 3}));
    assert_eq!(h.ok("settings.get", json!({}))["storage"]["max_backups"], json!(3));

    assert!(h.call("settings.set", json!({"key": "bogus.key", "value": 1})).is_err());
    assert!(h.call("settings.set", json!({"key": "storage.max_backups", "value": "many"})).is_err());
    assert!(h.call("settings.set", json!({"key": "storage.max_backups"})).is_err());

    let reset = h.ok("settings.reset", json!({}));
    assert_eq!(reset["storage"]["max_backups"], json!(5));
}

#[test]
fn test_sync_configure_masks_password() {
    let h = setup();
    let res = h.ok(
        "sync.configure",
        json!({"enabled": true, "url": "https://dav.example.com/", "username": "me", "password": "hunter2"}),
    );
    assert_eq!(res["password"], json!("********"));
    assert_eq!(h.ok("settings.get", json!({}))["sync"]["password"], json!("********"));

    // Echoing the mask back keeps the stored password
    h.ok("sync.configure", json!({"password": "********", "username": "you"}));
    let a = h.app.lock().unwrap();
    assert_eq!(a.settings().sync.password, "hunter2");
    assert_eq!(a.settings().sync.username, "you");
    drop(a);

    assert!(h.call("sync.configure", json!({"nope": 1})).is_err());
}

// ─── Shortcuts ───

#[test]
fn test_shortcuts_set_and_reset() {
    let h = setup();
    let list = h.ok("shortcuts.list", json!({}));
    assert!(list.get("search").is_some());

    let list = h.ok("shortcuts.set", json!({"action": "custom", "keys": "Alt+Q"}));
    assert!(list.get("custom").is_some());

    // Already bound to another action
    let taken = h.ok("shortcuts.list", json!({}))["search"].as_str().unwrap().to_string();
    assert!(h.call("shortcuts.set", json!({"action": "custom", "keys": taken})).is_err());

    let list = h.ok("shortcuts.set", json!({"action": "custom", "keys": ""}));
    assert!(list.get("custom").is_none());

    h.ok("shortcuts.set", json!({"action": "another", "keys": "Alt+W"}));
    let list = h.ok("shortcuts.reset", json!({}));
    assert!(list.get("another").is_none());
    assert!(list.get("search").is_some());
}

// ─── Sync ───

#[test]
fn test_sync_status_and_unconfigured_run() {
    let h = setup();
    let status = h.ok("sync.status", json!({}));
    assert_eq!(status["configured"], json!(false));
    assert!(status["last_synced_at"].is_null());

    let err = h.call("sync.run", json!({})).unwrap_err();
    assert!(err.contains("not configured"));
    let status = h.ok("sync.status", json!({}));
    assert!(status["last_error"].is_string());
}

#[test]
fn test_sync_run_against_server() {
    let h = setup();
    let stub = h.rt.block_on(webdav_stub::start("user", "pass"));
    h.ok(
        "sync.configure",
        json!({"enabled": true, "url": stub.base_url, "username": "user", "password": "pass"}),
    );
    assert_eq!(h.ok("sync.test", json!({}))["ok"], json!(true));

    h.add("https://a.com", json!({}));
    let report = h.ok("sync.run", json!({"mode": "upload"}));
    assert_eq!(report["uploaded"], json!(1));
    assert!(stub.state.file("dav/shelfmark/bookmarks.json").is_some());

    // Remote gains a bookmark from another device
    let other = setup();
    other.add("https://b.com", json!({}));
    let remote_text = other.ok("storage.export", json!({}))["json"].as_str().unwrap().to_string();
    stub.state
        .seed("dav/shelfmark/bookmarks.json", remote_text.into_bytes());

    let report = h.ok("sync.run", json!({"mode": "merge"}));
    assert_eq!(report["downloaded"], json!(1));
    assert_eq!(h.ok("bookmark.list", json!({}))["total"], json!(2));

    let status = h.ok("sync.status", json!({}));
    assert_eq!(status["configured"], json!(true));
    assert!(status["last_synced_at"].is_string());
    assert!(status["last_error"].is_null());
}

#[test]
fn test_download_of_empty_remote_backs_up_local_first() {
    let h = setup();
    let stub = h.rt.block_on(webdav_stub::start("user", "pass"));
    h.ok(
        "sync.configure",
        json!({"enabled": true, "url": stub.base_url, "username": "user", "password": "pass"}),
    );
    let empty = setup();
    let empty_text = empty.ok("storage.export", json!({}))["json"].as_str().unwrap().to_string();
    stub.state
        .seed("dav/shelfmark/bookmarks.json", empty_text.into_bytes());

    h.add("https://a.com", json!({}));
    h.add("https://b.com", json!({}));
    let report = h.ok("sync.run", json!({"mode": "download"}));
    assert_eq!(report["downloaded"], json!(0));
    assert_eq!(report["remote_found"], json!(true));
    assert_eq!(h.ok("bookmark.list", json!({}))["total"], json!(0));

    let backups = h.ok("storage.backups", json!({}));
    assert_eq!(backups.as_array().unwrap().len(), 1);
    assert_eq!(backups[0]["bookmark_count"], json!(2));
}
