// Integration tests for the WebDAV sync service against an in-process server.

#[path = "webdav_stub.rs"]
mod webdav_stub;

use shelfmark::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use shelfmark::managers::folder_manager::{FolderManager, FolderManagerTrait};
use shelfmark::services::storage_service::repair_library;
use shelfmark::services::sync_service::SyncService;
use shelfmark::services::webdav_client::{WebDavClient, WebDavCredentials};
use shelfmark::types::bookmark::BookmarkDraft;
use shelfmark::types::errors::SyncError;
use shelfmark::types::library::Library;
use shelfmark::types::settings::SyncSettings;
use shelfmark::types::sync::SyncMode;

const REMOTE_PATH: &str = "dav/shelfmark/bookmarks.json";

fn service(base_url: &str, password: &str) -> SyncService {
    let client = WebDavClient::new(
        base_url,
        WebDavCredentials {
            username: "user".to_string(),
            password: password.to_string(),
        },
    )
    .unwrap();
    SyncService::new(client, "shelfmark")
}

fn library(urls: &[(&str, &str)]) -> Library {
    let mut library = Library::default();
    for (_, folder) in urls {
        FolderManager::new(&mut library).ensure_path(folder).unwrap();
    }
    let mut mgr = BookmarkManager::new(&mut library);
    for (url, folder) in urls {
        mgr.add_bookmark(BookmarkDraft::new(url, url).with_folder(folder))
            .unwrap();
    }
    library
}

#[tokio::test]
async fn test_connection_checks_credentials() {
    let stub = webdav_stub::start("user", "pass").await;

    assert!(service(&stub.base_url, "pass").test_connection().await.unwrap());
    let err = service(&stub.base_url, "wrong").test_connection().await.unwrap_err();
    assert!(matches!(err, SyncError::AuthFailed));
}

#[tokio::test]
async fn test_upload_then_download_roundtrip() {
    let stub = webdav_stub::start("user", "pass").await;
    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://rust-lang.org", "Dev"), ("https://example.com", "")]);

    assert!(!sync.upload(&local).await.unwrap());
    assert!(stub.state.file(REMOTE_PATH).is_some());

    let remote = sync.download().await.unwrap().unwrap();
    assert_eq!(remote.bookmarks, local.bookmarks);
    assert_eq!(remote.folders, local.folders);
}

#[tokio::test]
async fn test_identical_upload_is_skipped() {
    let stub = webdav_stub::start("user", "pass").await;
    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://rust-lang.org", "")]);

    assert!(!sync.upload(&local).await.unwrap());
    assert!(sync.upload(&local).await.unwrap());
    assert_eq!(stub.state.put_count(), 1);
}

#[tokio::test]
async fn test_download_without_remote_keeps_local() {
    let stub = webdav_stub::start("user", "pass").await;
    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://rust-lang.org", "")]);

    assert!(sync.download().await.unwrap().is_none());
    let (result, report) = sync.sync(&local, SyncMode::Download).await.unwrap();
    assert_eq!(result, local);
    assert_eq!(report.downloaded, 0);
    assert_eq!(stub.state.put_count(), 0);
}

#[tokio::test]
async fn test_download_of_empty_remote_reports_it_was_found() {
    let stub = webdav_stub::start("user", "pass").await;
    stub.state
        .seed(REMOTE_PATH, serde_json::to_vec(&Library::default()).unwrap());

    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://a.com", ""), ("https://b.com", "")]);
    let (result, report) = sync.sync(&local, SyncMode::Download).await.unwrap();

    assert!(report.remote_found);
    assert_eq!(report.downloaded, 0);
    assert!(result.bookmarks.is_empty());

    // Nothing on a fresh server
    let empty = webdav_stub::start("user", "pass").await;
    let (_, report) = service(&empty.base_url, "pass")
        .sync(&local, SyncMode::Download)
        .await
        .unwrap();
    assert!(!report.remote_found);
}

#[tokio::test]
async fn test_upload_rewrites_remote_that_needs_repair() {
    let stub = webdav_stub::start("user", "pass").await;
    // Bookmark filed under a folder the stored tree lacks
    let raw = serde_json::json!({
        "version": 1,
        "bookmarks": [{"id": 1, "title": "a", "url": "https://a.com", "folder": "Work"}],
        "folders": []
    });
    stub.state.seed(REMOTE_PATH, serde_json::to_vec(&raw).unwrap());

    let stored: Library = serde_json::from_value(raw).unwrap();
    let local = repair_library(stored).unwrap();
    let sync = service(&stub.base_url, "pass");

    assert!(!sync.upload(&local).await.unwrap());
    assert_eq!(stub.state.put_count(), 1);
    let written: Library =
        serde_json::from_slice(&stub.state.file(REMOTE_PATH).unwrap()).unwrap();
    assert_eq!(written.folders.len(), 1);

    assert!(sync.upload(&local).await.unwrap());
    assert_eq!(stub.state.put_count(), 1);
}

#[tokio::test]
async fn test_download_replaces_local() {
    let stub = webdav_stub::start("user", "pass").await;
    let remote = library(&[("https://a.com", "Work"), ("https://b.com", "")]);
    stub.state
        .seed(REMOTE_PATH, serde_json::to_vec(&remote).unwrap());

    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://local-only.com", "")]);
    let (result, report) = sync.sync(&local, SyncMode::Download).await.unwrap();

    assert_eq!(report.mode, SyncMode::Download);
    assert_eq!(report.downloaded, 2);
    assert_eq!(result.bookmarks, remote.bookmarks);
    assert!(!report.checksum.is_empty());
    assert!(!report.synced_at.is_empty());
}

#[tokio::test]
async fn test_merge_writes_union_to_both_sides() {
    let stub = webdav_stub::start("user", "pass").await;
    let remote = library(&[("https://a.com", "Work"), ("https://b.com", "")]);
    stub.state
        .seed(REMOTE_PATH, serde_json::to_vec(&remote).unwrap());

    let sync = service(&stub.base_url, "pass");
    let local = library(&[("https://a.com", ""), ("https://c.com", "Reading")]);
    let (merged, report) = sync.sync(&local, SyncMode::Merge).await.unwrap();

    let mut urls: Vec<&str> = merged.bookmarks.iter().map(|b| b.url.as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.uploaded, 3);
    assert!(!report.upload_skipped);

    let written = sync.download().await.unwrap().unwrap();
    assert_eq!(written.bookmarks.len(), 3);

    // A second merge finds nothing new and leaves the remote alone
    let puts = stub.state.put_count();
    let (again, report) = sync.sync(&merged, SyncMode::Merge).await.unwrap();
    assert_eq!(again.bookmarks, merged.bookmarks);
    assert!(report.upload_skipped);
    assert_eq!(stub.state.put_count(), puts);
}

#[tokio::test]
async fn test_put_into_missing_collection_creates_it() {
    let stub = webdav_stub::start("user", "pass").await;
    let client = WebDavClient::new(
        &stub.base_url,
        WebDavCredentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        },
    )
    .unwrap();
    let sync = SyncService::new(client, "nested/deeper");
    sync.upload(&library(&[("https://a.com", "")])).await.unwrap();

    assert!(stub.state.file("dav/nested/deeper/bookmarks.json").is_some());
}

#[tokio::test]
async fn test_mkcol_tolerates_conflict_but_put_reports_it() {
    let stub = webdav_stub::start("user", "pass").await;
    let client = WebDavClient::new(
        &stub.base_url,
        WebDavCredentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        },
    )
    .unwrap();

    // Parent "missing" does not exist, so the server answers 409
    client.mkcol("missing/child").await.unwrap();
    let err = client
        .put("missing/child/file.json", b"{}".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::HttpStatus(409)));

    // Existing collection answers 405
    client.mkcol("present").await.unwrap();
    client.mkcol("present").await.unwrap();
}

#[test]
fn test_default_settings_are_not_configured() {
    let err = SyncService::from_settings(&SyncSettings::default()).err().unwrap();
    assert!(matches!(err, SyncError::NotConfigured));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port with nothing listening on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sync = service(&format!("http://{}/dav", addr), "pass");
    let err = sync.test_connection().await.unwrap_err();
    assert!(matches!(err, SyncError::NetworkError(_)));
}
