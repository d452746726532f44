//! Minimal WebDAV client used as a remote file store.
//!
//! Only the verbs needed to mirror one JSON document are implemented:
//! GET, PUT, MKCOL, DELETE and a depth-0 PROPFIND used as a connection test.

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::errors::SyncError;
use crate::types::settings::SyncSettings;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROPFIND_BODY: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
<d:propfind xmlns:d=\"DAV:\"><d:prop><d:resourcetype/></d:prop></d:propfind>";

/// Basic-auth credentials; wiped from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WebDavCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for WebDavCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// WebDAV client bound to a base collection URL.
pub struct WebDavClient {
    http: Client,
    base_url: Url,
    credentials: WebDavCredentials,
}

impl WebDavClient {
    /// Creates a client for `base_url`. The URL is treated as a collection,
    /// so a trailing slash is added when missing.
    pub fn new(base_url: &str, credentials: WebDavCredentials) -> Result<Self, SyncError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| SyncError::NetworkError(format!("invalid server url: {}", e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SyncError::NetworkError(format!(
                "unsupported scheme: {}",
                base.scheme()
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("shelfmark/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base,
            credentials,
        })
    }

    /// Builds a client from the sync settings, or `NotConfigured`.
    pub fn from_settings(settings: &SyncSettings) -> Result<Self, SyncError> {
        if !settings.is_configured() {
            return Err(SyncError::NotConfigured);
        }
        Self::new(
            &settings.url,
            WebDavCredentials {
                username: settings.username.clone(),
                password: settings.password.clone(),
            },
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SyncError::NetworkError(format!("invalid remote path '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SyncError> {
        let url = self.url_for(path)?;
        debug!("webdav {} {}", method, url);
        let mut req = self.http.request(method, url);
        if !self.credentials.username.is_empty() {
            req = req.basic_auth(&self.credentials.username, Some(&self.credentials.password));
        }
        Ok(req)
    }

    fn check_status(status: StatusCode) -> Result<(), SyncError> {
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(SyncError::AuthFailed)
        } else {
            Err(SyncError::HttpStatus(status.as_u16()))
        }
    }

    /// Downloads a file. A missing file is `Ok(None)`.
    pub async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, SyncError> {
        let resp = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check_status(resp.status())?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    /// Uploads a file, replacing any existing content.
    pub async fn put(&self, path: &str, body: Vec<u8>) -> Result<(), SyncError> {
        let resp = self
            .request(Method::PUT, path)?
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        Self::check_status(resp.status())
    }

    /// Creates a collection. 405 (already exists) and 409 (some servers'
    /// answer for an existing or not yet creatable collection) are not errors;
    /// a PUT into a collection that is really missing still fails.
    pub async fn mkcol(&self, path: &str) -> Result<(), SyncError> {
        let method = Method::from_bytes(b"MKCOL")
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        let dir = format!("{}/", path.trim_matches('/'));
        let resp = self
            .request(method, &dir)?
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        if matches!(resp.status(), StatusCode::METHOD_NOT_ALLOWED | StatusCode::CONFLICT) {
            debug!("collection {} not created: {}", dir, resp.status());
            return Ok(());
        }
        Self::check_status(resp.status())
    }

    /// Creates every collection along `path`, parents first.
    pub async fn ensure_collection(&self, path: &str) -> Result<(), SyncError> {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.mkcol(&current).await?;
        }
        Ok(())
    }

    /// Deletes a file or collection. Deleting something absent succeeds.
    pub async fn delete(&self, path: &str) -> Result<(), SyncError> {
        let resp = self
            .request(Method::DELETE, path)?
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(resp.status())
    }

    /// Depth-0 PROPFIND. Returns whether the resource exists.
    pub async fn propfind(&self, path: &str) -> Result<bool, SyncError> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        let resp = self
            .request(method, path)?
            .header("Depth", "0")
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(PROPFIND_BODY)
            .send()
            .await
            .map_err(|e| SyncError::NetworkError(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check_status(resp.status())?;
        Ok(true)
    }
}
