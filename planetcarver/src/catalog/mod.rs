//! Remote extract catalog client
//!
//! Finished extracts are registered with a mapping service so downstream
//! import jobs can discover them. The service exposes a small REST surface;
//! this module pins it down to a statically-typed [`Catalog`] trait with a
//! concrete HTTP implementation, so the rest of the crate never sees
//! transport details.

use crate::tile::Tile;
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default HTTP request timeout for catalog calls.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Errors reported by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Catalog request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Catalog returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
    },

    /// The extract file could not be read for upload.
    #[error("Failed to read extract {path}: {source}")]
    ReadExtract {
        /// Extract path
        path: std::path::PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Boxed future returned by [`Catalog`] operations.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// A catalogued planet-dump record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRecord {
    /// Tile the dump covers
    pub tile: Tile,
    /// Service-side identifier of the dump
    pub id: u64,
}

/// Remote catalog of finished extracts.
///
/// Two operations, mirroring the mapping service's API: look up the dump
/// registered for a tile, and upload a freshly finished extract.
pub trait Catalog: Send + Sync + 'static {
    /// Returns the catalogued dump for `tile`, or `None` if the service
    /// has no record of it.
    fn get_dump(&self, tile: Tile) -> CatalogFuture<'_, Option<DumpRecord>>;

    /// Uploads the extract at `path` as the dump for `tile`.
    fn upload_dump<'a>(&'a self, tile: Tile, path: &'a Path) -> CatalogFuture<'a, ()>;
}

/// HTTP implementation of [`Catalog`] against a mapping service.
///
/// Authenticates every request with HTTP basic auth.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpCatalog {
    /// Creates a client for the service at `base_url` (no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("planetcarver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        })
    }

    fn dumps_url(&self) -> String {
        format!("{}/api/v1/planet_dumps", self.base_url)
    }
}

impl Catalog for HttpCatalog {
    fn get_dump(&self, tile: Tile) -> CatalogFuture<'_, Option<DumpRecord>> {
        Box::pin(async move {
            let url = format!(
                "{}?z={}&x={}&y={}",
                self.dumps_url(),
                tile.z,
                tile.x,
                tile.y
            );
            let response = self
                .client
                .get(&url)
                .basic_auth(&self.username, Some(&self.password))
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                return Err(CatalogError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }

            let body: DumpResponse = response
                .json()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;
            Ok(Some(DumpRecord { tile, id: body.id }))
        })
    }

    fn upload_dump<'a>(&'a self, tile: Tile, path: &'a Path) -> CatalogFuture<'a, ()> {
        Box::pin(async move {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| CatalogError::ReadExtract {
                    path: path.to_path_buf(),
                    source,
                })?;

            debug!(%tile, bytes = bytes.len(), "uploading dump to catalog");

            let url = format!(
                "{}?z={}&x={}&y={}",
                self.dumps_url(),
                tile.z,
                tile.x,
                tile.y
            );
            let response = self
                .client
                .post(&url)
                .basic_auth(&self.username, Some(&self.password))
                .body(bytes)
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(CatalogError::Status {
                    status: response.status().as_u16(),
                    url,
                });
            }
            Ok(())
        })
    }
}

/// Wire shape of a dump record as returned by the mapping service.
#[derive(Debug, Deserialize)]
struct DumpResponse {
    id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let catalog = HttpCatalog::new("https://mapping.example/", "user", "pass").unwrap();
        assert_eq!(
            catalog.dumps_url(),
            "https://mapping.example/api/v1/planet_dumps"
        );
    }

    #[test]
    fn test_dump_response_deserializes() {
        let record: DumpResponse = serde_json::from_str(r#"{"id": 42, "z": 3}"#).unwrap();
        assert_eq!(record.id, 42);
    }
}
