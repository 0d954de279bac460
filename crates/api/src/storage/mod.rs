//! Object storage for photos and generated PDFs.
//!
//! Handlers depend on the [`ObjectStore`] trait; [`build_store`] picks the
//! backend from configuration at startup.

pub mod local;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

pub use local::LocalStore;
pub use s3::S3Store;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A flat key/value blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logging (`local`, `s3`).
    fn backend(&self) -> &'static str;

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL under which the object is served.
    fn url(&self, key: &str) -> String;
}

/// Reject keys that could escape the store root.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the local backend.
    pub local_root: String,
    /// Base URL objects are served from.
    pub public_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible services.
    pub s3_endpoint: Option<String>,
}

impl StorageConfig {
    /// Load from environment variables.
    ///
    /// | Env Var              | Default                          |
    /// |----------------------|----------------------------------|
    /// | `STORAGE_BACKEND`    | `local` (`local` or `s3`)        |
    /// | `STORAGE_LOCAL_ROOT` | `./storage`                      |
    /// | `STORAGE_PUBLIC_URL` | `http://localhost:3000/files`    |
    /// | `S3_BUCKET`          | required when backend is `s3`    |
    /// | `S3_REGION`          | `ap-southeast-2`                 |
    /// | `S3_ENDPOINT`        | unset (AWS)                      |
    ///
    /// # Panics
    ///
    /// Panics on an unknown backend or an `s3` backend without a bucket.
    pub fn from_env() -> Self {
        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "local" => StorageBackend::Local,
            "s3" => StorageBackend::S3,
            other => panic!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let s3_bucket = std::env::var("S3_BUCKET").ok().filter(|b| !b.is_empty());
        if backend == StorageBackend::S3 {
            assert!(
                s3_bucket.is_some(),
                "S3_BUCKET must be set when STORAGE_BACKEND=s3"
            );
        }

        Self {
            backend,
            local_root: std::env::var("STORAGE_LOCAL_ROOT")
                .unwrap_or_else(|_| "./storage".into()),
            public_url: std::env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".into())
                .trim_end_matches('/')
                .to_string(),
            s3_bucket,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-2".into()),
            s3_endpoint: std::env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty()),
        }
    }
}

/// Construct the configured backend.
pub async fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalStore::new(&config.local_root, &config.public_url)),
        StorageBackend::S3 => Arc::new(S3Store::from_config(config).await),
    }
}
