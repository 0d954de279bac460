//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{check_key, ObjectStore, StorageError};

/// Stores objects as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_url: String,
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>, public_url: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let len = bytes.len();
        fs::write(&path, bytes).await?;
        tracing::debug!(key, bytes = len, "Wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn temp_store() -> LocalStore {
        let root = std::env::temp_dir().join(format!("roofline-store-{}", uuid::Uuid::new_v4()));
        LocalStore::new(root, "http://files.test/")
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = temp_store();
        let key = "reports/7/photos/abc.jpg";

        store.put(key, b"jpeg-bytes".to_vec(), "image/jpeg").await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), b"jpeg-bytes");

        store.delete(key).await.unwrap();
        assert_matches!(store.get(key).await, Err(StorageError::NotFound(_)));
        // Second delete is a no-op.
        store.delete(key).await.unwrap();
    }

    #[test]
    fn url_joins_public_base() {
        let store = temp_store();
        assert_eq!(
            store.url("reports/7/photos/abc.jpg"),
            "http://files.test/reports/7/photos/abc.jpg"
        );
    }

    #[tokio::test]
    async fn traversal_rejected() {
        let store = temp_store();
        assert_matches!(
            store.put("../escape.txt", vec![1], "text/plain").await,
            Err(StorageError::InvalidKey(_))
        );
    }
}
