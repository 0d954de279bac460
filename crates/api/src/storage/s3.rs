//! S3 (or S3-compatible) object store.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{check_key, ObjectStore, StorageConfig, StorageError};

pub struct S3Store {
    client: Client,
    bucket: String,
    public_url: String,
}

impl S3Store {
    /// Build a client from the default AWS credential chain.
    ///
    /// A custom `S3_ENDPOINT` switches to path-style addressing, which
    /// MinIO and most S3-compatible services expect.
    ///
    /// # Panics
    ///
    /// Panics if no bucket is configured.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let bucket = config
            .s3_bucket
            .clone()
            .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3");

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.s3_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(bucket = %bucket, region = %config.s3_region, "S3 object store configured");

        Self {
            client: Client::from_conf(builder.build()),
            bucket,
            public_url: config.public_url.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn backend(&self) -> &'static str {
        "s3"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        check_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("put_object {key}: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        check_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(format!("get_object {key}: {e}"))
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("read body {key}: {e}")))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("delete_object {key}: {e}")))?;
        Ok(())
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_url)
    }
}
