//! S3 blob store.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client as S3Client};

use super::{BlobStore, StorageError, StorageResult};

/// Blob store backed by a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client from the default AWS credential chain, pinned to
    /// `region` when one is given.
    pub async fn connect(bucket: &str, region: Option<&str>) -> Self {
        let aws_config = if let Some(region) = region {
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_sdk_s3::config::Region::new(region.to_string()))
                .load()
                .await
        } else {
            aws_config::load_defaults(BehaviorVersion::latest()).await
        };

        Self::with_client(S3Client::new(&aws_config), bucket)
    }

    pub fn with_client(client: S3Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(None)
            }
            Err(err) => {
                return Err(StorageError::Remote {
                    key: key.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                })
            }
        };

        let body = response
            .body
            .collect()
            .await
            .map_err(|err| StorageError::Remote {
                key: key.to_string(),
                message: err.to_string(),
            })?
            .into_bytes()
            .to_vec();
        Ok(Some(body))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> StorageResult<()> {
        tracing::debug!(bucket = %self.bucket, key = %key, size = body.len(), "Uploading object to S3");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StorageError::Remote {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}
