//! Object storage layer.
//!
//! A bucket is modelled as a flat key space of opaque byte payloads. The
//! `DocumentStore` adapter on top reads and writes whole JSON documents.

mod fs;
mod memory;
mod s3;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Bucket holding every persisted document.
pub const BUCKET: &str = "keh-tech-audit-tool";

/// Errors raised by a blob store or the JSON document adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read object {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write object {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("object {key} is not a valid document: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("object store request for {key} failed: {message}")]
    Remote { key: String, message: String },
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Byte-level object store addressed by key within a single bucket.
///
/// Implementations never interpret the payload. A key that does not exist
/// is `Ok(None)`; every other failure is an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the full payload stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the payload stored under `key`, creating it if needed.
    async fn put(&self, key: &str, body: Vec<u8>) -> StorageResult<()>;
}

/// Reads and writes whole JSON documents through a [`BlobStore`].
///
/// There are no partial or conditional writes: `save` always overwrites the
/// object in full.
#[derive(Clone)]
pub struct DocumentStore {
    blobs: Arc<dyn BlobStore>,
}

impl DocumentStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Load the document at `key`, or `default()` if the object does not exist.
    pub async fn load<T, F>(&self, key: &str, default: F) -> StorageResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let Some(body) = self.blobs.get(key).await? else {
            tracing::debug!("Object {} not found, using default document", key);
            return Ok(default());
        };

        tracing::debug!("Loaded object {} ({} bytes)", key, body.len());
        serde_json::from_slice(&body).map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })
    }

    /// Serialize `value` with a 4-space indent and overwrite the object at `key`.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let body = to_pretty_json(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;

        tracing::debug!("Saving object {} ({} bytes)", key, body.len());
        self.blobs.put(key, body).await
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    value.serialize(&mut serializer)?;
    Ok(body)
}

/// Reject keys that could escape the bucket when mapped onto a path.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let invalid = key.is_empty()
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
