//! Persistence layer.
//!
//! Projects and autocomplete tags are each kept as a single JSON document in
//! the bucket and rewritten in full on every change.

mod projects;
mod registry;

pub use projects::*;
pub use registry::*;

use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::storage::{
    BlobStore, FsBlobStore, MemoryBlobStore, S3BlobStore, StorageError, BUCKET,
};

/// Object key of the project collection.
pub const PROJECTS_KEY: &str = "new_project_data.json";
/// Object key of the autocomplete registry.
pub const TAGS_KEY: &str = "array_data.json";

/// Open the blob store selected by the configuration.
pub async fn init_store(config: &Config) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.store_backend {
        StoreBackend::S3 => {
            let store = S3BlobStore::connect(BUCKET, config.region.as_deref()).await;
            tracing::info!("Using S3 bucket {}", store.bucket());
            Ok(Arc::new(store))
        }
        StoreBackend::Fs => {
            let store = FsBlobStore::open(&config.data_dir, BUCKET).await?;
            tracing::info!("Using filesystem bucket at {:?}", store.root());
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory bucket; data is lost on restart");
            Ok(Arc::new(MemoryBlobStore::new()))
        }
    }
}
