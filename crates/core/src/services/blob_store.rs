//! Blob storage collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Opaque reference to a stored blob. The core never inspects its contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BlobRef(String);

impl BlobRef {
    /// Wrap an implementation-defined reference string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from blob storage.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The blob could not be stored.
    #[error("Failed to store blob: {0}")]
    StoreFailed(String),
}

/// A store that accepts bytes and hands back a retrievable reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the given bytes and return an opaque reference.
    async fn store(&self, bytes: &[u8]) -> Result<BlobRef, BlobStoreError>;
}

/// Content-addressed in-memory blob store.
///
/// References are the SHA-256 of the content, so storing the same bytes
/// twice yields the same reference and keeps a single copy.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored blob by reference.
    pub async fn get(&self, reference: &BlobRef) -> Option<Vec<u8>> {
        self.blobs.read().await.get(reference.as_str()).cloned()
    }

    /// Number of distinct blobs held.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(&self, bytes: &[u8]) -> Result<BlobRef, BlobStoreError> {
        let digest = Sha256::digest(bytes);
        let key = format!("{:x}", digest);
        self.blobs
            .write()
            .await
            .entry(key.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(BlobRef::new(key))
    }
}
