//! Mock blob store for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::services::{BlobRef, BlobStore, BlobStoreError};

/// Mock implementation of the [`BlobStore`] trait.
///
/// Hands out sequential references without retaining the bytes, and can be
/// told to fail the next store.
pub struct MockBlobStore {
    counter: AtomicU64,
    stored_sizes: RwLock<Vec<usize>>,
    next_error: RwLock<Option<BlobStoreError>>,
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBlobStore {
    /// Create a fresh mock store.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            stored_sizes: RwLock::new(Vec::new()),
            next_error: RwLock::new(None),
        }
    }

    /// Configure the next store to fail with the given error.
    pub async fn set_next_error(&self, error: BlobStoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of successful stores so far.
    pub async fn store_count(&self) -> usize {
        self.stored_sizes.read().await.len()
    }

    /// Payload sizes of successful stores, in call order.
    pub async fn stored_sizes(&self) -> Vec<usize> {
        self.stored_sizes.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn store(&self, bytes: &[u8]) -> Result<BlobRef, BlobStoreError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        self.stored_sizes.write().await.push(bytes.len());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(BlobRef::new(format!("mock-blob-{}", n)))
    }
}
