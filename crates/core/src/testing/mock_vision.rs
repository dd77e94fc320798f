//! Mock vision analysis for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{ImageFeatures, VisionAnalysis, VisionError};

use super::fixtures;

/// Mock implementation of the [`VisionAnalysis`] trait.
///
/// Provides controllable behavior for testing:
/// - Canned features, globally or keyed by payload length
/// - One-shot error injection
/// - Optional artificial delay
/// - Recorded call payload sizes for assertions
pub struct MockVisionAnalysis {
    features: RwLock<ImageFeatures>,
    features_by_len: RwLock<HashMap<usize, ImageFeatures>>,
    next_error: RwLock<Option<VisionError>>,
    error_by_len: RwLock<HashMap<usize, VisionError>>,
    delay: RwLock<Option<Duration>>,
    calls: RwLock<Vec<usize>>,
}

impl Default for MockVisionAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVisionAnalysis {
    /// Create a mock returning canned fixture features.
    pub fn new() -> Self {
        Self {
            features: RwLock::new(fixtures::image_features()),
            features_by_len: RwLock::new(HashMap::new()),
            next_error: RwLock::new(None),
            error_by_len: RwLock::new(HashMap::new()),
            delay: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Replace the canned features.
    pub async fn set_features(&self, features: ImageFeatures) {
        *self.features.write().await = features;
    }

    /// Return specific features for payloads of the given length.
    pub async fn set_features_for_len(&self, len: usize, features: ImageFeatures) {
        self.features_by_len.write().await.insert(len, features);
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: VisionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail every call whose payload has the given length.
    pub async fn set_error_for_len(&self, len: usize, error: VisionError) {
        self.error_by_len.write().await.insert(len, error);
    }

    /// Delay every call by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Payload sizes of recorded calls, in call order.
    pub async fn recorded_payload_sizes(&self) -> Vec<usize> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl VisionAnalysis for MockVisionAnalysis {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, image: &[u8]) -> Result<ImageFeatures, VisionError> {
        self.calls.write().await.push(image.len());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(error) = self.error_by_len.write().await.remove(&image.len()) {
            return Err(error);
        }
        if let Some(features) = self.features_by_len.read().await.get(&image.len()) {
            return Ok(features.clone());
        }

        Ok(self.features.read().await.clone())
    }
}
