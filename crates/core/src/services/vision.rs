//! Vision analysis collaborator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::metrics;

use super::ServiceEndpoint;

/// Features extracted from one image by the vision service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageFeatures {
    /// Dominant colors as hex strings, most dominant first.
    pub dominant_colors: Vec<String>,
    /// Detected object labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<String>>,
    /// Number of detected faces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_count: Option<u32>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Scene categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// One-sentence caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Errors from the vision analysis service.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The service could not be reached or returned a failure.
    #[error("Vision service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request exceeded the configured timeout.
    #[error("Vision analysis timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

/// A service that extracts visual features from an image.
#[async_trait]
pub trait VisionAnalysis: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Analyze one image and return its features.
    async fn analyze(&self, image: &[u8]) -> Result<ImageFeatures, VisionError>;
}

/// Networked vision analysis client.
pub struct HttpVisionAnalysis {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpVisionAnalysis {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }
}

#[async_trait]
impl VisionAnalysis for HttpVisionAnalysis {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(&self, image: &[u8]) -> Result<ImageFeatures, VisionError> {
        let url = format!("{}/v1/analyze", self.endpoint.base_url());
        debug!(bytes = image.len(), "Requesting vision analysis");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| {
                metrics::COLLABORATOR_REQUESTS
                    .with_label_values(&["vision", "error"])
                    .inc();
                if e.is_timeout() {
                    VisionError::Timeout {
                        timeout_secs: self.endpoint.timeout_secs,
                    }
                } else {
                    VisionError::ServiceUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["vision", "error"])
                .inc();
            return Err(VisionError::ServiceUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let features = response
            .json::<ImageFeatures>()
            .await
            .map_err(|e| VisionError::ServiceUnavailable(format!("Invalid response: {}", e)))?;

        metrics::COLLABORATOR_REQUESTS
            .with_label_values(&["vision", "success"])
            .inc();

        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_deserialization_tolerates_missing_fields() {
        let features: ImageFeatures =
            serde_json::from_str(r##"{"dominant_colors": ["#aabbcc"]}"##).unwrap();
        assert_eq!(features.dominant_colors, vec!["#aabbcc".to_string()]);
        assert!(features.objects.is_none());
        assert!(features.confidence.is_none());
    }
}
