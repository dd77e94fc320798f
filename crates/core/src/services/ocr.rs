//! OCR collaborator.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::metrics;

use super::ServiceEndpoint;

/// Errors from the OCR service.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The service could not be reached or returned a failure.
    #[error("OCR service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The image contains no recognizable text.
    #[error("No text found in image")]
    NoTextFound,
}

/// A service that extracts embedded text from an image.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Extract text from one image.
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    text: String,
}

/// Networked OCR client.
pub struct HttpOcrService {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpOcrService {
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
impl OcrService for HttpOcrService {
    fn name(&self) -> &str {
        "http"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let url = format!("{}/v1/ocr", self.endpoint.base_url());
        debug!(bytes = image.len(), "Requesting OCR");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| {
                metrics::COLLABORATOR_REQUESTS
                    .with_label_values(&["ocr", "error"])
                    .inc();
                OcrError::ServiceUnavailable(e.to_string())
            })?;

        // The service signals "nothing to read" with 404 rather than an
        // empty payload.
        if response.status() == StatusCode::NOT_FOUND {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["ocr", "no_text"])
                .inc();
            return Err(OcrError::NoTextFound);
        }

        if !response.status().is_success() {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["ocr", "error"])
                .inc();
            return Err(OcrError::ServiceUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .json::<OcrResponse>()
            .await
            .map_err(|e| OcrError::ServiceUnavailable(format!("Invalid response: {}", e)))?;

        if body.text.trim().is_empty() {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["ocr", "no_text"])
                .inc();
            return Err(OcrError::NoTextFound);
        }

        metrics::COLLABORATOR_REQUESTS
            .with_label_values(&["ocr", "success"])
            .inc();

        Ok(body.text)
    }
}
