//! Document parsing collaborator.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::metrics;

use super::ServiceEndpoint;

/// Document properties reported by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

/// Structural outline of a parsed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentStructure {
    /// Heading texts in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,
    /// Number of tables found.
    #[serde(default)]
    pub tables: u32,
    /// References to images embedded in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedded_image_refs: Vec<String>,
    /// Hyperlinks found in the document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

/// Everything the parser returns for one document, in a single call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub text: String,
    #[serde(default)]
    pub metadata: DocMetadata,
    #[serde(default)]
    pub structure: DocumentStructure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Errors from the document parser service.
#[derive(Debug, Error)]
pub enum DocumentParserError {
    /// The parser does not understand this format.
    #[error("Unsupported document format: {format}")]
    UnsupportedFormat { format: String },

    /// The document is recognized but could not be parsed.
    #[error("Document parse error: {0}")]
    ParseError(String),
}

/// A service that extracts text, metadata, and structure from a document.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Parse one document. `mime_type` is the resolved canonical MIME type.
    async fn extract(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<DocumentExtraction, DocumentParserError>;
}

/// Networked document parser client.
pub struct HttpDocumentParser {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpDocumentParser {
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
impl DocumentParser for HttpDocumentParser {
    fn name(&self) -> &str {
        "http"
    }

    async fn extract(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<DocumentExtraction, DocumentParserError> {
        let url = format!("{}/v1/extract", self.endpoint.base_url());
        debug!(bytes = document.len(), mime_type, "Requesting document extraction");

        let response = self
            .client
            .post(&url)
            .header("content-type", mime_type.to_string())
            .body(document.to_vec())
            .send()
            .await
            .map_err(|e| {
                metrics::COLLABORATOR_REQUESTS
                    .with_label_values(&["document_parser", "error"])
                    .inc();
                DocumentParserError::ParseError(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["document_parser", "unsupported"])
                .inc();
            return Err(DocumentParserError::UnsupportedFormat {
                format: mime_type.to_string(),
            });
        }

        if !status.is_success() {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["document_parser", "error"])
                .inc();
            return Err(DocumentParserError::ParseError(format!("HTTP {}", status)));
        }

        let extraction = response
            .json::<DocumentExtraction>()
            .await
            .map_err(|e| DocumentParserError::ParseError(format!("Invalid response: {}", e)))?;

        metrics::COLLABORATOR_REQUESTS
            .with_label_values(&["document_parser", "success"])
            .inc();

        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_deserialization_with_defaults() {
        let extraction: DocumentExtraction =
            serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(extraction.text, "hello");
        assert!(extraction.metadata.title.is_none());
        assert_eq!(extraction.structure.tables, 0);
        assert!(extraction.page_count.is_none());
    }
}
