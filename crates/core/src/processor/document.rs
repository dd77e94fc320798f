//! Document modality processor.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::services::DocumentParser;
use crate::submission::Blob;

use super::error::ProcessError;
use super::formats::resolve_format;
use super::types::{ProcessedDocument, ProcessingOptions};

/// Turns one raw document blob into a [`ProcessedDocument`].
///
/// Format resolution never fails (unmapped types become `Unknown`); the
/// parser call is a single optional step populating text, metadata, and
/// structure together or not at all.
pub struct DocumentProcessor {
    parser: Arc<dyn DocumentParser>,
}

impl DocumentProcessor {
    /// Create a processor backed by the given parser collaborator.
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self { parser }
    }

    /// Process one document blob.
    pub async fn process(
        &self,
        blob: &Blob,
        options: &ProcessingOptions,
    ) -> Result<(ProcessedDocument, Vec<String>), ProcessError> {
        let id = Uuid::new_v4();
        let mut warnings = Vec::new();

        let format = resolve_format(blob);
        debug!(document_id = %id, format = format.as_str(), "Resolved document format");

        let mut document = ProcessedDocument {
            id,
            byte_size: blob.byte_size(),
            format,
            page_count: None,
            extracted_text: None,
            doc_metadata: None,
            structure: None,
        };

        if options.enable_document_extraction {
            match self.parser.extract(&blob.data, format.mime_type()).await {
                Ok(extraction) => {
                    document.extracted_text = Some(extraction.text);
                    document.doc_metadata = Some(extraction.metadata);
                    document.structure = Some(extraction.structure);
                    document.page_count = extraction.page_count;
                }
                Err(e) => {
                    warnings.push(format!("Document extraction failed: {}", e));
                }
            }
        }

        Ok((document, warnings))
    }
}
