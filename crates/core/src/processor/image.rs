//! Image modality processor.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::ImageFormat;
use tracing::debug;
use uuid::Uuid;

use crate::services::{BlobStore, OcrService, VisionAnalysis};
use crate::submission::Blob;

use super::error::ProcessError;
use super::types::{ProcessedImage, ProcessingOptions, ThumbnailSet};

/// Bounding-box edge lengths of the three thumbnail tiers.
const THUMBNAIL_EDGES: [u32; 3] = [128, 512, 1024];

/// Turns one raw image blob into a [`ProcessedImage`].
///
/// Dimension decoding and thumbnail generation are required steps; vision
/// analysis and OCR are optional enrichment that degrade to warnings.
pub struct ImageProcessor {
    vision: Arc<dyn VisionAnalysis>,
    ocr: Arc<dyn OcrService>,
    blobs: Arc<dyn BlobStore>,
}

impl ImageProcessor {
    /// Create a processor backed by the given collaborators.
    pub fn new(
        vision: Arc<dyn VisionAnalysis>,
        ocr: Arc<dyn OcrService>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self { vision, ocr, blobs }
    }

    /// Process one image blob.
    pub async fn process(
        &self,
        blob: &Blob,
        options: &ProcessingOptions,
    ) -> Result<(ProcessedImage, Vec<String>), ProcessError> {
        let id = Uuid::new_v4();
        let mut warnings = Vec::new();

        let decoded = image::load_from_memory(&blob.data)
            .map_err(|e| ProcessError::decode("image", e.to_string()))?;
        let format = image::guess_format(&blob.data)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("unknown")
            .to_string();

        debug!(
            image_id = %id,
            format,
            width = decoded.width(),
            height = decoded.height(),
            "Decoded image"
        );

        let (features, extracted_text) = if options.enable_image_analysis {
            // The two collaborators fail independently; neither outcome
            // affects the other or the item.
            let (vision_result, ocr_result) = tokio::join!(
                self.vision.analyze(&blob.data),
                self.ocr.extract_text(&blob.data)
            );

            let features = match vision_result {
                Ok(features) => Some(features),
                Err(e) => {
                    warnings.push(format!("Vision analysis failed: {}", e));
                    None
                }
            };
            let text = match ocr_result {
                Ok(text) => Some(text),
                Err(e) => {
                    warnings.push(format!("OCR failed: {}", e));
                    None
                }
            };
            (features, text)
        } else {
            (None, None)
        };

        let thumbnails = self.generate_thumbnails(&decoded).await?;

        Ok((
            ProcessedImage {
                id,
                byte_size: blob.byte_size(),
                format,
                width: decoded.width(),
                height: decoded.height(),
                extracted_text,
                features,
                thumbnails: Some(thumbnails),
            },
            warnings,
        ))
    }

    /// Generate and store the three-tier thumbnail set.
    async fn generate_thumbnails(
        &self,
        decoded: &image::DynamicImage,
    ) -> Result<ThumbnailSet, ProcessError> {
        let mut refs = Vec::with_capacity(THUMBNAIL_EDGES.len());

        for edge in THUMBNAIL_EDGES {
            let thumbnail = decoded.resize(edge, edge, FilterType::Lanczos3);
            let mut encoded = Vec::new();
            thumbnail
                .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
                .map_err(|e| {
                    ProcessError::decode("image", format!("Thumbnail generation failed: {}", e))
                })?;

            let reference = self.blobs.store(&encoded).await.map_err(|e| {
                ProcessError::decode("image", format!("Thumbnail storage failed: {}", e))
            })?;
            refs.push(reference);
        }

        let mut refs = refs.into_iter();
        Ok(ThumbnailSet {
            small: refs.next().ok_or_else(|| {
                ProcessError::decode("image", "Missing thumbnail tier".to_string())
            })?,
            medium: refs.next().ok_or_else(|| {
                ProcessError::decode("image", "Missing thumbnail tier".to_string())
            })?,
            large: refs.next().ok_or_else(|| {
                ProcessError::decode("image", "Missing thumbnail tier".to_string())
            })?,
        })
    }
}
