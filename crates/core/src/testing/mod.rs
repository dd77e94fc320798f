//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all external collaborator
//! traits, allowing comprehensive pipeline testing without real
//! infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use intake_core::testing::{MockOcrService, MockVisionAnalysis};
//!
//! let ocr = MockOcrService::new();
//! ocr.set_text("hello from the mock").await;
//! ocr.set_next_error(OcrError::NoTextFound).await;
//!
//! // Use in a ProcessingOrchestrator...
//! ```

mod mock_blob_store;
mod mock_document_parser;
mod mock_ocr;
mod mock_speech;
mod mock_vision;

pub use mock_blob_store::MockBlobStore;
pub use mock_document_parser::MockDocumentParser;
pub use mock_ocr::MockOcrService;
pub use mock_speech::MockSpeechToText;
pub use mock_vision::MockVisionAnalysis;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use crate::services::{DocMetadata, DocumentExtraction, DocumentStructure, ImageFeatures};
    use crate::submission::{Blob, MultiModalInput};

    /// Encode a valid PNG of the given dimensions.
    pub fn png_image(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut encoded = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .expect("PNG encoding of a generated image cannot fail");
        encoded
    }

    /// Encode a mono 16-bit WAV holding a sine tone.
    pub fn wav_tone(freq: f64, secs: f64, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut encoded = Cursor::new(Vec::new());
        {
            let mut writer =
                hound::WavWriter::new(&mut encoded, spec).expect("WAV header write cannot fail");
            let count = (secs * sample_rate as f64) as usize;
            for i in 0..count {
                let sample = (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64)
                    .sin();
                writer
                    .write_sample((sample * 0.6 * i16::MAX as f64) as i16)
                    .expect("WAV sample write cannot fail");
            }
            writer.finalize().expect("WAV finalize cannot fail");
        }
        encoded.into_inner()
    }

    /// Encode a mono 16-bit WAV of silence.
    pub fn wav_silence(secs: f64, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut encoded = Cursor::new(Vec::new());
        {
            let mut writer =
                hound::WavWriter::new(&mut encoded, spec).expect("WAV header write cannot fail");
            for _ in 0..(secs * sample_rate as f64) as usize {
                writer.write_sample(0i16).expect("WAV sample write cannot fail");
            }
            writer.finalize().expect("WAV finalize cannot fail");
        }
        encoded.into_inner()
    }

    /// A submission holding one generated PNG.
    pub fn image_input(width: u32, height: u32) -> MultiModalInput {
        MultiModalInput::new().with_image(Blob::new(png_image(width, height)))
    }

    /// A submission holding one generated WAV tone.
    pub fn audio_input(secs: f64) -> MultiModalInput {
        MultiModalInput::new().with_audio(Blob::new(wav_tone(440.0, secs, 8000)))
    }

    /// A submission holding one PDF-tagged document.
    pub fn document_input(body: &str) -> MultiModalInput {
        MultiModalInput::new().with_document(
            Blob::new(format!("%PDF-1.7\n{}", body).into_bytes())
                .with_content_type("application/pdf"),
        )
    }

    /// Canned vision features with reasonable defaults.
    pub fn image_features() -> ImageFeatures {
        ImageFeatures {
            dominant_colors: vec!["#336699".to_string(), "#ffffff".to_string()],
            objects: Some(vec!["desk".to_string(), "lamp".to_string()]),
            face_count: Some(0),
            tags: Some(vec!["indoor".to_string()]),
            categories: Some(vec!["office".to_string()]),
            description: Some("A desk with a lamp".to_string()),
            confidence: Some(0.92),
        }
    }

    /// Canned document extraction around the given body text.
    pub fn document_extraction(text: &str) -> DocumentExtraction {
        DocumentExtraction {
            text: text.to_string(),
            metadata: DocMetadata {
                title: Some("Quarterly Report".to_string()),
                author: Some("Test Author".to_string()),
                word_count: Some(text.split_whitespace().count() as u64),
                ..DocMetadata::default()
            },
            structure: DocumentStructure {
                headings: vec!["Introduction".to_string(), "Results".to_string()],
                tables: 1,
                embedded_image_refs: vec![],
                links: vec!["https://example.com".to_string()],
            },
            page_count: Some(3),
        }
    }
}
