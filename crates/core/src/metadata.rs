//! Aggregate metadata computation.
//!
//! Everything here is a deterministic function of the submission and its
//! processed content. The language detector is a character-class heuristic,
//! not a statistical model.

use crate::submission::{InputMetadata, ItemCounts, MultiModalInput, ProcessedContent};

/// Compute aggregate metadata for a fully joined submission.
///
/// Called by the orchestrator after the join barrier, so every per-modality
/// result has already settled.
pub fn aggregate(input: &MultiModalInput, content: &ProcessedContent) -> InputMetadata {
    InputMetadata {
        total_size: input.binary_size(),
        item_count: ItemCounts::of(input),
        processing_time_ms: None,
        token_estimate: Some(token_estimate(input, content)),
        language: Some(detect_language(input, content).to_string()),
        confidence: Some(confidence(input, content)),
    }
}

/// Rough token estimate for downstream AI consumers.
///
/// Text counts a token per four characters, each image a flat 1000, audio
/// 100 per started minute, and each document a token per four characters of
/// extracted text (zero when extraction is absent).
pub fn token_estimate(input: &MultiModalInput, content: &ProcessedContent) -> u64 {
    let mut estimate = 0u64;

    if let Some(text) = input.text.as_deref() {
        estimate += (text.chars().count() as u64).div_ceil(4);
    }

    estimate += 1000 * input.images.len() as u64;

    if let Some(audio) = &content.audio {
        estimate += (audio.duration_seconds / 60.0).ceil() as u64 * 100;
    }

    for document in &content.documents {
        if let Some(text) = document.extracted_text.as_deref() {
            estimate += (text.chars().count() as u64).div_ceil(4);
        }
    }

    estimate
}

/// Detect the dominant language over all textual material.
///
/// Concatenates the source text with every extracted and transcribed text,
/// then compares CJK-range codepoints against Latin-alphabet codepoints.
pub fn detect_language(input: &MultiModalInput, content: &ProcessedContent) -> &'static str {
    let mut cjk = 0usize;
    let mut latin = 0usize;

    let mut count = |text: &str| {
        for c in text.chars() {
            if is_cjk(c) {
                cjk += 1;
            } else if is_latin(c) {
                latin += 1;
            }
        }
    };

    if let Some(text) = input.text.as_deref() {
        count(text);
    }
    for image in &content.images {
        if let Some(text) = image.extracted_text.as_deref() {
            count(text);
        }
    }
    if let Some(audio) = &content.audio {
        if let Some(text) = audio.transcribed_text.as_deref() {
            count(text);
        }
    }
    for document in &content.documents {
        if let Some(text) = document.extracted_text.as_deref() {
            count(text);
        }
    }

    if cjk > latin {
        "zh-CN"
    } else if latin > 0 {
        "en-US"
    } else {
        "unknown"
    }
}

/// Enrichment confidence in `[0.5, 1.0]`.
///
/// Base 0.5, plus 0.2 for present text, 0.2 scaled by the fraction of
/// images carrying features, 0.1 for a transcribed audio recording, and 0.2
/// scaled by the fraction of documents carrying extracted text.
pub fn confidence(input: &MultiModalInput, content: &ProcessedContent) -> f64 {
    let mut confidence = 0.5;

    if input.has_text() {
        confidence += 0.2;
    }

    if !content.images.is_empty() {
        let with_features = content
            .images
            .iter()
            .filter(|image| image.features.is_some())
            .count();
        confidence += 0.2 * with_features as f64 / content.images.len() as f64;
    }

    if content
        .audio
        .as_ref()
        .is_some_and(|audio| audio.transcribed_text.is_some())
    {
        confidence += 0.1;
    }

    if !content.documents.is_empty() {
        let with_text = content
            .documents
            .iter()
            .filter(|document| document.extracted_text.is_some())
            .count();
        confidence += 0.2 * with_text as f64 / content.documents.len() as f64;
    }

    confidence.min(1.0)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF      // CJK Unified Ideographs
        | 0x3400..=0x4DBF    // CJK Extension A
        | 0xF900..=0xFAFF    // CJK Compatibility Ideographs
        | 0x3040..=0x309F    // Hiragana
        | 0x30A0..=0x30FF    // Katakana
        | 0xAC00..=0xD7AF    // Hangul Syllables
    )
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c as u32, 0x00C0..=0x024F)
}
