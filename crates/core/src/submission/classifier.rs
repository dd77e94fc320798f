//! Submission classification.

use super::types::{InputType, MultiModalInput};

/// Tag a submission with its dominant modality.
///
/// Exactly one non-empty modality category yields that category; zero or
/// more than one yields [`InputType::Mixed`]. Pure function, no failure mode.
pub fn classify(input: &MultiModalInput) -> InputType {
    let mut present = Vec::with_capacity(4);

    if input.has_text() {
        present.push(InputType::Text);
    }
    if !input.images.is_empty() {
        present.push(InputType::Image);
    }
    if input.audio.is_some() {
        present.push(InputType::Audio);
    }
    if !input.documents.is_empty() {
        present.push(InputType::Document);
    }

    match present.as_slice() {
        [single] => *single,
        _ => InputType::Mixed,
    }
}
