//! Audio modality processor.

use std::io::Cursor;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::services::{SpeechToText, TranscriptionRequest};
use crate::submission::Blob;

use super::error::ProcessError;
use super::signal;
use super::types::{AudioFeatures, ProcessedAudio, ProcessingOptions, DEFAULT_WAVEFORM_BUCKETS};

/// Turns one raw audio blob into a [`ProcessedAudio`].
///
/// WAV decoding, signal features, and the waveform summary are required
/// steps; transcription is optional enrichment that degrades to a warning.
pub struct AudioProcessor {
    speech: Arc<dyn SpeechToText>,
    waveform_buckets: usize,
}

impl AudioProcessor {
    /// Create a processor backed by the given speech-to-text collaborator.
    pub fn new(speech: Arc<dyn SpeechToText>) -> Self {
        Self {
            speech,
            waveform_buckets: DEFAULT_WAVEFORM_BUCKETS,
        }
    }

    /// Override the waveform summary length.
    pub fn with_waveform_buckets(mut self, buckets: usize) -> Self {
        self.waveform_buckets = buckets;
        self
    }

    /// Process one audio blob.
    pub async fn process(
        &self,
        blob: &Blob,
        options: &ProcessingOptions,
    ) -> Result<(ProcessedAudio, Vec<String>), ProcessError> {
        let id = Uuid::new_v4();
        let mut warnings = Vec::new();

        let (samples, sample_rate, channels) = decode_wav(&blob.data)?;
        let duration_seconds = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };

        debug!(
            audio_id = %id,
            sample_rate,
            channels,
            duration_secs = duration_seconds,
            "Decoded audio"
        );

        let transcribed_text = if options.enable_audio_transcription {
            let request = TranscriptionRequest {
                language: options.transcription_language.clone(),
                max_alternatives: Some(1),
            };
            match self.speech.transcribe(&blob.data, &request).await {
                Ok(transcript) => Some(transcript),
                Err(e) => {
                    warnings.push(format!("Transcription failed: {}", e));
                    None
                }
            }
        } else {
            None
        };

        let (speech_ratio, silence_ratio) = signal::speech_silence_ratio(&samples, sample_rate);
        let (spectral_centroid, spectral_rolloff) =
            signal::spectral_centroid_rolloff(&samples, sample_rate);

        let features = AudioFeatures {
            speech_ratio,
            silence_ratio,
            energy: signal::energy(&samples),
            zero_crossing_rate: signal::zero_crossing_rate(&samples),
            spectral_centroid,
            spectral_rolloff,
            tempo: signal::estimate_tempo(&samples, sample_rate),
            key: signal::estimate_key(&samples, sample_rate),
        };

        Ok((
            ProcessedAudio {
                id,
                byte_size: blob.byte_size(),
                format: "wav".to_string(),
                duration_seconds,
                sample_rate: Some(sample_rate),
                channels: Some(channels),
                transcribed_text,
                features,
                waveform: signal::waveform_summary(&samples, self.waveform_buckets),
            },
            warnings,
        ))
    }
}

/// Decode WAV bytes into normalized mono samples.
fn decode_wav(data: &[u8]) -> Result<(Vec<f32>, u32, u16), ProcessError> {
    let mut reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| ProcessError::decode("audio", e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProcessError::decode("audio", e.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ProcessError::decode("audio", e.to_string()))?
        }
    };

    let channels = spec.channels.max(1);
    let mono: Vec<f32> = interleaved
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok((mono, spec.sample_rate, spec.channels))
}
