//! Deterministic audio signal analysis.
//!
//! Everything here is plain local computation over normalized mono samples
//! in `[-1.0, 1.0]`. No external service is involved and identical input
//! always yields identical output.

/// Frame length used for the speech/silence decision.
const FRAME_MS: usize = 20;

/// RMS threshold separating speech frames from silence frames.
const SPEECH_RMS_THRESHOLD: f64 = 0.02;

/// Window length for spectral analysis.
const SPECTRUM_WINDOW: usize = 1024;

/// Number of analysis windows averaged for the spectrum.
const SPECTRUM_WINDOW_COUNT: usize = 8;

/// Hop length for the tempo energy envelope, in seconds.
const ENVELOPE_HOP_SECS: f64 = 0.05;

/// Minimum normalized autocorrelation peak accepted as a tempo.
const TEMPO_MIN_CORRELATION: f64 = 0.3;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Mean squared amplitude over the whole recording.
pub fn energy(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64
}

/// Fraction of adjacent sample pairs that change sign.
pub fn zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    crossings as f64 / (samples.len() - 1) as f64
}

/// Fractions of frames classified as speech and as silence.
///
/// A frame counts as speech when its RMS exceeds a fixed threshold. The two
/// ratios always sum to 1.0 for non-empty input.
pub fn speech_silence_ratio(samples: &[f32], sample_rate: u32) -> (f64, f64) {
    if samples.is_empty() || sample_rate == 0 {
        return (0.0, 1.0);
    }

    let frame_len = (sample_rate as usize * FRAME_MS / 1000).max(1);
    let mut speech_frames = 0usize;
    let mut total_frames = 0usize;

    for frame in samples.chunks(frame_len) {
        let rms = (frame.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>()
            / frame.len() as f64)
            .sqrt();
        if rms > SPEECH_RMS_THRESHOLD {
            speech_frames += 1;
        }
        total_frames += 1;
    }

    let speech = speech_frames as f64 / total_frames as f64;
    (speech, 1.0 - speech)
}

/// Average magnitude spectrum over a handful of windows spread across the
/// recording. Returns one magnitude per bin for bins `0..SPECTRUM_WINDOW/2`.
fn magnitude_spectrum(samples: &[f32]) -> Vec<f64> {
    let n = SPECTRUM_WINDOW;
    let half = n / 2;
    let mut spectrum = vec![0.0f64; half];

    if samples.is_empty() {
        return spectrum;
    }

    let window_count = if samples.len() <= n {
        1
    } else {
        SPECTRUM_WINDOW_COUNT.min(samples.len() / n)
    };

    let stride = if window_count > 1 {
        (samples.len() - n) / (window_count - 1)
    } else {
        0
    };

    for w in 0..window_count {
        let start = w * stride;
        for (k, bin) in spectrum.iter_mut().enumerate() {
            let mut re = 0.0f64;
            let mut im = 0.0f64;
            for i in 0..n {
                let sample = *samples.get(start + i).unwrap_or(&0.0) as f64;
                // Hann window keeps leakage from smearing the centroid.
                let hann = 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos());
                let angle = 2.0 * std::f64::consts::PI * k as f64 * i as f64 / n as f64;
                re += sample * hann * angle.cos();
                im -= sample * hann * angle.sin();
            }
            *bin += (re * re + im * im).sqrt();
        }
    }

    for bin in &mut spectrum {
        *bin /= window_count as f64;
    }
    spectrum
}

/// Magnitude-weighted mean frequency and the 85% rolloff frequency, in Hz.
pub fn spectral_centroid_rolloff(samples: &[f32], sample_rate: u32) -> (f64, f64) {
    if samples.is_empty() || sample_rate == 0 {
        return (0.0, 0.0);
    }

    let spectrum = magnitude_spectrum(samples);
    let bin_hz = sample_rate as f64 / SPECTRUM_WINDOW as f64;
    let total: f64 = spectrum.iter().sum();
    if total <= f64::EPSILON {
        return (0.0, 0.0);
    }

    let centroid = spectrum
        .iter()
        .enumerate()
        .map(|(k, &m)| k as f64 * bin_hz * m)
        .sum::<f64>()
        / total;

    let mut cumulative = 0.0;
    let mut rolloff = 0.0;
    for (k, &m) in spectrum.iter().enumerate() {
        cumulative += m;
        if cumulative >= 0.85 * total {
            rolloff = k as f64 * bin_hz;
            break;
        }
    }

    (centroid, rolloff)
}

/// Tempo estimate in BPM from autocorrelation of the energy envelope.
///
/// Returns `None` when the recording is too short (under ~3 seconds) or the
/// envelope shows no convincing periodicity in the 40-200 BPM range.
pub fn estimate_tempo(samples: &[f32], sample_rate: u32) -> Option<f64> {
    if samples.is_empty() || sample_rate == 0 {
        return None;
    }

    let hop = ((sample_rate as f64 * ENVELOPE_HOP_SECS) as usize).max(1);
    let envelope: Vec<f64> = samples
        .chunks(hop)
        .map(|frame| {
            (frame.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / frame.len() as f64)
                .sqrt()
        })
        .collect();

    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    let detrended: Vec<f64> = envelope.iter().map(|&e| e - mean).collect();
    let norm: f64 = detrended.iter().map(|&e| e * e).sum();
    if norm <= f64::EPSILON {
        return None;
    }

    // Lag bounds for 200 BPM down to 40 BPM.
    let min_lag = (60.0 / 200.0 / ENVELOPE_HOP_SECS).round() as usize;
    let max_lag = (60.0 / 40.0 / ENVELOPE_HOP_SECS).round() as usize;
    if detrended.len() < 2 * max_lag {
        return None;
    }

    let mut best_lag = 0usize;
    let mut best_corr = 0.0f64;
    for lag in min_lag..=max_lag {
        let corr: f64 = detrended
            .iter()
            .zip(detrended.iter().skip(lag))
            .map(|(&a, &b)| a * b)
            .sum::<f64>()
            / norm;
        if corr > best_corr {
            best_corr = corr;
            best_lag = lag;
        }
    }

    if best_corr < TEMPO_MIN_CORRELATION || best_lag == 0 {
        return None;
    }

    Some(60.0 / (best_lag as f64 * ENVELOPE_HOP_SECS))
}

/// Pitch-class estimate from the dominant spectral peak.
///
/// Returns `None` when no bin in the 50-2000 Hz band clearly dominates.
pub fn estimate_key(samples: &[f32], sample_rate: u32) -> Option<String> {
    if samples.is_empty() || sample_rate == 0 {
        return None;
    }

    let spectrum = magnitude_spectrum(samples);
    let bin_hz = sample_rate as f64 / SPECTRUM_WINDOW as f64;

    let mut class_mass = [0.0f64; 12];
    let mut total = 0.0f64;
    for (k, &m) in spectrum.iter().enumerate() {
        let freq = k as f64 * bin_hz;
        if !(50.0..=2000.0).contains(&freq) {
            continue;
        }
        let midi = 69.0 + 12.0 * (freq / 440.0).log2();
        let class = (midi.round() as i64).rem_euclid(12) as usize;
        class_mass[class] += m;
        total += m;
    }

    if total <= f64::EPSILON {
        return None;
    }

    let (best, &mass) = class_mass
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;

    // Reject flat spectra where no class stands out.
    if mass < 1.2 * (total / 12.0) {
        return None;
    }

    Some(PITCH_CLASSES[best].to_string())
}

/// Fixed-length per-bucket peak amplitude summary for visualization.
///
/// Always returns exactly `buckets` values; short input is padded with
/// zeros.
pub fn waveform_summary(samples: &[f32], buckets: usize) -> Vec<f32> {
    if buckets == 0 {
        return Vec::new();
    }
    let mut summary = vec![0.0f32; buckets];
    if samples.is_empty() {
        return summary;
    }

    let chunk = samples.len().div_ceil(buckets);
    for (i, frame) in samples.chunks(chunk).enumerate() {
        summary[i] = frame.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, amplitude: f32, secs: f64, sample_rate: u32) -> Vec<f32> {
        let count = (secs * sample_rate as f64) as usize;
        (0..count)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin()
                        as f32
            })
            .collect()
    }

    #[test]
    fn test_energy_of_unit_sine() {
        let samples = sine(440.0, 1.0, 1.0, 8000);
        let e = energy(&samples);
        assert!((e - 0.5).abs() < 0.01, "energy of unit sine should be ~0.5, got {}", e);
    }

    #[test]
    fn test_energy_of_silence() {
        assert_eq!(energy(&[0.0; 1000]), 0.0);
        assert_eq!(energy(&[]), 0.0);
    }

    #[test]
    fn test_zero_crossing_rate_tracks_frequency() {
        // A sine at f Hz crosses zero 2f times per second.
        let samples = sine(440.0, 1.0, 1.0, 8000);
        let zcr = zero_crossing_rate(&samples);
        let expected = 2.0 * 440.0 / 8000.0;
        assert!((zcr - expected).abs() < 0.02, "zcr {} vs expected {}", zcr, expected);
    }

    #[test]
    fn test_speech_silence_split() {
        let sample_rate = 8000;
        let mut samples = sine(440.0, 0.5, 1.0, sample_rate);
        samples.extend(std::iter::repeat(0.0f32).take(sample_rate as usize));

        let (speech, silence) = speech_silence_ratio(&samples, sample_rate);
        assert!((speech - 0.5).abs() < 0.05, "speech ratio {}", speech);
        assert!((speech + silence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_spectral_centroid_of_pure_tone() {
        let samples = sine(1000.0, 1.0, 1.0, 8000);
        let (centroid, rolloff) = spectral_centroid_rolloff(&samples, 8000);
        assert!((centroid - 1000.0).abs() < 100.0, "centroid {}", centroid);
        assert!(rolloff >= centroid - 50.0, "rolloff {} below centroid {}", rolloff, centroid);
    }

    #[test]
    fn test_spectral_features_of_silence() {
        let samples = vec![0.0f32; 8000];
        assert_eq!(spectral_centroid_rolloff(&samples, 8000), (0.0, 0.0));
    }

    #[test]
    fn test_tempo_of_pulse_train() {
        // 100 ms bursts every 500 ms: 120 BPM.
        let sample_rate = 8000u32;
        let mut samples = Vec::new();
        for _ in 0..16 {
            samples.extend(sine(440.0, 0.8, 0.1, sample_rate));
            samples.extend(std::iter::repeat(0.0f32).take((0.4 * sample_rate as f64) as usize));
        }

        let tempo = estimate_tempo(&samples, sample_rate).expect("pulse train should have a tempo");
        assert!((tempo - 120.0).abs() < 10.0, "tempo {}", tempo);
    }

    #[test]
    fn test_tempo_of_short_or_flat_signal_is_none() {
        assert_eq!(estimate_tempo(&sine(440.0, 0.5, 0.5, 8000), 8000), None);
        assert_eq!(estimate_tempo(&vec![0.25f32; 8000 * 10], 8000), None);
    }

    #[test]
    fn test_key_of_a440() {
        let samples = sine(440.0, 1.0, 1.0, 8000);
        assert_eq!(estimate_key(&samples, 8000).as_deref(), Some("A"));
    }

    #[test]
    fn test_key_of_silence_is_none() {
        assert_eq!(estimate_key(&vec![0.0f32; 8000], 8000), None);
    }

    #[test]
    fn test_waveform_summary_shape() {
        let samples = vec![0.5f32; 1000];
        let summary = waveform_summary(&samples, 100);
        assert_eq!(summary.len(), 100);
        assert!(summary.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_waveform_summary_pads_short_input() {
        let summary = waveform_summary(&[0.9f32, -0.4], 100);
        assert_eq!(summary.len(), 100);
        assert!((summary[0] - 0.9).abs() < 1e-6);
        assert!((summary[1] - 0.4).abs() < 1e-6);
        assert!(summary[2..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_waveform_summary_of_empty_input() {
        assert_eq!(waveform_summary(&[], 100), vec![0.0f32; 100]);
    }
}
