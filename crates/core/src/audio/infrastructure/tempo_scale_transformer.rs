use super::wsola;
use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::shared::constants::MIN_TEMPO_CHUNK_MS;
use crate::shared::error::WarpError;

/// Changes playback speed by `ratio` while keeping pitch.
///
/// Output length is `round(frames / ratio)`. Inputs shorter than the minimum
/// duration come back unchanged; time stretching is undefined on windows
/// that small.
pub struct TempoScaleTransformer {
    ratio: f64,
    min_duration_ms: u64,
}

impl TempoScaleTransformer {
    pub fn new(ratio: f64) -> Result<Self, WarpError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(WarpError::invalid(format!(
                "speed ratio must be positive, got {ratio}"
            )));
        }
        Ok(Self {
            ratio,
            min_duration_ms: MIN_TEMPO_CHUNK_MS,
        })
    }

    pub fn with_min_duration_ms(mut self, min_duration_ms: u64) -> Self {
        self.min_duration_ms = min_duration_ms;
        self
    }
}

impl AudioTransformer for TempoScaleTransformer {
    fn transform(&self, audio: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        if audio.duration_ms() < self.min_duration_ms as f64 {
            return Ok(audio.clone());
        }
        if (self.ratio - 1.0).abs() < 1e-10 {
            return Ok(audio.clone());
        }

        let target_len = ((audio.frames() as f64 / self.ratio).round() as usize).max(1);
        let stretched = wsola::stretch(&audio.channel_data(), audio.sample_rate(), target_len);
        Ok(audio.with_channel_data(&stretched))
    }
}

#[cfg(test)]
mod tests {
    use super::super::phase_vocoder::test_signals::{sine, zero_crossing_frequency};
    use super::*;
    use rstest::rstest;

    fn sine_buffer(duration: f64) -> AudioBuffer {
        AudioBuffer::mono(sine(440.0, duration, 16000, 0.5), 16000).unwrap()
    }

    #[rstest]
    #[case::slower(0.5)]
    #[case::faster(2.0)]
    #[case::slight(1.1)]
    fn test_short_chunk_unchanged_for_any_ratio(#[case] ratio: f64) {
        let chunk = sine_buffer(0.149);
        let out = TempoScaleTransformer::new(ratio)
            .unwrap()
            .transform(&chunk)
            .unwrap();
        assert_eq!(out, chunk);
    }

    #[rstest]
    #[case::faster(1.1, 14545)]
    #[case::slower(0.9, 17778)]
    #[case::double(2.0, 8000)]
    fn test_duration_scales_inversely_with_ratio(#[case] ratio: f64, #[case] frames: usize) {
        let chunk = sine_buffer(1.0);
        let out = TempoScaleTransformer::new(ratio)
            .unwrap()
            .transform(&chunk)
            .unwrap();
        assert_eq!(out.frames(), frames);
        assert_eq!(out.sample_rate(), 16000);
    }

    #[test]
    fn test_ratio_one_is_identity() {
        let chunk = sine_buffer(0.5);
        let out = TempoScaleTransformer::new(1.0)
            .unwrap()
            .transform(&chunk)
            .unwrap();
        assert_eq!(out, chunk);
    }

    #[test]
    fn test_pitch_survives_speed_change() {
        let chunk = sine_buffer(1.0);
        let out = TempoScaleTransformer::new(1.25)
            .unwrap()
            .transform(&chunk)
            .unwrap();
        let freq = zero_crossing_frequency(out.samples(), 16000);
        assert!((freq - 440.0).abs() < 440.0 * 0.05, "got {freq} Hz");
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    fn test_non_positive_ratio_is_invalid(#[case] ratio: f64) {
        assert!(matches!(
            TempoScaleTransformer::new(ratio),
            Err(WarpError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_custom_minimum_duration() {
        let chunk = sine_buffer(0.3);
        let out = TempoScaleTransformer::new(2.0)
            .unwrap()
            .with_min_duration_ms(500)
            .transform(&chunk)
            .unwrap();
        assert_eq!(out, chunk);
    }
}
