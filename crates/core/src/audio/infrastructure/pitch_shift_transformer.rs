use super::phase_vocoder::stretch_to_length;
use crate::audio::domain::audio_buffer::{resample_linear, saturate, AudioBuffer};
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::shared::constants::{MAX_PITCH_SHIFT_SEMITONES, PITCH_SHIFT_PASS_SEMITONES};
use crate::shared::error::WarpError;

/// Resample-then-restore pitch shifter.
///
/// Reading the signal at a step of `2^(semitones/12)` moves the pitch and
/// shortens (or lengthens) it; a phase-vocoder stretch then brings it back to
/// the original frame count so only the pitch changes. Shifts wider than an
/// octave run as several passes so the intermediate buffer stays within twice
/// the input length.
pub struct PitchShiftTransformer {
    semitones: f64,
}

impl PitchShiftTransformer {
    pub fn new(semitones: f64) -> Self {
        Self { semitones }
    }

    /// Offset actually applied, after clamping to the supported span.
    fn effective_semitones(&self) -> f64 {
        let clamped = self
            .semitones
            .clamp(-MAX_PITCH_SHIFT_SEMITONES, MAX_PITCH_SHIFT_SEMITONES);
        if clamped != self.semitones {
            log::warn!(
                "Pitch offset {:+.1} semitones clamped to {:+.1}",
                self.semitones,
                clamped
            );
        }
        clamped
    }
}

/// Split `semitones` into equal passes no wider than one pass limit.
fn passes(semitones: f64) -> (usize, f64) {
    let count = (semitones.abs() / PITCH_SHIFT_PASS_SEMITONES).ceil().max(1.0) as usize;
    (count, semitones / count as f64)
}

fn shift_channel(data: &[f32], ratio: f64) -> Vec<f32> {
    let frames = data.len();
    let resampled_len = ((frames as f64 / ratio).round() as usize).max(1);
    let resampled = resample_linear(data, ratio, resampled_len);
    stretch_to_length(&resampled, frames)
}

impl AudioTransformer for PitchShiftTransformer {
    fn transform(&self, audio: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        if !self.semitones.is_finite() {
            return Err(WarpError::invalid(format!(
                "pitch offset must be finite, got {}",
                self.semitones
            )));
        }
        // Zero shift is identity
        if self.semitones.abs() < 1e-10 || audio.is_empty() {
            return Ok(audio.clone());
        }

        let (count, step) = passes(self.effective_semitones());
        let ratio = 2.0_f64.powf(step / 12.0);

        let shifted: Vec<Vec<f32>> = audio
            .channel_data()
            .into_iter()
            .map(|mut data| {
                for _ in 0..count {
                    data = shift_channel(&data, ratio);
                }
                data
            })
            .collect();
        let shifted = audio.with_channel_data(&shifted);

        // Peak-normalize: the output peak never exceeds the input peak
        let input_peak = audio.peak();
        let output_peak = shifted.peak();
        let gain = if output_peak > 1e-10 && output_peak > input_peak {
            input_peak / output_peak
        } else {
            1.0
        };

        Ok(shifted.with_samples(
            shifted
                .samples()
                .iter()
                .map(|s| saturate(s * gain))
                .collect(),
        ))
    }
}
