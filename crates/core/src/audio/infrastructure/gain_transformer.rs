use crate::audio::domain::audio_buffer::{db_to_amplitude, saturate, AudioBuffer};
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::shared::error::WarpError;

/// Scales every sample by a fixed number of decibels, clamping at full scale.
pub struct GainTransformer {
    gain_db: f64,
}

impl GainTransformer {
    pub fn new(gain_db: f64) -> Self {
        Self { gain_db }
    }
}

impl AudioTransformer for GainTransformer {
    fn transform(&self, audio: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        if !self.gain_db.is_finite() {
            return Err(WarpError::invalid(format!(
                "gain must be finite, got {} dB",
                self.gain_db
            )));
        }
        if self.gain_db == 0.0 {
            return Ok(audio.clone());
        }
        let gain = db_to_amplitude(self.gain_db) as f32;
        Ok(audio.with_samples(audio.samples().iter().map(|s| saturate(s * gain)).collect()))
    }
}
