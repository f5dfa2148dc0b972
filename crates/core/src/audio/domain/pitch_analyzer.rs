use super::audio_buffer::AudioBuffer;

/// Domain interface for fundamental-frequency estimation.
///
/// The estimate is diagnostic. `None` means no usable pitch was found
/// (silence, noise, too short) and is never an error.
pub trait PitchAnalyzer: Send + Sync {
    fn estimate_fundamental(&self, audio: &AudioBuffer) -> Option<f64>;
}

/// Analyzer that never detects anything. Used when analysis is disabled.
pub struct NullPitchAnalyzer;

impl PitchAnalyzer for NullPitchAnalyzer {
    fn estimate_fundamental(&self, _audio: &AudioBuffer) -> Option<f64> {
        None
    }
}
