use super::audio_buffer::AudioBuffer;
use crate::shared::error::WarpError;

/// Domain interface for one distortion stage.
///
/// Implementations never modify their input; they return a new buffer with
/// the same sample rate, channel count and format.
pub trait AudioTransformer: Send + Sync {
    fn transform(&self, audio: &AudioBuffer) -> Result<AudioBuffer, WarpError>;
}
