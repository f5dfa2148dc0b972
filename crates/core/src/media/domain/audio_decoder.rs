use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::shared::error::WarpError;

/// Domain interface for turning encoded bytes into PCM.
///
/// Implementations return `UnsupportedFormat` for bytes they cannot parse.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, WarpError>;
}
