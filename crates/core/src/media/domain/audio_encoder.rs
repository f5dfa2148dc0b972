use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::shared::error::WarpError;

/// Domain interface for serializing PCM into an audio file format.
pub trait AudioEncoder: Send {
    fn encode(&self, audio: &AudioBuffer) -> Result<Vec<u8>, WarpError>;
}
