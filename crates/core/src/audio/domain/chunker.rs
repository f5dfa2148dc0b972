use super::audio_buffer::AudioBuffer;
use super::chunk::Chunk;
use crate::shared::error::WarpError;

/// Splits a buffer into fixed-duration, contiguous, non-overlapping chunks.
///
/// The last chunk keeps whatever is left over; nothing is padded or dropped.
pub struct Chunker;

impl Chunker {
    pub fn split(audio: &AudioBuffer, chunk_ms: u64) -> Result<Vec<Chunk>, WarpError> {
        if chunk_ms == 0 {
            return Err(WarpError::invalid("chunk duration must be positive"));
        }
        if audio.is_empty() {
            return Err(WarpError::EmptyBuffer);
        }

        let stride = audio.frames_for_ms(chunk_ms).max(1);
        let total = audio.frames();

        let chunks: Vec<Chunk> = (0..total)
            .step_by(stride)
            .enumerate()
            .map(|(index, start)| {
                Chunk::new(index, start, audio.slice_frames(start, start + stride))
            })
            .collect();

        log::debug!(
            "Split {:.1}s of audio into {} chunks of {chunk_ms}ms",
            audio.duration(),
            chunks.len()
        );
        Ok(chunks)
    }
}
