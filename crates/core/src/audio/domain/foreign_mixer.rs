use rand::Rng;

use super::audio_buffer::{saturate, AudioBuffer};
use crate::shared::error::WarpError;

/// Result of [`ForeignMixer::overlay_foreign`].
#[derive(Debug, Clone)]
pub struct MixOutcome {
    pub audio: AudioBuffer,
    /// Which pool entry was mixed in, `None` when the pool was empty.
    pub clip_index: Option<usize>,
}

/// Overlays a randomly chosen external clip onto a chunk.
pub struct ForeignMixer;

impl ForeignMixer {
    /// Pick one clip uniformly from `pool` and overlay it.
    ///
    /// An empty pool skips the stage and returns the chunk unchanged.
    pub fn overlay_foreign<R: Rng + ?Sized>(
        audio: &AudioBuffer,
        pool: &[AudioBuffer],
        rng: &mut R,
    ) -> Result<MixOutcome, WarpError> {
        if pool.is_empty() {
            return Ok(MixOutcome {
                audio: audio.clone(),
                clip_index: None,
            });
        }
        let index = rng.gen_range(0..pool.len());
        Ok(MixOutcome {
            audio: Self::overlay_clip(audio, &pool[index])?,
            clip_index: Some(index),
        })
    }

    /// Sum `clip` onto `audio` from frame 0, saturating.
    ///
    /// The clip is truncated to the chunk's length; a shorter clip only
    /// covers its own length. The output always has the chunk's length.
    pub fn overlay_clip(audio: &AudioBuffer, clip: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        let frames = audio.frames();
        // Only conform the part of the clip that can overlap the chunk.
        let needed = (frames as f64 * clip.sample_rate() as f64 / audio.sample_rate() as f64)
            .ceil() as usize
            + 1;
        let clip = clip.slice_frames(0, needed).conform_to(audio)?;

        let mut samples = audio.samples().to_vec();
        for (dst, src) in samples.iter_mut().zip(clip.samples()) {
            *dst = saturate(*dst + *src);
        }
        Ok(audio.with_samples(samples))
    }
}
