use super::audio_buffer::{db_to_amplitude, saturate, AudioBuffer};
use crate::shared::error::WarpError;

/// Reassembles transformed chunks and lays them over a boosted copy of the
/// original recording.
pub struct Combiner {
    fade_ms: u64,
}

impl Combiner {
    pub fn new(fade_ms: u64) -> Self {
        Self { fade_ms }
    }

    /// Concatenate `chunks` in order with per-chunk fades, then overlay the
    /// result onto `original` boosted by `gain_db`.
    ///
    /// The output is as long as the longer of the two inputs.
    pub fn combine(
        &self,
        chunks: &[AudioBuffer],
        original: &AudioBuffer,
        gain_db: f64,
    ) -> Result<AudioBuffer, WarpError> {
        let boosted = Self::apply_gain(original, gain_db);
        if chunks.is_empty() {
            return Ok(boosted);
        }
        let joined = self.concatenate(chunks)?;
        Self::overlay(&boosted, &joined)
    }

    /// Join chunks end to end after fading each one in and out.
    pub fn concatenate(&self, chunks: &[AudioBuffer]) -> Result<AudioBuffer, WarpError> {
        let Some(first) = chunks.first() else {
            return Err(WarpError::EmptyBuffer);
        };
        let total: usize = chunks.iter().map(|c| c.samples().len()).sum();
        let mut samples = Vec::with_capacity(total);

        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.sample_rate() != first.sample_rate() || chunk.channels() != first.channels()
            {
                return Err(WarpError::invalid(format!(
                    "chunk {i} is {} Hz / {} ch, expected {} Hz / {} ch",
                    chunk.sample_rate(),
                    chunk.channels(),
                    first.sample_rate(),
                    first.channels()
                )));
            }
            let fade_frames = chunk.frames_for_ms(self.fade_ms);
            samples.extend_from_slice(Self::apply_fades(chunk, fade_frames).samples());
        }

        Ok(first.with_samples(samples))
    }

    /// Linear fade-in over the first `fade_frames` frames and fade-out over
    /// the last `fade_frames`, each capped at half the chunk.
    pub fn apply_fades(chunk: &AudioBuffer, fade_frames: usize) -> AudioBuffer {
        let frames = chunk.frames();
        let n = fade_frames.min(frames / 2);
        if n == 0 {
            return chunk.clone();
        }
        let ch = chunk.channels() as usize;
        let mut samples = chunk.samples().to_vec();
        for i in 0..n {
            let gain_in = i as f32 / n as f32;
            let gain_out = (n - 1 - i) as f32 / n as f32;
            let head = i;
            let tail = frames - n + i;
            for c in 0..ch {
                samples[head * ch + c] *= gain_in;
                samples[tail * ch + c] *= gain_out;
            }
        }
        chunk.with_samples(samples)
    }

    pub fn apply_gain(audio: &AudioBuffer, gain_db: f64) -> AudioBuffer {
        if gain_db == 0.0 {
            return audio.clone();
        }
        let gain = db_to_amplitude(gain_db) as f32;
        audio.with_samples(audio.samples().iter().map(|s| saturate(s * gain)).collect())
    }

    /// Sample-wise saturating sum aligned at frame 0. The shorter input
    /// contributes silence past its end.
    pub fn overlay(base: &AudioBuffer, top: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        if base.sample_rate() != top.sample_rate() || base.channels() != top.channels() {
            return Err(WarpError::invalid(format!(
                "cannot overlay {} Hz / {} ch onto {} Hz / {} ch",
                top.sample_rate(),
                top.channels(),
                base.sample_rate(),
                base.channels()
            )));
        }
        let (longer, shorter) = if base.samples().len() >= top.samples().len() {
            (base, top)
        } else {
            (top, base)
        };
        let mut samples = longer.samples().to_vec();
        for (dst, src) in samples.iter_mut().zip(shorter.samples()) {
            *dst = saturate(*dst + *src);
        }
        Ok(base.with_samples(samples))
    }
}
