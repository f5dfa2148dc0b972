use super::sample_format::SampleFormat;
use crate::shared::error::WarpError;

/// Clamp a sample to the representable range.
pub fn saturate(sample: f32) -> f32 {
    sample.clamp(-1.0, 1.0)
}

pub fn db_to_amplitude(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Read `input` at positions `0, step, 2*step, ...` with linear interpolation.
///
/// Positions past the last sample hold the last value.
pub fn resample_linear(input: &[f32], step: f64, out_len: usize) -> Vec<f32> {
    if input.is_empty() {
        return vec![0.0; out_len];
    }
    let last = input.len() - 1;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos.floor() as usize;
            if idx >= last {
                return input[last];
            }
            let frac = (pos - idx as f64) as f32;
            input[idx] * (1.0 - frac) + input[idx + 1] * frac
        })
        .collect()
}

/// Decoded audio: interleaved PCM samples normalized to [-1.0, 1.0].
///
/// Buffers are values. Every transform builds a new buffer, so chunks can be
/// handed to worker threads without sharing mutable sample data.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    format: SampleFormat,
}

impl AudioBuffer {
    pub fn new(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
        format: SampleFormat,
    ) -> Result<Self, WarpError> {
        if sample_rate == 0 {
            return Err(WarpError::invalid("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(WarpError::invalid("channel count must be at least 1"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(WarpError::invalid(format!(
                "{} samples do not divide evenly into {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
            channels,
            format,
        })
    }

    /// Mono convenience constructor for 16-bit material.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, WarpError> {
        Self::new(samples, sample_rate, 1, SampleFormat::Int16)
    }

    /// Interleave per-channel sample vectors. Shorter channels are zero-padded.
    pub fn from_channels(
        channel_data: &[Vec<f32>],
        sample_rate: u32,
        format: SampleFormat,
    ) -> Result<Self, WarpError> {
        let channels = channel_data.len();
        let frames = channel_data.iter().map(Vec::len).max().unwrap_or(0);
        let mut samples = vec![0.0f32; frames * channels];
        for (c, data) in channel_data.iter().enumerate() {
            for (f, &s) in data.iter().enumerate() {
                samples[f * channels + c] = s;
            }
        }
        Self::new(samples, sample_rate, channels as u16, format)
    }

    /// A buffer with this buffer's rate, channel count and format but new samples.
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len() % self.channels as usize, 0);
        Self {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            format: self.format,
        }
    }

    /// Same as [`from_channels`](Self::from_channels) but keeps this buffer's metadata.
    pub(crate) fn with_channel_data(&self, channel_data: &[Vec<f32>]) -> Self {
        let channels = self.channels as usize;
        let frames = channel_data.iter().map(Vec::len).max().unwrap_or(0);
        let mut samples = vec![0.0f32; frames * channels];
        for (c, data) in channel_data.iter().enumerate().take(channels) {
            for (f, &s) in data.iter().enumerate() {
                samples[f * channels + c] = s;
            }
        }
        self.with_samples(samples)
    }

    pub fn with_format(&self, format: SampleFormat) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Number of samples per channel.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration() * 1000.0
    }

    pub fn frames_for_ms(&self, ms: u64) -> usize {
        (ms as f64 * self.sample_rate as f64 / 1000.0).round() as usize
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    /// Copy of frames `[start, end)`, clamped to the buffer.
    pub fn slice_frames(&self, start: usize, end: usize) -> Self {
        let ch = self.channels as usize;
        let end = end.min(self.frames());
        let start = start.min(end);
        self.with_samples(self.samples[start * ch..end * ch].to_vec())
    }

    /// De-interleave into one vector per channel.
    pub fn channel_data(&self) -> Vec<Vec<f32>> {
        let ch = self.channels as usize;
        (0..ch)
            .map(|c| self.samples.iter().skip(c).step_by(ch).copied().collect())
            .collect()
    }

    /// Up- or down-mix to `channels`.
    ///
    /// Mono input is duplicated, mono output averages every input channel, and
    /// any other combination maps output channel `c` to input `c % channels`.
    pub fn remix_channels(&self, channels: u16) -> Result<Self, WarpError> {
        if channels == 0 {
            return Err(WarpError::invalid("channel count must be at least 1"));
        }
        if channels == self.channels {
            return Ok(self.clone());
        }
        let src = self.channels as usize;
        let dst = channels as usize;
        let mut samples = Vec::with_capacity(self.frames() * dst);
        for frame in self.samples.chunks_exact(src) {
            if dst == 1 {
                samples.push(frame.iter().sum::<f32>() / src as f32);
            } else {
                samples.extend((0..dst).map(|c| frame[c % src]));
            }
        }
        Ok(Self {
            samples,
            sample_rate: self.sample_rate,
            channels,
            format: self.format,
        })
    }

    /// Linear-interpolation sample-rate conversion.
    pub fn resample(&self, sample_rate: u32) -> Result<Self, WarpError> {
        if sample_rate == 0 {
            return Err(WarpError::invalid("sample rate must be positive"));
        }
        if sample_rate == self.sample_rate {
            return Ok(self.clone());
        }
        let step = self.sample_rate as f64 / sample_rate as f64;
        let out_frames = (self.frames() as f64 / step).round() as usize;
        let resampled: Vec<Vec<f32>> = self
            .channel_data()
            .iter()
            .map(|data| resample_linear(data, step, out_frames))
            .collect();
        let mut out = self.with_channel_data(&resampled);
        out.sample_rate = sample_rate;
        Ok(out)
    }

    /// Match another buffer's sample rate and channel count.
    pub fn conform_to(&self, target: &AudioBuffer) -> Result<Self, WarpError> {
        self.remix_channels(target.channels)?
            .resample(target.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_new_creates_buffer_with_correct_fields() {
        let samples = vec![0.0f32; 16000];
        let buf = AudioBuffer::new(samples.clone(), 16000, 1, SampleFormat::Int16).unwrap();
        assert_eq!(buf.samples(), &samples[..]);
        assert_eq!(buf.sample_rate(), 16000);
        assert_eq!(buf.channels(), 1);
        assert_eq!(buf.format(), SampleFormat::Int16);
    }

    #[rstest]
    #[case::zero_rate(vec![0.0; 4], 0, 1)]
    #[case::zero_channels(vec![0.0; 4], 44100, 0)]
    #[case::ragged_channels(vec![0.0; 5], 44100, 2)]
    fn test_new_rejects_invalid(
        #[case] samples: Vec<f32>,
        #[case] rate: u32,
        #[case] channels: u16,
    ) {
        let err = AudioBuffer::new(samples, rate, channels, SampleFormat::Int16).unwrap_err();
        assert!(matches!(err, WarpError::InvalidParameter(_)));
    }

    #[test]
    fn test_duration_mono() {
        let buf = AudioBuffer::mono(vec![0.0; 48000], 16000).unwrap();
        assert_relative_eq!(buf.duration(), 3.0);
    }

    #[test]
    fn test_duration_stereo() {
        let buf = AudioBuffer::new(vec![0.0; 96000], 48000, 2, SampleFormat::Int16).unwrap();
        assert_eq!(buf.frames(), 48000);
        assert_relative_eq!(buf.duration(), 1.0);
        assert_relative_eq!(buf.duration_ms(), 1000.0);
    }

    #[test]
    fn test_frames_for_ms() {
        let buf = AudioBuffer::mono(vec![], 44100).unwrap();
        assert_eq!(buf.frames_for_ms(500), 22050);
        assert_eq!(buf.frames_for_ms(10), 441);
    }

    #[test]
    fn test_channel_data_round_trips_through_from_channels() {
        let buf = AudioBuffer::new(
            vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3],
            8000,
            2,
            SampleFormat::Int24,
        )
        .unwrap();
        let channels = buf.channel_data();
        assert_eq!(channels[0], vec![0.1, 0.2, 0.3]);
        assert_eq!(channels[1], vec![-0.1, -0.2, -0.3]);
        let rebuilt = AudioBuffer::from_channels(&channels, 8000, SampleFormat::Int24).unwrap();
        assert_eq!(rebuilt, buf);
    }

    #[test]
    fn test_slice_frames_clamps_to_end() {
        let buf = AudioBuffer::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 8000, 2, SampleFormat::Int16)
            .unwrap();
        let slice = buf.slice_frames(1, 10);
        assert_eq!(slice.samples(), &[3.0, 4.0, 5.0, 6.0]);
        assert_eq!(slice.channels(), 2);
    }

    #[test]
    fn test_remix_stereo_to_mono_averages() {
        let buf = AudioBuffer::new(vec![0.2, 0.4, -0.2, 0.0], 8000, 2, SampleFormat::Int16).unwrap();
        let mono = buf.remix_channels(1).unwrap();
        assert_eq!(mono.channels(), 1);
        assert_relative_eq!(mono.samples()[0], 0.3);
        assert_relative_eq!(mono.samples()[1], -0.1);
    }

    #[test]
    fn test_remix_mono_to_stereo_duplicates() {
        let buf = AudioBuffer::mono(vec![0.5, -0.5], 8000).unwrap();
        let stereo = buf.remix_channels(2).unwrap();
        assert_eq!(stereo.samples(), &[0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_resample_halves_frame_count() {
        let buf = AudioBuffer::mono((0..100).map(|i| i as f32 / 100.0).collect(), 16000).unwrap();
        let down = buf.resample(8000).unwrap();
        assert_eq!(down.sample_rate(), 8000);
        assert_eq!(down.frames(), 50);
        assert_relative_eq!(down.samples()[10], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_conform_to_matches_target_layout() {
        let clip = AudioBuffer::mono(vec![0.1; 22050], 22050).unwrap();
        let target = AudioBuffer::new(vec![0.0; 20], 44100, 2, SampleFormat::Int16).unwrap();
        let conformed = clip.conform_to(&target).unwrap();
        assert_eq!(conformed.sample_rate(), 44100);
        assert_eq!(conformed.channels(), 2);
        assert_eq!(conformed.frames(), 44100);
    }

    #[test]
    fn test_resample_linear_interpolates_midpoints() {
        let out = resample_linear(&[0.0, 1.0, 2.0], 0.5, 5);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_saturate_clamps() {
        assert_eq!(saturate(1.7), 1.0);
        assert_eq!(saturate(-3.0), -1.0);
        assert_eq!(saturate(0.25), 0.25);
    }

    #[test]
    fn test_db_to_amplitude() {
        assert_relative_eq!(db_to_amplitude(0.0), 1.0);
        assert_relative_eq!(db_to_amplitude(20.0), 10.0, epsilon = 1e-12);
        assert_relative_eq!(db_to_amplitude(-6.0), 0.501_187, epsilon = 1e-6);
    }
}
