use std::f64::consts::PI;

use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_transformer::AudioTransformer;
use crate::shared::constants::MAX_REVERB_LEVEL;
use crate::shared::error::WarpError;

/// Low-pass cutoff at the lowest non-zero level, in Hz.
const LOW_PASS_CEILING_HZ: f64 = 18_000.0;
/// Low-pass cutoff at level 100 is `LOW_PASS_CEILING_HZ * LOW_PASS_SPAN`.
const LOW_PASS_SPAN: f64 = 0.05;
/// High-pass cutoff at level 0, in Hz.
const HIGH_PASS_FLOOR_HZ: f64 = 20.0;
/// High-pass cutoff at level 100 is `HIGH_PASS_FLOOR_HZ * HIGH_PASS_SPAN`.
const HIGH_PASS_SPAN: f64 = 20.0;

/// Pseudo-reverb: a first-order low-pass followed by a first-order high-pass.
///
/// This only approximates the dull, band-limited tail of a reverberant room.
/// It is not a convolution reverb and adds no reflections. Level 0 is
/// pass-through; higher levels close the band from both sides along an
/// exponential curve. Levels outside 0-100 are clamped.
pub struct BandFilterTransformer {
    level: f64,
}

impl BandFilterTransformer {
    pub fn new(level: f64) -> Self {
        let level = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, MAX_REVERB_LEVEL)
        };
        Self { level }
    }

    /// `(low_pass_hz, high_pass_hz)` for this level, or `None` at level 0.
    pub fn cutoffs(&self, sample_rate: u32) -> Option<(f64, f64)> {
        if self.level <= 0.0 {
            return None;
        }
        let t = self.level / MAX_REVERB_LEVEL;
        let nyquist_cap = sample_rate as f64 * 0.49;
        let low_pass = (LOW_PASS_CEILING_HZ * LOW_PASS_SPAN.powf(t)).min(nyquist_cap);
        let high_pass = (HIGH_PASS_FLOOR_HZ * HIGH_PASS_SPAN.powf(t)).min(nyquist_cap);
        Some((low_pass, high_pass))
    }
}

/// One-pole RC low-pass over one interleaved channel.
fn low_pass(samples: &mut [f32], channels: usize, channel: usize, cutoff: f64, sample_rate: u32) {
    let rc = 1.0 / (2.0 * PI * cutoff);
    let dt = 1.0 / sample_rate as f64;
    let alpha = dt / (rc + dt);

    let mut iter = samples.iter_mut().skip(channel).step_by(channels);
    let Some(first) = iter.next() else {
        return;
    };
    let mut prev = *first as f64;
    for s in iter {
        prev += alpha * (*s as f64 - prev);
        *s = prev as f32;
    }
}

/// One-pole RC high-pass over one interleaved channel.
fn high_pass(samples: &mut [f32], channels: usize, channel: usize, cutoff: f64, sample_rate: u32) {
    let rc = 1.0 / (2.0 * PI * cutoff);
    let dt = 1.0 / sample_rate as f64;
    let alpha = rc / (rc + dt);

    let mut iter = samples.iter_mut().skip(channel).step_by(channels);
    let Some(first) = iter.next() else {
        return;
    };
    let mut prev_in = *first as f64;
    let mut prev_out = prev_in;
    for s in iter {
        let x = *s as f64;
        prev_out = alpha * (prev_out + x - prev_in);
        prev_in = x;
        *s = prev_out as f32;
    }
}

impl AudioTransformer for BandFilterTransformer {
    fn transform(&self, audio: &AudioBuffer) -> Result<AudioBuffer, WarpError> {
        let Some((low_cut, high_cut)) = self.cutoffs(audio.sample_rate()) else {
            return Ok(audio.clone());
        };

        let channels = audio.channels() as usize;
        let rate = audio.sample_rate();
        let mut samples = audio.samples().to_vec();
        for c in 0..channels {
            low_pass(&mut samples, channels, c, low_cut, rate);
            high_pass(&mut samples, channels, c, high_cut, rate);
        }
        Ok(audio.with_samples(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::super::phase_vocoder::test_signals::sine;
    use super::*;
    use crate::audio::domain::sample_format::SampleFormat;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn rms(samples: &[f32]) -> f64 {
        (samples.iter().map(|s| (*s as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
    }

    fn tone(freq: f64) -> AudioBuffer {
        AudioBuffer::mono(sine(freq, 0.5, 44100, 0.5), 44100).unwrap()
    }

    #[test]
    fn test_level_zero_is_pass_through() {
        let audio = tone(1000.0);
        let out = BandFilterTransformer::new(0.0).transform(&audio).unwrap();
        assert_eq!(out, audio);
    }

    #[rstest]
    #[case::below(-20.0, 0.0)]
    #[case::above(250.0, 100.0)]
    #[case::inside(47.0, 47.0)]
    #[case::nan(f64::NAN, 0.0)]
    fn test_level_is_clamped(#[case] level: f64, #[case] expected: f64) {
        assert_eq!(BandFilterTransformer::new(level).level, expected);
    }

    #[rstest]
    #[case::mono(1)]
    #[case::stereo(2)]
    fn test_length_is_preserved(#[case] channels: u16) {
        let audio =
            AudioBuffer::new(vec![0.3; 4410 * channels as usize], 44100, channels, SampleFormat::Int16)
                .unwrap();
        let out = BandFilterTransformer::new(50.0).transform(&audio).unwrap();
        assert_eq!(out.samples().len(), audio.samples().len());
        assert_eq!(out.channels(), channels);
    }

    #[test]
    fn test_cutoff_curve_endpoints() {
        let (lp, hp) = BandFilterTransformer::new(100.0).cutoffs(44100).unwrap();
        assert_relative_eq!(lp, 900.0, epsilon = 1e-6);
        assert_relative_eq!(hp, 400.0, epsilon = 1e-6);
        let (lp, hp) = BandFilterTransformer::new(50.0).cutoffs(44100).unwrap();
        assert!(lp > 3000.0 && lp < 5000.0);
        assert!(hp > 80.0 && hp < 100.0);
    }

    #[test]
    fn test_cutoffs_capped_below_nyquist() {
        let (lp, _) = BandFilterTransformer::new(1.0).cutoffs(8000).unwrap();
        assert!(lp < 4000.0);
    }

    #[test]
    fn test_high_level_attenuates_treble_more_than_mid() {
        let filter = BandFilterTransformer::new(100.0);
        let mid = filter.transform(&tone(600.0)).unwrap();
        let treble = filter.transform(&tone(8000.0)).unwrap();
        assert!(rms(treble.samples()) < rms(mid.samples()) * 0.5);
    }

    #[test]
    fn test_high_level_attenuates_rumble() {
        let filter = BandFilterTransformer::new(100.0);
        let rumble = filter.transform(&tone(40.0)).unwrap();
        assert!(rms(&rumble.samples()[4410..]) < rms(&tone(40.0).samples()[4410..]) * 0.3);
    }

    #[test]
    fn test_dc_is_removed() {
        let audio = AudioBuffer::mono(vec![0.5; 44100], 44100).unwrap();
        let out = BandFilterTransformer::new(50.0).transform(&audio).unwrap();
        assert!(out.samples()[44099].abs() < 1e-3);
    }
}
