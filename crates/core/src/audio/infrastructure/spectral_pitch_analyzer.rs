use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::phase_vocoder::hann_window;
use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::pitch_analyzer::PitchAnalyzer;

const FFT_SIZE: usize = 2048;
const HOP: usize = 512;
const MIN_FREQUENCY_HZ: f64 = 150.0;
const MAX_FREQUENCY_HZ: f64 = 4000.0;

/// Peaks below this fraction of the frame's loudest bin are ignored.
const RELATIVE_THRESHOLD: f64 = 0.1;

/// A peak must stand this many times above the median bin of its band.
const PROMINENCE: f64 = 6.0;

const SILENCE_FLOOR: f64 = 1e-6;

/// Short-time spectral peak tracker.
///
/// Each frame contributes its strongest prominent peak inside the search band,
/// refined by parabolic interpolation. The estimate is the mean over all
/// frames that produced a peak; noise and silence produce none.
pub struct SpectralPitchAnalyzer {
    min_hz: f64,
    max_hz: f64,
}

impl SpectralPitchAnalyzer {
    pub fn new() -> Self {
        Self {
            min_hz: MIN_FREQUENCY_HZ,
            max_hz: MAX_FREQUENCY_HZ,
        }
    }

    fn frame_peak(&self, magnitudes: &[f64], lo: usize, hi: usize, bin_hz: f64) -> Option<f64> {
        let band = &magnitudes[lo..=hi];
        let loudest = band.iter().cloned().fold(0.0, f64::max);
        if loudest < SILENCE_FLOOR {
            return None;
        }

        let mut sorted = band.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = sorted[sorted.len() / 2];
        let threshold = (loudest * RELATIVE_THRESHOLD).max(median * PROMINENCE);

        let (bin, mag) = (lo.max(1)..hi.min(magnitudes.len() - 2) + 1)
            .filter(|&k| {
                magnitudes[k] >= threshold
                    && magnitudes[k] > magnitudes[k - 1]
                    && magnitudes[k] >= magnitudes[k + 1]
            })
            .map(|k| (k, magnitudes[k]))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let (left, right) = (magnitudes[bin - 1], magnitudes[bin + 1]);
        let denom = left - 2.0 * mag + right;
        let offset = if denom.abs() > 1e-12 {
            (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };
        Some((bin as f64 + offset) * bin_hz)
    }
}

impl Default for SpectralPitchAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchAnalyzer for SpectralPitchAnalyzer {
    fn estimate_fundamental(&self, audio: &AudioBuffer) -> Option<f64> {
        if audio.is_empty() {
            return None;
        }
        let channels = audio.channels() as usize;
        let mono: Vec<f64> = audio
            .samples()
            .chunks_exact(channels)
            .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / channels as f64)
            .collect();

        let bin_hz = audio.sample_rate() as f64 / FFT_SIZE as f64;
        let nyquist_bin = FFT_SIZE / 2;
        let lo = ((self.min_hz / bin_hz).floor() as usize).max(1);
        let hi = ((self.max_hz / bin_hz).ceil() as usize).min(nyquist_bin - 1);
        if lo >= hi {
            return None;
        }

        let window = hann_window(FFT_SIZE);
        let fft = FftPlanner::<f64>::new().plan_fft_forward(FFT_SIZE);

        let mut total = 0.0;
        let mut voiced = 0usize;
        for start in (0..mono.len()).step_by(HOP) {
            let mut buf: Vec<Complex<f64>> = (0..FFT_SIZE)
                .map(|i| Complex::new(mono.get(start + i).copied().unwrap_or(0.0) * window[i], 0.0))
                .collect();
            fft.process(&mut buf);
            let magnitudes: Vec<f64> = buf[..=nyquist_bin].iter().map(|c| c.norm()).collect();

            if let Some(freq) = self.frame_peak(&magnitudes, lo, hi, bin_hz) {
                total += freq;
                voiced += 1;
            }
            if start + FFT_SIZE >= mono.len() {
                break;
            }
        }

        if voiced == 0 {
            log::trace!("no pitched frames in {:.0} ms", audio.duration_ms());
            return None;
        }
        Some(total / voiced as f64)
    }
}
