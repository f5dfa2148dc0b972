use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Largest STFT analysis/synthesis window.
pub const WINDOW_SIZE: usize = 2048;

/// Smallest window used when the input is shorter than `WINDOW_SIZE`.
const MIN_WINDOW_SIZE: usize = 64;

/// Frames overlap by `window / OVERLAP` samples.
const OVERLAP: usize = 4;

/// Periodic Hann window.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

fn window_size_for(len: usize) -> usize {
    let mut size = WINDOW_SIZE;
    while size > MIN_WINDOW_SIZE && size > len {
        size /= 2;
    }
    size
}

fn wrap_phase(phase: f64) -> f64 {
    phase - 2.0 * PI * (phase / (2.0 * PI)).round()
}

/// Change the duration of a mono signal to exactly `target_len` samples
/// without changing its pitch.
///
/// STFT with centered frames, magnitude interpolation between neighbouring
/// analysis frames, phase accumulation from the instantaneous frequency of
/// each bin, then overlap-add ISTFT normalized by the squared window sum.
pub fn stretch_to_length(samples: &[f32], target_len: usize) -> Vec<f32> {
    let n = samples.len();
    if target_len == 0 {
        return Vec::new();
    }
    if n == 0 {
        return vec![0.0; target_len];
    }
    if n == target_len {
        return samples.to_vec();
    }

    let window = window_size_for(n);
    let hop = window / OVERLAP;
    let half = window / 2;
    let bins = window / 2 + 1;
    let rate = n as f64 / target_len as f64;
    let hann = hann_window(window);

    // Sample 0 sits at the center of frame 0.
    let analysis_frames = n / hop + 2;
    let mut padded = vec![0.0f64; (analysis_frames - 1) * hop + window];
    for (i, &s) in samples.iter().enumerate() {
        padded[half + i] = s as f64;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft_forward = planner.plan_fft_forward(window);
    let fft_inverse = planner.plan_fft_inverse(window);

    let spectra: Vec<Vec<Complex<f64>>> = (0..analysis_frames)
        .map(|t| {
            let start = t * hop;
            let mut buf: Vec<Complex<f64>> = (0..window)
                .map(|i| Complex::new(padded[start + i] * hann[i], 0.0))
                .collect();
            fft_forward.process(&mut buf);
            buf.truncate(bins);
            buf
        })
        .collect();

    let expected_advance: Vec<f64> = (0..bins)
        .map(|k| 2.0 * PI * k as f64 * hop as f64 / window as f64)
        .collect();

    let synth_frames = (target_len + half) / hop + 2;
    let out_len = (synth_frames - 1) * hop + window;
    let mut output = vec![0.0f64; out_len];
    let mut window_sum = vec![0.0f64; out_len];

    let mut phase: Vec<f64> = spectra[0].iter().map(|c| c.arg()).collect();
    let last_pair = analysis_frames - 2;
    let norm = 1.0 / window as f64;

    for m in 0..synth_frames {
        let pos = m as f64 * rate;
        let i = (pos.floor() as usize).min(last_pair);
        let frac = (pos - i as f64).clamp(0.0, 1.0);
        let (cur, next) = (&spectra[i], &spectra[i + 1]);

        let mut synth_buf = vec![Complex::new(0.0, 0.0); window];
        for k in 0..bins {
            let mag = (1.0 - frac) * cur[k].norm() + frac * next[k].norm();
            synth_buf[k] = Complex::from_polar(mag, phase[k]);
            let deviation = wrap_phase(next[k].arg() - cur[k].arg() - expected_advance[k]);
            phase[k] += expected_advance[k] + deviation;
        }
        // Conjugate symmetry for a real output
        for k in 1..bins - 1 {
            synth_buf[window - k] = synth_buf[k].conj();
        }

        fft_inverse.process(&mut synth_buf);

        let start = m * hop;
        for (j, w) in hann.iter().enumerate() {
            output[start + j] += synth_buf[j].re * norm * w;
            window_sum[start + j] += w * w;
        }
    }

    (0..target_len)
        .map(|i| {
            let j = i + half;
            if window_sum[j] > 1e-6 {
                (output[j] / window_sum[j]) as f32
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_signals {
    /// Mono sine with unit amplitude scaled by `amplitude`.
    pub fn sine(freq: f64, duration: f64, sample_rate: u32, amplitude: f32) -> Vec<f32> {
        let len = (duration * sample_rate as f64) as usize;
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * freq * t).sin() as f32 * amplitude
            })
            .collect()
    }

    /// Frequency estimate from zero crossings over the middle half of the signal.
    pub fn zero_crossing_frequency(samples: &[f32], sample_rate: u32) -> f64 {
        let start = samples.len() / 4;
        let end = samples.len() * 3 / 4;
        let region = &samples[start..end];
        let crossings = region
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        crossings as f64 / 2.0 / (region.len() as f64 / sample_rate as f64)
    }
}
