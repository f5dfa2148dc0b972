use super::phase_vocoder::hann_window;

/// Grain length.
const FRAME_MS: f64 = 30.0;

/// How far a grain may drift from its nominal position to line up with the
/// previous one.
const SEARCH_MS: f64 = 5.0;

/// Cross-correlation looks at every Nth sample of the grain.
const CORRELATION_STRIDE: usize = 4;

/// Waveform-similarity overlap-add time stretch.
///
/// All channels share the grain positions chosen on their mono mix, so the
/// stereo image survives. Output channels are exactly `target_len` long.
pub fn stretch(channels: &[Vec<f32>], sample_rate: u32, target_len: usize) -> Vec<Vec<f32>> {
    let n = channels.first().map_or(0, Vec::len);
    if target_len == 0 {
        return vec![Vec::new(); channels.len()];
    }
    if n == 0 {
        return vec![vec![0.0; target_len]; channels.len()];
    }
    if n == target_len {
        return channels.to_vec();
    }

    let frame_len = ((FRAME_MS * sample_rate as f64 / 1000.0) as usize / 2 * 2)
        .min(n / 2 * 2)
        .max(2);
    let synth_hop = frame_len / 2;
    let analysis_hop = synth_hop as f64 * n as f64 / target_len as f64;
    let search = (SEARCH_MS * sample_rate as f64 / 1000.0) as usize;
    let window = hann_window(frame_len);
    let max_start = n.saturating_sub(frame_len);

    let guide: Vec<f32> = (0..n)
        .map(|i| channels.iter().map(|c| c[i]).sum::<f32>() / channels.len() as f32)
        .collect();

    let synth_frames = target_len / synth_hop + 2;
    let out_len = (synth_frames - 1) * synth_hop + frame_len;
    let mut outputs = vec![vec![0.0f32; out_len]; channels.len()];
    let mut window_sum = vec![0.0f64; out_len];

    let mut prev = 0usize;
    for m in 0..synth_frames {
        let nominal = (m as f64 * analysis_hop).round() as usize;
        let pos = if m == 0 {
            0
        } else {
            best_aligned_start(&guide, prev + synth_hop, nominal, search, frame_len, max_start)
        };

        let out_start = m * synth_hop;
        for (channel, output) in channels.iter().zip(outputs.iter_mut()) {
            for (i, w) in window.iter().enumerate() {
                let s = channel.get(pos + i).copied().unwrap_or(0.0);
                output[out_start + i] += s * *w as f32;
            }
        }
        for (i, w) in window.iter().enumerate() {
            window_sum[out_start + i] += w;
        }
        prev = pos;
    }

    outputs
        .into_iter()
        .map(|output| {
            (0..target_len)
                .map(|i| {
                    if window_sum[i] > 1e-3 {
                        (output[i] as f64 / window_sum[i]) as f32
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Start position within `nominal ± search` whose grain best continues the
/// grain that would naturally follow the previous one.
fn best_aligned_start(
    guide: &[f32],
    natural: usize,
    nominal: usize,
    search: usize,
    frame_len: usize,
    max_start: usize,
) -> usize {
    let nominal = nominal.min(max_start);
    if natural + frame_len > guide.len() {
        return nominal;
    }
    let template = &guide[natural..natural + frame_len];
    let lo = nominal.saturating_sub(search);
    let hi = (nominal + search).min(max_start);

    let mut best = nominal;
    let mut best_score = f64::NEG_INFINITY;
    for candidate in lo..=hi {
        let score: f64 = (0..frame_len)
            .step_by(CORRELATION_STRIDE)
            .map(|i| template[i] as f64 * guide[candidate + i] as f64)
            .sum();
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }
    best
}
