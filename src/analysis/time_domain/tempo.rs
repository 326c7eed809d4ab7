//! Global tempo from log-mel onset strength.

use ndarray::Array2;

const MIN_BPM: f32 = 30.0;
const MAX_BPM: f32 = 300.0;
const PRIOR_BPM: f32 = 120.0;
/// Width of the log-normal tempo prior, in octaves.
const PRIOR_OCTAVES: f32 = 1.0;

/// Mean positive frame-to-frame log-mel difference; frame 0 is 0.
pub(crate) fn onset_strength(log_mel: &Array2<f32>) -> Vec<f32> {
    let (bands, frames) = log_mel.dim();
    let mut envelope = vec![0.0_f32; frames];
    if bands == 0 {
        return envelope;
    }
    for t in 1..frames {
        let mut sum = 0.0_f64;
        for b in 0..bands {
            sum += (log_mel[[b, t]] - log_mel[[b, t - 1]]).max(0.0) as f64;
        }
        envelope[t] = (sum / bands as f64) as f32;
    }
    envelope
}

/// Estimate the global tempo in BPM, or `None` when the envelope is too short
/// or carries no periodicity.
pub(crate) fn estimate_tempo(log_mel: &Array2<f32>, sample_rate: u32, hop: usize) -> Option<f32> {
    let envelope = onset_strength(log_mel);
    let frame_rate = sample_rate.max(1) as f32 / hop.max(1) as f32;
    let min_lag = ((60.0 * frame_rate / MAX_BPM).round() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / MIN_BPM).round() as usize).min(envelope.len().saturating_sub(1));
    if max_lag < min_lag || envelope.len() < 2 * min_lag + 1 {
        return None;
    }
    let mean = envelope.iter().map(|&v| v as f64).sum::<f64>() / envelope.len() as f64;
    let centered: Vec<f64> = envelope.iter().map(|&v| v as f64 - mean).collect();
    let energy: f64 = centered.iter().map(|v| v * v).sum();
    if energy <= 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in min_lag..=max_lag {
        let ac: f64 = centered[..centered.len() - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if ac <= 0.0 {
            continue;
        }
        let bpm = 60.0 * frame_rate / lag as f32;
        let score = ac * prior_weight(bpm) as f64;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((lag, score));
        }
    }
    best.map(|(lag, _)| 60.0 * frame_rate / lag as f32)
}

fn prior_weight(bpm: f32) -> f32 {
    let octaves = (bpm / PRIOR_BPM).log2() / PRIOR_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}
