use ndarray::Array2;

use crate::analysis::framing::{frame_at, frame_count};

/// Per-frame RMS, frames zero-padded to `frame_size`.
pub(crate) fn rms_frames(samples: &[f32], frame_size: usize, hop: usize) -> Array2<f32> {
    let frames = frame_count(samples.len(), frame_size, hop);
    let denom = frame_size.max(1) as f64;
    Array2::from_shape_fn((1, frames), |(_, idx)| {
        let sum: f64 = frame_at(samples, idx, frame_size, hop)
            .iter()
            .map(|&s| sanitize_sample(s) as f64)
            .map(|s| s * s)
            .sum();
        (sum / denom).sqrt() as f32
    })
}

/// Per-frame fraction of adjacent sample pairs that change sign.
pub(crate) fn zcr_frames(samples: &[f32], frame_size: usize, hop: usize) -> Array2<f32> {
    let frames = frame_count(samples.len(), frame_size, hop);
    let denom = frame_size.max(1) as f32;
    Array2::from_shape_fn((1, frames), |(_, idx)| {
        sign_changes(frame_at(samples, idx, frame_size, hop)) as f32 / denom
    })
}

/// Sign changes over the whole signal divided by its length.
pub(crate) fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    sign_changes(samples) as f32 / samples.len() as f32
}

fn sign_changes(samples: &[f32]) -> u64 {
    let Some((&first, rest)) = samples.split_first() else {
        return 0;
    };
    let mut crossings = 0u64;
    let mut prev = sanitize_sample(first);
    for &sample in rest {
        let current = sanitize_sample(sample);
        let crossed = (prev >= 0.0 && current < 0.0) || (prev < 0.0 && current >= 0.0);
        if crossed {
            crossings += 1;
        }
        prev = current;
    }
    crossings
}

fn sanitize_sample(sample: f32) -> f32 {
    if sample.is_finite() { sample } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_has_unit_rms_and_no_crossings() {
        let samples = vec![1.0_f32; 4096];
        let rms = rms_frames(&samples, 1024, 512);
        assert_eq!(rms.dim(), (1, 7));
        assert!(rms.iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(zcr_frames(&samples, 1024, 512).iter().all(|&v| v == 0.0));
        assert_eq!(zero_crossing_rate(&samples), 0.0);
    }

    #[test]
    fn alternating_signal_has_high_zero_crossing_rate() {
        let samples: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let zcr = zcr_frames(&samples, 1024, 512);
        assert!(zcr.iter().all(|&v| v > 0.99 && v <= 1.0));
        assert!(zero_crossing_rate(&samples) > 0.99);
    }

    #[test]
    fn short_signal_counts_padding_in_denominator() {
        let rms = rms_frames(&[1.0; 256], 1024, 512);
        assert_eq!(rms.dim(), (1, 1));
        assert!((rms[[0, 0]] - 0.5).abs() < 1e-6);
    }
}
