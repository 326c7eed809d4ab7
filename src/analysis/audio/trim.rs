use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::NormalizedSignal;
use super::normalize::{AMPLITUDE_FLOOR, amplitude_to_db, rms};

/// Frame and threshold settings for leading/trailing silence removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSettings {
    /// Frames quieter than the loudest frame by more than this are silent.
    pub top_db: f32,
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            top_db: 25.0,
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

/// No frame of the signal is above the trim threshold.
#[derive(Debug, Clone, Error)]
#[error("Signal is empty after trimming silence at {top_db} dB")]
pub struct EmptySignalError {
    pub top_db: f32,
}

/// Trim leading and trailing silence, taking ownership of the samples.
pub fn trim_silence(
    samples: Vec<f32>,
    sample_rate: u32,
    settings: &TrimSettings,
) -> Result<NormalizedSignal, EmptySignalError> {
    let bounds = trim_bounds(&samples, settings)?;
    let full_len = samples.len();
    let trimmed = bounds.start != 0 || bounds.end != full_len;
    let kept = if trimmed {
        samples[bounds.clone()].to_vec()
    } else {
        samples
    };
    Ok(NormalizedSignal::new(kept, sample_rate, bounds, trimmed))
}

/// Sample range spanning the first through last non-silent frame.
///
/// Only whole frames are measured. Samples past the last whole frame are kept
/// when that frame is non-silent, so a clip without edge silence keeps its
/// full length. Re-trimming the returned range lands on the same frame grid
/// with the same loudest frame and keeps every sample.
pub fn trim_bounds(samples: &[f32], settings: &TrimSettings) -> Result<Range<usize>, EmptySignalError> {
    let empty = || EmptySignalError {
        top_db: settings.top_db,
    };
    if samples.is_empty() {
        return Err(empty());
    }
    let frame_length = settings.frame_length.max(1);
    let hop = settings.hop_length.max(1);
    let levels = frame_levels(samples, frame_length, hop);
    let loudest = levels.iter().copied().fold(0.0_f32, f32::max);
    if loudest <= AMPLITUDE_FLOOR {
        return Err(empty());
    }

    let loudest_db = amplitude_to_db(loudest);
    let threshold = -settings.top_db.abs();
    let is_voiced = |level: f32| level > AMPLITUDE_FLOOR && amplitude_to_db(level) - loudest_db > threshold;
    let first = levels.iter().position(|&level| is_voiced(level)).ok_or_else(empty)?;
    let last = levels.iter().rposition(|&level| is_voiced(level)).ok_or_else(empty)?;

    let start = (first * hop).min(samples.len());
    let end = if last + 1 == levels.len() {
        samples.len()
    } else {
        (last * hop + frame_length).min(samples.len())
    };
    Ok(start..end.max(start + 1))
}

fn frame_levels(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    if samples.len() <= frame_length {
        return vec![rms(samples)];
    }
    let count = (samples.len() - frame_length) / hop + 1;
    (0..count)
        .map(|idx| {
            let start = idx * hop;
            rms(&samples[start..start + frame_length])
        })
        .collect()
}
