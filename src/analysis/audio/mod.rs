//! Signal loading, normalization and silence trimming.

mod decode;
mod downmix;
mod loader;
mod normalize;
mod resample;
mod trim;

use std::ops::Range;

pub use decode::{DecodeError, DecodedAudio, decode_audio};
pub use downmix::downmix_to_mono;
pub use loader::{LoadError, LoadedClip, load_clip};
pub use normalize::{amplitude_to_db, normalize_peak_in_place, peak, rms};
pub use resample::{ResampleError, expected_output_len, resample};
pub use trim::{EmptySignalError, TrimSettings, trim_bounds, trim_silence};

/// Default analysis sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Mono, peak-normalized samples at the analysis rate, after silence trimming.
#[derive(Debug, Clone)]
pub struct NormalizedSignal {
    samples: Vec<f32>,
    sample_rate: u32,
    bounds: Range<usize>,
    trimmed: bool,
}

impl NormalizedSignal {
    pub(crate) fn new(samples: Vec<f32>, sample_rate: u32, bounds: Range<usize>, trimmed: bool) -> Self {
        Self {
            samples,
            sample_rate,
            bounds,
            trimmed,
        }
    }

    /// Trimmed samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Trim bounds in samples, relative to the untrimmed signal.
    pub fn bounds(&self) -> Range<usize> {
        self.bounds.clone()
    }

    /// True when trimming removed at least one sample.
    pub fn trimmed(&self) -> bool {
        self.trimmed
    }

    pub fn duration_seconds(&self) -> f32 {
        duration_seconds(self.samples.len(), self.sample_rate)
    }
}

pub(crate) fn duration_seconds(sample_count: usize, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f32 / sample_rate as f32
}
