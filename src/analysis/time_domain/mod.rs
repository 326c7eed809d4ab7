//! Time-domain and prosodic descriptors on the spectral frame grid.

mod frames;
mod pitch;
mod tempo;

use ndarray::Array2;

pub use pitch::PitchTrack;

pub(crate) use frames::zero_crossing_rate;
pub(crate) use tempo::estimate_tempo;

/// Frame-wise envelope, zero-crossing and pitch descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalFeatures {
    pub rms: Array2<f32>,
    pub zcr: Array2<f32>,
    pub pitch: PitchTrack,
}

impl TemporalFeatures {
    pub fn frames(&self) -> usize {
        self.rms.ncols()
    }
}

/// Extract RMS, ZCR and pitch for `samples` on a `frame_size`/`hop` grid.
pub fn extract_temporal_features(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop: usize,
) -> TemporalFeatures {
    TemporalFeatures {
        rms: frames::rms_frames(samples, frame_size, hop),
        zcr: frames::zcr_frames(samples, frame_size, hop),
        pitch: pitch::track_pitch(samples, sample_rate, frame_size, hop),
    }
}
