use std::collections::BTreeMap;

use ndarray::{ArrayView1, ArrayViewD};

use super::audio::{NormalizedSignal, amplitude_to_db};
use super::frequency_domain::{SpectralEngine, SpectralFeatures, row_mean};
use super::time_domain::{TemporalFeatures, estimate_tempo, extract_temporal_features};

/// Archive member names, in write order.
pub const FEATURE_NAMES: [&str; 10] = [
    "waveform",
    "mfcc",
    "log_mel",
    "spectral_contrast",
    "chroma",
    "spectral_centroid",
    "spectral_bandwidth",
    "rms",
    "zcr",
    "pitch",
];

/// All descriptors derived from one normalized signal.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub sample_rate: u32,
    pub waveform: Vec<f32>,
    pub spectral: SpectralFeatures,
    pub temporal: TemporalFeatures,
    pub tempo_bpm: Option<f32>,
}

impl FeatureSet {
    pub fn frames(&self) -> usize {
        self.spectral.frames
    }

    pub fn voiced_ratio(&self) -> f32 {
        self.temporal.pitch.voiced_ratio
    }

    /// Every named array as an n-dimensional view, in archive order.
    pub fn named_arrays(&self) -> Vec<(&'static str, ArrayViewD<'_, f32>)> {
        let s = &self.spectral;
        let t = &self.temporal;
        let views = [
            ArrayView1::from(&self.waveform[..]).into_dyn(),
            s.mfcc.view().into_dyn(),
            s.log_mel.view().into_dyn(),
            s.contrast.view().into_dyn(),
            s.chroma.view().into_dyn(),
            s.centroid.view().into_dyn(),
            s.bandwidth.view().into_dyn(),
            t.rms.view().into_dyn(),
            t.zcr.view().into_dyn(),
            ArrayView1::from(&t.pitch.pitch[..]).into_dyn(),
        ];
        FEATURE_NAMES.into_iter().zip(views).collect()
    }

    /// Shape of each named array.
    pub fn shapes(&self) -> BTreeMap<String, Vec<usize>> {
        self.named_arrays()
            .into_iter()
            .map(|(name, view)| (name.to_string(), view.shape().to_vec()))
            .collect()
    }

    /// Mean of the per-frame RMS envelope in dB.
    ///
    /// Frames are floored at [`RMS_DB_AMIN`] and at [`RMS_DB_RANGE`] below
    /// the loudest frame, so stretches of digital silence cannot dominate.
    pub fn rms_db_mean(&self) -> f32 {
        floored_db_mean(self.temporal.rms.iter().copied())
    }

    pub fn spectral_centroid_mean(&self) -> f32 {
        row_mean(&self.spectral.centroid)
    }

    pub fn spectral_bandwidth_mean(&self) -> f32 {
        row_mean(&self.spectral.bandwidth)
    }
}

/// Smallest amplitude the manifest level summary resolves (-100 dB).
pub const RMS_DB_AMIN: f32 = 1e-5;
/// Dynamic range kept below the loudest frame in the level summary.
pub const RMS_DB_RANGE: f32 = 80.0;

fn floored_db_mean(levels: impl Iterator<Item = f32>) -> f32 {
    let db: Vec<f32> = levels
        .map(|level| 20.0 * level.max(RMS_DB_AMIN).log10())
        .collect();
    let Some(loudest) = db.iter().copied().reduce(f32::max) else {
        return amplitude_to_db(RMS_DB_AMIN);
    };
    let floor = loudest - RMS_DB_RANGE;
    let sum: f64 = db.iter().map(|&value| value.max(floor) as f64).sum();
    (sum / db.len() as f64) as f32
}

/// Compute the full descriptor set for `signal` with a prepared engine.
pub fn extract_features(engine: &mut SpectralEngine, signal: &NormalizedSignal) -> FeatureSet {
    let samples = signal.samples();
    let sample_rate = signal.sample_rate();
    let frame_size = engine.settings().frame_size;
    let hop = engine.settings().hop_size;
    let spectral = engine.analyze(samples);
    let temporal = extract_temporal_features(samples, sample_rate, frame_size, hop);
    let tempo_bpm = estimate_tempo(&spectral.log_mel, sample_rate, hop);
    FeatureSet {
        sample_rate,
        waveform: samples.to_vec(),
        spectral,
        temporal,
        tempo_bpm,
    }
}
