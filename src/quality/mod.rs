//! Heuristic usability scoring for speech clips.
//!
//! One table-driven scorer; all thresholds and weights come from a
//! [`ClassifierProfile`].

mod profile;
mod scorer;
mod silence;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use profile::{
    ClassifierProfile, HighFrequencyPenalty, IndicatorTally, MediumRule, Metric, NoiseRules,
    Penalties, Preset, RecommendationCuts, ScoreBand, ScoreComponent, SilenceRules, SpeakerRule,
};
pub use silence::{SilenceDetector, SilenceInterval, SilenceStats, silence_stats};

use crate::analysis::audio::{amplitude_to_db, peak, rms};
use crate::analysis::time_domain::zero_crossing_rate;
use crate::analysis::{FeatureSet, audio::NormalizedSignal};

/// Ordinal noise estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl NoiseLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoiseLevel::Low => "low",
            NoiseLevel::Medium => "medium",
            NoiseLevel::High => "high",
            NoiseLevel::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for NoiseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a clip downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Good,
    Acceptable,
    Review,
    Exclude,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Good => "GOOD",
            Recommendation::Acceptable => "ACCEPTABLE",
            Recommendation::Review => "REVIEW",
            Recommendation::Exclude => "EXCLUDE",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar summaries the classifier reads.
///
/// Levels are in dBFS of the decoded source, not of the normalized signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityInputs {
    pub rms_db: f32,
    pub peak_db: f32,
    /// Sign changes per sample over the whole signal.
    pub zero_crossing_rate: f32,
    pub spectral_centroid_hz: f32,
    pub spectral_bandwidth_hz: f32,
    pub high_frequency_ratio: f32,
    pub silence: SilenceStats,
    pub file_size_bytes: Option<u64>,
    pub original_sample_rate: u32,
    pub original_duration_sec: f32,
}

impl QualityInputs {
    /// Collect classifier inputs from a trimmed signal and its descriptors.
    ///
    /// `source_peak_db` is the gain normalization removed; adding it back puts
    /// the levels on the source scale.
    pub fn from_features(
        signal: &NormalizedSignal,
        features: &FeatureSet,
        silence_rules: &SilenceRules,
        source_peak_db: f32,
        file_size_bytes: Option<u64>,
        original_sample_rate: u32,
        original_duration_sec: f32,
    ) -> Self {
        let samples = signal.samples();
        Self {
            rms_db: amplitude_to_db(rms(samples)) + source_peak_db,
            peak_db: amplitude_to_db(peak(samples)) + source_peak_db,
            zero_crossing_rate: zero_crossing_rate(samples),
            spectral_centroid_hz: features.spectral_centroid_mean(),
            spectral_bandwidth_hz: features.spectral_bandwidth_mean(),
            high_frequency_ratio: features.spectral.high_frequency_ratio,
            silence: silence_stats(samples, signal.sample_rate(), silence_rules),
            file_size_bytes,
            original_sample_rate,
            original_duration_sec,
        }
    }

    pub fn dynamic_range_db(&self) -> f32 {
        self.peak_db - self.rms_db
    }

    /// Container bitrate proxy from file size and duration.
    pub fn bitrate_bps(&self) -> Option<f64> {
        let size = self.file_size_bytes?;
        (self.original_duration_sec > 0.0)
            .then(|| size as f64 * 8.0 / self.original_duration_sec as f64)
    }
}

/// Outcome of classifying one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub rms_db: f32,
    pub peak_db: f32,
    pub dynamic_range_db: f32,
    pub zero_crossing_rate: f32,
    pub spectral_centroid_hz: f32,
    pub spectral_bandwidth_hz: f32,
    pub high_frequency_ratio: f32,
    pub silence: SilenceStats,
    pub multiple_speakers: bool,
    pub background_noise: bool,
    pub high_frequency_noise: bool,
    pub quality_score: f64,
    pub noise_level: NoiseLevel,
    pub recommendation: Recommendation,
}

/// Score and grade one clip. Never fails; non-finite inputs are treated as
/// silence-level values.
pub fn assess(inputs: &QualityInputs, profile: &ClassifierProfile) -> QualityAssessment {
    let floor = amplitude_to_db(0.0);
    let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
    let inputs = QualityInputs {
        rms_db: finite_or(inputs.rms_db, floor),
        peak_db: finite_or(inputs.peak_db, floor),
        zero_crossing_rate: finite_or(inputs.zero_crossing_rate, 0.0),
        spectral_centroid_hz: finite_or(inputs.spectral_centroid_hz, 0.0),
        spectral_bandwidth_hz: finite_or(inputs.spectral_bandwidth_hz, 0.0),
        high_frequency_ratio: finite_or(inputs.high_frequency_ratio, 0.0),
        ..*inputs
    };
    let high_frequency_noise = profile
        .penalties
        .high_frequency
        .is_some_and(|hf| inputs.high_frequency_ratio > hf.ratio_above);
    let indicators = scorer::Indicators {
        rms_db: inputs.rms_db,
        dynamic_range_db: inputs.dynamic_range_db(),
        zcr: inputs.zero_crossing_rate,
        multiple_speakers: inputs.silence.multiple_speakers,
        background_noise: inputs.silence.background_noise,
        high_frequency_noise,
    };
    let quality_score = scorer::composite_score(profile, &inputs, &indicators);
    let noise_level = scorer::noise_level(profile, &indicators, quality_score);
    let recommendation = scorer::recommendation(&profile.recommendation, noise_level, quality_score);
    QualityAssessment {
        rms_db: inputs.rms_db,
        peak_db: inputs.peak_db,
        dynamic_range_db: indicators.dynamic_range_db,
        zero_crossing_rate: inputs.zero_crossing_rate,
        spectral_centroid_hz: inputs.spectral_centroid_hz,
        spectral_bandwidth_hz: inputs.spectral_bandwidth_hz,
        high_frequency_ratio: inputs.high_frequency_ratio,
        silence: inputs.silence,
        multiple_speakers: indicators.multiple_speakers,
        background_noise: indicators.background_noise,
        high_frequency_noise,
        quality_score,
        noise_level,
        recommendation,
    }
}
