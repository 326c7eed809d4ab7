use super::profile::{
    ClassifierProfile, IndicatorTally, MediumRule, Metric, RecommendationCuts, ScoreComponent,
    SpeakerRule,
};
use super::{NoiseLevel, QualityInputs, Recommendation};

/// Indicator values one classification works from.
pub(super) struct Indicators {
    pub(super) rms_db: f32,
    pub(super) dynamic_range_db: f32,
    pub(super) zcr: f32,
    pub(super) multiple_speakers: bool,
    pub(super) background_noise: bool,
    pub(super) high_frequency_noise: bool,
}

fn metric_value(inputs: &QualityInputs, metric: Metric) -> Option<f64> {
    let value = match metric {
        Metric::RmsDb => Some(inputs.rms_db as f64),
        Metric::DynamicRangeDb => Some(inputs.dynamic_range_db() as f64),
        Metric::ZeroCrossingRate => Some(inputs.zero_crossing_rate as f64),
        Metric::SpectralCentroidHz => Some(inputs.spectral_centroid_hz as f64),
        Metric::FileSizeBytes => inputs.file_size_bytes.map(|size| size as f64),
        Metric::BitrateBps => inputs.bitrate_bps(),
        Metric::OriginalSampleRate => Some(inputs.original_sample_rate as f64),
        Metric::DurationSec => Some(inputs.original_duration_sec as f64),
    };
    value.filter(|v| v.is_finite())
}

/// Points for one component, clamped to its own `[0, max points]` range.
fn component_points(component: &ScoreComponent, value: Option<f64>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let ceiling = component
        .bands
        .iter()
        .map(|band| band.points)
        .fold(component.fallback, f64::max)
        .max(0.0);
    component
        .bands
        .iter()
        .find(|band| band.contains(value))
        .map_or(component.fallback, |band| band.points)
        .clamp(0.0, ceiling)
}

pub(super) fn composite_score(
    profile: &ClassifierProfile,
    inputs: &QualityInputs,
    indicators: &Indicators,
) -> f64 {
    let mut score: f64 = profile
        .components
        .iter()
        .map(|component| component_points(component, metric_value(inputs, component.metric)))
        .sum();
    let penalties = &profile.penalties;
    if indicators.multiple_speakers {
        score -= penalties.multiple_speakers.max(0.0);
    }
    if indicators.background_noise {
        score -= penalties.background_noise.max(0.0);
    }
    if indicators.high_frequency_noise {
        score -= penalties.high_frequency.map_or(0.0, |hf| hf.points.max(0.0));
    }
    score.clamp(0.0, 100.0)
}

fn tally_hits(tally: &IndicatorTally, indicators: &Indicators, score: f64) -> u32 {
    let speakers = match tally.speakers {
        SpeakerRule::None => false,
        SpeakerRule::Multiple => indicators.multiple_speakers,
        SpeakerRule::MultipleAndBackground => {
            indicators.multiple_speakers && indicators.background_noise
        }
    };
    [
        tally.rms_db_above.is_some_and(|limit| indicators.rms_db > limit),
        tally
            .dynamic_range_below
            .is_some_and(|limit| indicators.dynamic_range_db < limit),
        tally.zcr_above.is_some_and(|limit| indicators.zcr > limit),
        speakers,
        tally.score_below.is_some_and(|cut| score < cut),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count() as u32
}

fn medium_hit(rule: &MediumRule, indicators: &Indicators, score: f64) -> bool {
    rule.rms_db_above.is_some_and(|limit| indicators.rms_db > limit)
        || rule
            .dynamic_range_below
            .is_some_and(|limit| indicators.dynamic_range_db < limit)
        || rule.score_below.is_some_and(|cut| score < cut)
}

pub(super) fn noise_level(profile: &ClassifierProfile, indicators: &Indicators, score: f64) -> NoiseLevel {
    let rules = &profile.noise;
    if tally_hits(&rules.very_high, indicators, score) >= rules.very_high.min_hits.max(1) {
        NoiseLevel::VeryHigh
    } else if tally_hits(&rules.high, indicators, score) >= rules.high.min_hits.max(1) {
        NoiseLevel::High
    } else if medium_hit(&rules.medium, indicators, score) {
        NoiseLevel::Medium
    } else {
        NoiseLevel::Low
    }
}

pub(super) fn recommendation(cuts: &RecommendationCuts, level: NoiseLevel, score: f64) -> Recommendation {
    if level == NoiseLevel::VeryHigh || score < cuts.exclude_below {
        Recommendation::Exclude
    } else if level == NoiseLevel::High || score < cuts.review_below {
        Recommendation::Review
    } else if level == NoiseLevel::Medium || score < cuts.acceptable_below {
        Recommendation::Acceptable
    } else {
        Recommendation::Good
    }
}
