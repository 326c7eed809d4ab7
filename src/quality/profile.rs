//! Classifier parameter tables and named presets.

use serde::{Deserialize, Serialize};

/// Input quantity a score component reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RmsDb,
    DynamicRangeDb,
    ZeroCrossingRate,
    SpectralCentroidHz,
    FileSizeBytes,
    BitrateBps,
    OriginalSampleRate,
    DurationSec,
}

/// Closed interval awarding `points`; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub points: f64,
}

impl ScoreBand {
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// One additive sub-score: the first matching band wins, else `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub metric: Metric,
    pub bands: Vec<ScoreBand>,
    #[serde(default)]
    pub fallback: f64,
}

/// Points subtracted from the composite score when an indicator fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penalties {
    pub multiple_speakers: f64,
    pub background_noise: f64,
    /// High-frequency penalty; `None` disables the indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_frequency: Option<HighFrequencyPenalty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighFrequencyPenalty {
    /// Share of spectral magnitude above 30 % of Nyquist that triggers it.
    pub ratio_above: f32,
    pub points: f64,
}

/// Speaker-related predicate of a noise tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRule {
    #[default]
    None,
    Multiple,
    MultipleAndBackground,
}

/// Indicator counting for one noise level; `min_hits` predicates must hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTally {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rms_db_above: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_range_below: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zcr_above: Option<f32>,
    #[serde(default)]
    pub speakers: SpeakerRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_below: Option<f64>,
    pub min_hits: u32,
}

/// Any one predicate marks a clip as medium noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediumRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rms_db_above: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_range_below: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_below: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseRules {
    pub very_high: IndicatorTally,
    pub high: IndicatorTally,
    pub medium: MediumRule,
}

/// Score cuts below which the recommendation drops a grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCuts {
    pub exclude_below: f64,
    pub review_below: f64,
    pub acceptable_below: f64,
}

impl Default for RecommendationCuts {
    fn default() -> Self {
        Self {
            exclude_below: 30.0,
            review_below: 50.0,
            acceptable_below: 70.0,
        }
    }
}

/// Silence-interval detection and the speaker/background indicators it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceRules {
    pub floor_db: f32,
    pub min_duration_sec: f32,
    /// Intervals shorter than this count as short pauses.
    pub short_interval_sec: f32,
    /// Short-pause share above which multiple speakers are assumed.
    pub multiple_speakers_ratio: f32,
    /// Silence share below which background noise is assumed.
    pub background_noise_ratio: f32,
}

impl Default for SilenceRules {
    fn default() -> Self {
        Self {
            floor_db: -40.0,
            min_duration_sec: 0.1,
            short_interval_sec: 0.5,
            multiple_speakers_ratio: 0.4,
            background_noise_ratio: 0.1,
        }
    }
}

/// Complete parameter table driving the quality classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierProfile {
    pub name: String,
    pub silence: SilenceRules,
    pub components: Vec<ScoreComponent>,
    pub penalties: Penalties,
    pub noise: NoiseRules,
    #[serde(default)]
    pub recommendation: RecommendationCuts,
}

/// Built-in classifier profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Waveform and spectral sub-scores with two-hit noise tallies.
    #[default]
    Robust,
    /// Lenient container-metadata sub-scores with single-hit tallies.
    Calibrated,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Robust, Preset::Calibrated];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Robust => "robust",
            Preset::Calibrated => "calibrated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl Default for ClassifierProfile {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

fn band(min: Option<f64>, max: Option<f64>, points: f64) -> ScoreBand {
    ScoreBand { min, max, points }
}

fn at_least(min: f64, points: f64) -> ScoreBand {
    band(Some(min), None, points)
}

fn at_most(max: f64, points: f64) -> ScoreBand {
    band(None, Some(max), points)
}

fn between(min: f64, max: f64, points: f64) -> ScoreBand {
    band(Some(min), Some(max), points)
}

fn component(metric: Metric, bands: Vec<ScoreBand>, fallback: f64) -> ScoreComponent {
    ScoreComponent {
        metric,
        bands,
        fallback,
    }
}

impl ClassifierProfile {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Robust => robust(),
            Preset::Calibrated => calibrated(),
        }
    }

    /// Clamp silence rules and tally counts into a usable range.
    pub fn normalized(mut self) -> Self {
        let silence = &mut self.silence;
        silence.floor_db = silence.floor_db.min(0.0);
        silence.min_duration_sec = silence.min_duration_sec.max(0.0);
        silence.short_interval_sec = silence.short_interval_sec.max(0.0);
        silence.multiple_speakers_ratio = silence.multiple_speakers_ratio.clamp(0.0, 1.0);
        silence.background_noise_ratio = silence.background_noise_ratio.clamp(0.0, 1.0);
        self.noise.very_high.min_hits = self.noise.very_high.min_hits.max(1);
        self.noise.high.min_hits = self.noise.high.min_hits.max(1);
        self
    }
}

fn robust() -> ClassifierProfile {
    ClassifierProfile {
        name: Preset::Robust.as_str().to_string(),
        silence: SilenceRules::default(),
        components: vec![
            component(
                Metric::RmsDb,
                vec![
                    between(-25.0, -10.0, 25.0),
                    between(-35.0, -5.0, 20.0),
                    between(-45.0, 0.0, 15.0),
                ],
                5.0,
            ),
            component(
                Metric::DynamicRangeDb,
                vec![at_least(30.0, 25.0), at_least(20.0, 20.0), at_least(10.0, 15.0)],
                5.0,
            ),
            component(
                Metric::ZeroCrossingRate,
                vec![at_most(0.05, 20.0), at_most(0.1, 15.0), at_most(0.2, 10.0)],
                5.0,
            ),
            component(
                Metric::SpectralCentroidHz,
                vec![between(500.0, 3000.0, 20.0), between(200.0, 5000.0, 15.0)],
                10.0,
            ),
            component(
                Metric::FileSizeBytes,
                vec![
                    at_least(50_000.0, 10.0),
                    at_least(20_000.0, 8.0),
                    at_least(10_000.0, 5.0),
                ],
                0.0,
            ),
        ],
        penalties: Penalties {
            multiple_speakers: 15.0,
            background_noise: 10.0,
            high_frequency: Some(HighFrequencyPenalty {
                ratio_above: 0.4,
                points: 10.0,
            }),
        },
        noise: NoiseRules {
            very_high: IndicatorTally {
                rms_db_above: Some(-5.0),
                dynamic_range_below: Some(5.0),
                zcr_above: Some(0.3),
                speakers: SpeakerRule::MultipleAndBackground,
                score_below: Some(30.0),
                min_hits: 2,
            },
            high: IndicatorTally {
                rms_db_above: Some(-15.0),
                dynamic_range_below: Some(15.0),
                zcr_above: Some(0.2),
                speakers: SpeakerRule::Multiple,
                score_below: Some(50.0),
                min_hits: 2,
            },
            medium: MediumRule {
                rms_db_above: Some(-25.0),
                dynamic_range_below: Some(25.0),
                score_below: Some(70.0),
            },
        },
        recommendation: RecommendationCuts::default(),
    }
}

fn calibrated() -> ClassifierProfile {
    let level = |rms: f32, range: f32, score: f64| IndicatorTally {
        rms_db_above: Some(rms),
        dynamic_range_below: Some(range),
        zcr_above: None,
        speakers: SpeakerRule::None,
        score_below: Some(score),
        min_hits: 1,
    };
    ClassifierProfile {
        name: Preset::Calibrated.as_str().to_string(),
        silence: SilenceRules {
            floor_db: -30.0,
            multiple_speakers_ratio: 0.5,
            background_noise_ratio: 0.05,
            ..SilenceRules::default()
        },
        components: vec![
            component(
                Metric::BitrateBps,
                vec![
                    at_least(128_000.0, 25.0),
                    at_least(64_000.0, 20.0),
                    at_least(32_000.0, 15.0),
                ],
                10.0,
            ),
            component(
                Metric::OriginalSampleRate,
                vec![
                    at_least(44_100.0, 20.0),
                    at_least(22_050.0, 15.0),
                    at_least(16_000.0, 10.0),
                ],
                0.0,
            ),
            component(
                Metric::DurationSec,
                vec![between(2.0, 10.0, 20.0), between(1.0, 30.0, 15.0)],
                10.0,
            ),
            component(
                Metric::RmsDb,
                vec![between(-40.0, -5.0, 20.0), between(-50.0, 0.0, 15.0)],
                10.0,
            ),
            component(
                Metric::DynamicRangeDb,
                vec![at_least(10.0, 20.0), at_least(5.0, 15.0)],
                10.0,
            ),
        ],
        penalties: Penalties {
            multiple_speakers: 10.0,
            background_noise: 5.0,
            high_frequency: None,
        },
        noise: NoiseRules {
            very_high: level(-5.0, 5.0, 30.0),
            high: level(-10.0, 10.0, 50.0),
            medium: MediumRule {
                rms_db_above: Some(-15.0),
                dynamic_range_below: Some(15.0),
                score_below: Some(70.0),
            },
        },
        recommendation: RecommendationCuts::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_round_trip_through_toml() {
        for preset in Preset::ALL {
            let profile = ClassifierProfile::preset(preset);
            let text = toml::to_string(&profile).unwrap();
            let parsed: ClassifierProfile = toml::from_str(&text).unwrap();
            assert_eq!(parsed, profile, "{}", preset.as_str());
        }
    }

    #[test]
    fn preset_names_parse_case_insensitively() {
        assert_eq!(Preset::parse("Robust"), Some(Preset::Robust));
        assert_eq!(Preset::parse(" calibrated "), Some(Preset::Calibrated));
        assert_eq!(Preset::parse("strict"), None);
    }

    #[test]
    fn bands_are_closed_intervals() {
        let b = between(-25.0, -10.0, 25.0);
        assert!(b.contains(-25.0));
        assert!(b.contains(-10.0));
        assert!(!b.contains(-9.99));
        assert!(at_least(30.0, 1.0).contains(1e9));
    }

    #[test]
    fn normalized_keeps_tallies_reachable() {
        let mut profile = ClassifierProfile::default();
        profile.noise.high.min_hits = 0;
        profile.silence.multiple_speakers_ratio = 3.0;
        let profile = profile.normalized();
        assert_eq!(profile.noise.high.min_hits, 1);
        assert_eq!(profile.silence.multiple_speakers_ratio, 1.0);
    }
}
