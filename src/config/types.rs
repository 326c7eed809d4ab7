use serde::{Deserialize, Serialize};

use super::defaults::{clamp_sample_rate, default_extensions, default_false, default_log_level};
use crate::batch::ExtractionSettings;
use crate::capabilities::{Capabilities, ResamplerKind};
use crate::quality::{ClassifierProfile, Preset};

/// Complete on-disk configuration.
///
/// Every section is optional in the TOML file; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub corpus: CorpusSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Which files a run picks up and how it treats existing outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSettings {
    /// Extension allow-list, matched case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Re-extract clips whose archive already exists.
    #[serde(default = "default_false")]
    pub overwrite: bool,
    #[serde(default)]
    pub resampler: ResamplerKind,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            overwrite: default_false(),
            resampler: ResamplerKind::default(),
        }
    }
}

/// Classifier preset, optionally replaced by a full custom table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub preset: Preset,
    /// Full profile table; takes precedence over `preset` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ClassifierProfile>,
}

impl ClassifierSettings {
    /// The profile a run should use.
    pub fn resolve(&self) -> ClassifierProfile {
        self.profile
            .clone()
            .unwrap_or_else(|| ClassifierProfile::preset(self.preset))
            .normalized()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Clamp values into usable ranges.
    pub fn normalized(mut self) -> Self {
        let extraction = &mut self.extraction;
        extraction.sample_rate = clamp_sample_rate(extraction.sample_rate);
        extraction.spectral = extraction.spectral.normalized();
        let trim = &mut extraction.trim;
        if !trim.top_db.is_finite() || trim.top_db <= 0.0 {
            trim.top_db = crate::analysis::audio::TrimSettings::default().top_db;
        }
        trim.frame_length = trim.frame_length.max(1);
        trim.hop_length = trim.hop_length.clamp(1, trim.frame_length);
        if self.logging.level.trim().is_empty() {
            self.logging.level = default_log_level();
        }
        self
    }

    /// Decoder/resampler capabilities for this configuration.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::resolve(&self.corpus.extensions, self.corpus.resampler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.extraction.sample_rate, 16_000);
        assert_eq!(config.extraction.spectral.n_mels, 64);
        assert_eq!(config.corpus.extensions, default_extensions());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [extraction]
            sample_rate = 22050

            [extraction.spectral]
            n_mfcc = 20

            [corpus]
            overwrite = true
            resampler = "linear"

            [classifier]
            preset = "calibrated"
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.extraction.sample_rate, 22_050);
        assert_eq!(config.extraction.spectral.n_mfcc, 20);
        assert_eq!(config.extraction.spectral.hop_size, 512);
        assert_eq!(config.extraction.trim.top_db, 25.0);
        assert!(config.corpus.overwrite);
        assert_eq!(config.corpus.resampler, ResamplerKind::Linear);
        assert_eq!(config.classifier.resolve().name, "calibrated");
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let mut config = AppConfig::default();
        config.extraction.sample_rate = 10;
        config.extraction.trim.hop_length = 0;
        config.extraction.spectral.n_mfcc = 500;
        let config = config.normalized();
        assert_eq!(config.extraction.sample_rate, 4_000);
        assert_eq!(config.extraction.trim.hop_length, 1);
        assert_eq!(config.extraction.spectral.n_mfcc, 64);
    }

    #[test]
    fn custom_profile_overrides_preset() {
        let mut profile = ClassifierProfile::preset(Preset::Robust);
        profile.name = "custom".into();
        let settings = ClassifierSettings {
            preset: Preset::Calibrated,
            profile: Some(profile),
        };
        assert_eq!(settings.resolve().name, "custom");
    }
}
