use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::audio::{
    DEFAULT_SAMPLE_RATE, EmptySignalError, LoadError, TrimSettings, load_clip, trim_silence,
};
use crate::analysis::{FeatureSet, SpectralEngine, SpectralSettings, extract_features};
use crate::archive::ArchiveError;
use crate::capabilities::Capabilities;
use crate::quality::{ClassifierProfile, QualityAssessment, QualityInputs, assess};

/// Per-file failure; the batch logs it and moves on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{path}: {source}")]
    EmptySignal {
        path: PathBuf,
        source: EmptySignalError,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Signal preparation and descriptor sizes shared by every clip of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub sample_rate: u32,
    pub trim: TrimSettings,
    pub spectral: SpectralSettings,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            trim: TrimSettings::default(),
            spectral: SpectralSettings::default(),
        }
    }
}

/// Source metadata of one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClip {
    pub path: PathBuf,
    pub category: String,
    pub sample_id: String,
    pub original_sample_rate: u32,
    pub original_duration_sec: f32,
    /// Peak level of the decoded audio before normalization, in dBFS.
    pub source_peak_db: f32,
    pub file_size_bytes: Option<u64>,
}

/// Everything derived from one clip.
#[derive(Debug, Clone)]
pub struct ClipAnalysis {
    pub raw: RawClip,
    pub sample_count: usize,
    pub trimmed: bool,
    pub features: FeatureSet,
    pub quality: QualityAssessment,
}

impl ClipAnalysis {
    pub fn sample_rate(&self) -> u32 {
        self.features.sample_rate
    }
}

/// Per-run state: capabilities, spectral plan and classifier profile.
pub struct ClipPipeline {
    settings: ExtractionSettings,
    capabilities: Capabilities,
    profile: ClassifierProfile,
    engine: SpectralEngine,
}

impl ClipPipeline {
    pub fn new(
        settings: ExtractionSettings,
        capabilities: Capabilities,
        profile: ClassifierProfile,
    ) -> Self {
        let engine = SpectralEngine::new(settings.sample_rate, settings.spectral);
        Self {
            settings,
            capabilities,
            profile,
            engine,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn profile(&self) -> &ClassifierProfile {
        &self.profile
    }

    /// Load, trim, extract and classify one file.
    pub fn analyze(&mut self, path: &Path, category: &str, sample_id: &str) -> Result<ClipAnalysis, ExtractError> {
        let loaded = load_clip(path, self.settings.sample_rate, &self.capabilities)?;
        let file_size_bytes = std::fs::metadata(path).ok().map(|meta| meta.len());
        let raw = RawClip {
            path: path.to_path_buf(),
            category: category.to_string(),
            sample_id: sample_id.to_string(),
            original_sample_rate: loaded.original_sample_rate,
            original_duration_sec: loaded.original_duration_sec,
            source_peak_db: loaded.source_peak_db,
            file_size_bytes,
        };
        let signal = trim_silence(loaded.samples, loaded.sample_rate, &self.settings.trim)
            .map_err(|source| ExtractError::EmptySignal {
                path: path.to_path_buf(),
                source,
            })?;
        let features = extract_features(&mut self.engine, &signal);
        let inputs = QualityInputs::from_features(
            &signal,
            &features,
            &self.profile.silence,
            raw.source_peak_db,
            raw.file_size_bytes,
            raw.original_sample_rate,
            raw.original_duration_sec,
        );
        let quality = assess(&inputs, &self.profile);
        debug!(
            path = %path.display(),
            frames = features.frames(),
            trimmed = signal.trimmed(),
            score = quality.quality_score,
            noise = %quality.noise_level,
            "Analyzed clip"
        );
        Ok(ClipAnalysis {
            raw,
            sample_count: signal.samples().len(),
            trimmed: signal.trimmed(),
            features,
            quality,
        })
    }
}
