//! Corpus-level quality report.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::batch::{BatchError, ClipPipeline, ManifestError, collect_corpus, read_manifest};
use crate::quality::{NoiseLevel, QualityAssessment, Recommendation};

/// Noise label used for files that could not be analyzed.
pub const UNKNOWN_NOISE_LEVEL: &str = "unknown";
/// Recommendation label used for files that could not be analyzed.
pub const ERROR_RECOMMENDATION: &str = "ERROR";
/// Score below which a file is listed as noisy regardless of its level.
const NOISY_SCORE_BELOW: f64 = 50.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("Report I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode report {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to move report into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoiseLevelCounts {
    pub very_high: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecommendationCounts {
    pub exclude: usize,
    pub review: usize,
    pub acceptable: usize,
    pub good: usize,
}

/// Per-file line of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileQuality {
    pub file: PathBuf,
    pub noise_level: String,
    pub quality_score: f64,
    pub recommendation: String,
    #[serde(default)]
    pub multiple_speakers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileQuality {
    fn analyzed(file: PathBuf, quality: &QualityAssessment) -> Self {
        Self {
            file,
            noise_level: quality.noise_level.as_str().to_string(),
            quality_score: quality.quality_score,
            recommendation: quality.recommendation.as_str().to_string(),
            multiple_speakers: quality.multiple_speakers,
            error: None,
        }
    }

    fn failed(file: PathBuf, error: String) -> Self {
        Self {
            file,
            noise_level: UNKNOWN_NOISE_LEVEL.to_string(),
            quality_score: 0.0,
            recommendation: ERROR_RECOMMENDATION.to_string(),
            multiple_speakers: false,
            error: Some(error),
        }
    }

    fn is_noisy(&self) -> bool {
        self.error.is_none()
            && (self.noise_level == NoiseLevel::High.as_str()
                || self.noise_level == NoiseLevel::VeryHigh.as_str()
                || self.quality_score < NOISY_SCORE_BELOW)
    }
}

/// Aggregate classification of a set of files.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_files: usize,
    pub analyzed: usize,
    pub errors: usize,
    pub noise_levels: NoiseLevelCounts,
    pub recommendations: RecommendationCounts,
    pub multiple_speakers: usize,
    pub files: Vec<FileQuality>,
    pub noisy_files: Vec<FileQuality>,
}

impl QualityReport {
    pub fn record_assessment(&mut self, file: PathBuf, quality: &QualityAssessment) {
        self.total_files += 1;
        self.analyzed += 1;
        let levels = &mut self.noise_levels;
        match quality.noise_level {
            NoiseLevel::VeryHigh => levels.very_high += 1,
            NoiseLevel::High => levels.high += 1,
            NoiseLevel::Medium => levels.medium += 1,
            NoiseLevel::Low => levels.low += 1,
        }
        let recs = &mut self.recommendations;
        match quality.recommendation {
            Recommendation::Exclude => recs.exclude += 1,
            Recommendation::Review => recs.review += 1,
            Recommendation::Acceptable => recs.acceptable += 1,
            Recommendation::Good => recs.good += 1,
        }
        if quality.multiple_speakers {
            self.multiple_speakers += 1;
        }
        self.push(FileQuality::analyzed(file, quality));
    }

    pub fn record_error(&mut self, file: PathBuf, error: String) {
        self.total_files += 1;
        self.errors += 1;
        self.noise_levels.unknown += 1;
        self.push(FileQuality::failed(file, error));
    }

    fn push(&mut self, entry: FileQuality) {
        if entry.is_noisy() {
            self.noisy_files.push(entry.clone());
        }
        self.files.push(entry);
    }
}

/// Classify every corpus file without writing feature archives.
pub fn report_from_corpus(root: &Path, pipeline: &mut ClipPipeline) -> Result<QualityReport, ReportError> {
    let files = collect_corpus(root, pipeline.capabilities())?;
    info!(root = %root.display(), files = files.len(), "Assessing corpus quality");
    let mut report = QualityReport::default();
    for file in &files {
        match pipeline.analyze(&file.path, &file.category(), &file.sample_id()) {
            Ok(analysis) => report.record_assessment(file.path.clone(), &analysis.quality),
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "Failed to assess clip");
                report.record_error(file.path.clone(), err.to_string());
            }
        }
    }
    Ok(report)
}

/// Rebuild the report from the assessments stored in a manifest.
pub fn report_from_manifest(manifest: &Path) -> Result<QualityReport, ReportError> {
    let mut report = QualityReport::default();
    for record in read_manifest(manifest)? {
        report.record_assessment(record.audio_path, &record.quality);
    }
    Ok(report)
}

/// Write `report` as pretty-printed JSON, replacing `path` atomically.
pub fn write_report(path: &Path, report: &QualityReport) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    let mut temp = tempfile::Builder::new()
        .prefix(".quality-report")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, report).map_err(|source| ReportError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|source| ReportError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
