//! JSON-lines manifest of extracted clips.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pipeline::ClipAnalysis;
use crate::quality::QualityAssessment;

/// Default manifest file name inside the output root.
pub const MANIFEST_FILE_NAME: &str = "manifest.jsonl";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode manifest record for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid manifest record at {path}:{line}: {source}")]
    Decode {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("Failed to move manifest into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// One manifest line per successfully extracted clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSummary {
    pub audio_path: PathBuf,
    pub category: String,
    pub sample_id: String,
    pub features_path: PathBuf,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_sec: f32,
    pub original_sample_rate: u32,
    pub original_duration_sec: f32,
    pub trimmed: bool,
    /// Mean of the per-frame RMS envelope in dB.
    pub rms_db: f32,
    pub spectral_centroid_mean: f32,
    pub spectral_bandwidth_mean: f32,
    pub pitch_voiced_ratio: f32,
    pub tempo_bpm: Option<f32>,
    pub feature_shapes: BTreeMap<String, Vec<usize>>,
    pub quality: QualityAssessment,
}

impl ClipSummary {
    pub fn new(analysis: &ClipAnalysis, features_path: &Path) -> Self {
        let features = &analysis.features;
        let sample_rate = analysis.sample_rate();
        Self {
            audio_path: analysis.raw.path.clone(),
            category: analysis.raw.category.clone(),
            sample_id: analysis.raw.sample_id.clone(),
            features_path: features_path.to_path_buf(),
            sample_rate,
            sample_count: analysis.sample_count,
            duration_sec: crate::analysis::audio::duration_seconds(analysis.sample_count, sample_rate),
            original_sample_rate: analysis.raw.original_sample_rate,
            original_duration_sec: analysis.raw.original_duration_sec,
            trimmed: analysis.trimmed,
            rms_db: features.rms_db_mean(),
            spectral_centroid_mean: features.spectral_centroid_mean(),
            spectral_bandwidth_mean: features.spectral_bandwidth_mean(),
            pitch_voiced_ratio: features.voiced_ratio(),
            tempo_bpm: features.tempo_bpm,
            feature_shapes: features.shapes(),
            quality: analysis.quality.clone(),
        }
    }
}

/// Replace `path` with one JSON line per record (an empty file for none).
pub fn write_manifest(path: &Path, records: &[ClipSummary]) -> Result<(), ManifestError> {
    let io_err = |source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    let mut temp = tempfile::Builder::new()
        .prefix(".manifest")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(|source| ManifestError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|source| ManifestError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Parse a manifest, skipping blank lines.
pub fn read_manifest(path: &Path) -> Result<Vec<ClipSummary>, ManifestError> {
    let file = File::open(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ManifestError::Decode {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
