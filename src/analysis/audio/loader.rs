use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::decode::{DecodeError, decode_audio};
use super::downmix::downmix_to_mono;
use super::normalize::{amplitude_to_db, normalize_peak_in_place, peak};
use super::resample::{ResampleError, resample};
use crate::capabilities::Capabilities;

/// Decoded, mono, resampled and peak-normalized clip, before trimming.
#[derive(Debug, Clone)]
pub struct LoadedClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub original_sample_rate: u32,
    pub original_duration_sec: f32,
    /// Peak level in dBFS before normalization; the gain that was removed.
    pub source_peak_db: f32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Failed to resample {path} from {from} Hz to {to} Hz: {source}")]
    Resample {
        path: PathBuf,
        from: u32,
        to: u32,
        source: ResampleError,
    },
}

/// Decode `path`, downmix to mono, resample to `target_rate` and peak-normalize.
pub fn load_clip(
    path: &Path,
    target_rate: u32,
    capabilities: &Capabilities,
) -> Result<LoadedClip, LoadError> {
    let decoded = decode_audio(path)?;
    let original_duration_sec = decoded.duration_seconds();
    let mono = downmix_to_mono(&decoded.samples, decoded.channels);
    let mut samples = resample(&mono, decoded.sample_rate, target_rate, capabilities.resampler)
        .map_err(|source| LoadError::Resample {
            path: path.to_path_buf(),
            from: decoded.sample_rate,
            to: target_rate,
            source,
        })?;
    let source_peak_db = amplitude_to_db(peak(&samples));
    normalize_peak_in_place(&mut samples);
    debug!(
        path = %path.display(),
        native_rate = decoded.sample_rate,
        channels = decoded.channels,
        samples = samples.len(),
        source_peak_db,
        "Loaded clip"
    );
    Ok(LoadedClip {
        samples,
        sample_rate: target_rate,
        original_sample_rate: decoded.sample_rate,
        original_duration_sec,
        source_peak_db,
    })
}
