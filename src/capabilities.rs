//! Decoder and resampler capabilities, resolved once per run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Extensions the built-in decoders can read (lowercase, without dots).
pub const DECODABLE_EXTENSIONS: [&str; 11] = [
    "wav", "wave", "mp3", "m4a", "mp4", "aac", "ogg", "oga", "flac", "aif", "aiff",
];

/// Default corpus extension allow-list.
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["mp3", "wav", "m4a", "aac", "ogg"];

/// Resampling strategy used by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResamplerKind {
    /// Band-limited windowed-sinc interpolation.
    #[default]
    Sinc,
    /// Linear interpolation; faster, aliases on downsampling.
    Linear,
}

/// What this build can decode and how it resamples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub resampler: ResamplerKind,
    /// Accepted extensions: the configured allow-list minus anything undecodable.
    pub extensions: Vec<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            resampler: ResamplerKind::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl Capabilities {
    /// Intersect the allow-list with the decodable set, warning about drops.
    pub fn resolve(allow_list: &[String], resampler: ResamplerKind) -> Self {
        let mut extensions: Vec<String> = Vec::new();
        for raw in allow_list {
            let ext = normalize_extension(raw);
            if ext.is_empty() || extensions.contains(&ext) {
                continue;
            }
            if DECODABLE_EXTENSIONS.contains(&ext.as_str()) {
                extensions.push(ext);
            } else {
                warn!(extension = %ext, "No decoder available; extension ignored");
            }
        }
        Self {
            resampler,
            extensions,
        }
    }

    /// True if `path` has an accepted extension (case-insensitive).
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    }
}

fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_normalizes_and_drops_unknown_extensions() {
        let allow = vec![
            ".MP3".to_string(),
            "wav".to_string(),
            "mp3".to_string(),
            ".xyz".to_string(),
        ];
        let caps = Capabilities::resolve(&allow, ResamplerKind::Linear);
        assert_eq!(caps.extensions, vec!["mp3".to_string(), "wav".to_string()]);
        assert_eq!(caps.resampler, ResamplerKind::Linear);
    }

    #[test]
    fn accepts_is_case_insensitive() {
        let caps = Capabilities::default();
        assert!(caps.accepts(Path::new("ohio/clip-1.WAV")));
        assert!(caps.accepts(Path::new("clip.m4a")));
        assert!(!caps.accepts(Path::new("notes.txt")));
        assert!(!caps.accepts(Path::new("no_extension")));
    }
}
