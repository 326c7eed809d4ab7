//! Library exports for reuse in the binary, benchmarks and tests.
/// Audio loading, trimming and descriptor extraction.
pub mod analysis;
/// Application directory helpers.
pub mod app_dirs;
/// Feature archive encoding (`.npz`).
pub mod archive;
/// Corpus walk, per-clip pipeline and run manifest.
pub mod batch;
/// Decoder and resampler capabilities.
pub mod capabilities;
/// Command-line parsing and dispatch.
pub mod cli;
/// TOML configuration.
pub mod config;
/// Logging setup.
pub mod logging;
/// Quality and noise classification.
pub mod quality;
/// Corpus-level quality report.
pub mod report;
