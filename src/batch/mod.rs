//! Corpus walk, per-clip extraction, archive output and the run manifest.

mod manifest;
mod pipeline;
mod scanner;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

pub use manifest::{ClipSummary, MANIFEST_FILE_NAME, ManifestError, read_manifest, write_manifest};
pub use pipeline::{ClipAnalysis, ClipPipeline, ExtractError, ExtractionSettings, RawClip};
pub use scanner::{CorpusFile, collect_corpus};

use crate::archive::{ARCHIVE_EXTENSION, write_archive};

/// Run-level failure; per-file problems never surface here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Corpus root {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Where to read, where to write, and whether to redo existing outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub corpus_root: PathBuf,
    pub output_root: PathBuf,
    /// Defaults to `<output_root>/manifest.jsonl`.
    pub manifest_path: Option<PathBuf>,
    pub overwrite: bool,
}

impl RunOptions {
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.output_root.join(MANIFEST_FILE_NAME))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCounters {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunCounters {
    /// Process exit status: 0 when every file succeeded or was skipped, 2
    /// when some files failed.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 2 } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub counters: RunCounters,
    pub manifest_path: PathBuf,
    pub records: Vec<ClipSummary>,
}

/// Archive path for a corpus file: `output_root / relative_parent / stem.npz`.
pub fn output_path_for(output_root: &Path, file: &CorpusFile) -> PathBuf {
    let parent = file.relative.parent().unwrap_or_else(|| Path::new(""));
    output_root
        .join(parent)
        .join(format!("{}.{ARCHIVE_EXTENSION}", file.sample_id()))
}

/// Extract every corpus file, one at a time, and rewrite the manifest.
///
/// Files whose archive name is already taken by an earlier file in the same
/// directory (`a.wav` and `a.mp3`) are counted as failures and left untouched.
pub fn run_extraction(options: &RunOptions, pipeline: &mut ClipPipeline) -> Result<RunSummary, BatchError> {
    let files = collect_corpus(&options.corpus_root, pipeline.capabilities())?;
    info!(
        root = %options.corpus_root.display(),
        files = files.len(),
        overwrite = options.overwrite,
        "Starting extraction"
    );
    let mut counters = RunCounters::default();
    let mut records = Vec::new();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    for file in &files {
        let output = output_path_for(&options.output_root, file);
        if let Some(first) = claimed.get(&output) {
            warn!(
                path = %file.path.display(),
                first = %first.display(),
                output = %output.display(),
                "Archive name already used in this run; skipping clip"
            );
            counters.failed += 1;
            continue;
        }
        claimed.insert(output.clone(), &file.path);
        if output.exists() && !options.overwrite {
            debug!(path = %file.path.display(), "Output exists; skipping");
            counters.skipped += 1;
            continue;
        }
        match extract_one(pipeline, file, &output) {
            Ok(record) => {
                counters.processed += 1;
                records.push(record);
            }
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "Failed to extract clip");
                counters.failed += 1;
            }
        }
    }
    let manifest_path = options.manifest_path();
    write_manifest(&manifest_path, &records)?;
    info!(
        "Completed: {} extracted, {} skipped, {} failed",
        counters.processed, counters.skipped, counters.failed
    );
    Ok(RunSummary {
        counters,
        manifest_path,
        records,
    })
}

fn extract_one(pipeline: &mut ClipPipeline, file: &CorpusFile, output: &Path) -> Result<ClipSummary, ExtractError> {
    let analysis = pipeline.analyze(&file.path, &file.category(), &file.sample_id())?;
    write_archive(output, &analysis.features.named_arrays())?;
    Ok(ClipSummary::new(&analysis, output))
}
