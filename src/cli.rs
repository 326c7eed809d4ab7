//! Command-line front end for the `speechprep` binary.
//!
//! Arguments are parsed by hand into [`CliOptions`]. [`load_config`] reads the
//! TOML file and [`run`] applies flag overrides and dispatches the subcommand.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::batch::{ClipPipeline, RunOptions, run_extraction};
use crate::capabilities::ResamplerKind;
use crate::config::{self, AppConfig};
use crate::quality::{ClassifierProfile, Preset};
use crate::report::{self, QualityReport};

/// Exit status for a hard abort (bad arguments, config or corpus root).
pub const EXIT_ABORT: i32 = 1;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub log_level: Option<String>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Extract(ExtractArgs),
    Quality(QualityArgs),
    /// Print a preset's classifier table as TOML, or write a full config
    /// carrying it.
    Profile {
        preset: Preset,
        write: Option<PathBuf>,
    },
    Help,
}

/// Flags that override `[extraction]`, `[corpus]` and `[classifier]` values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overrides {
    pub preset: Option<Preset>,
    pub resampler: Option<ResamplerKind>,
    pub sample_rate: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractArgs {
    pub corpus_root: PathBuf,
    pub output_root: PathBuf,
    pub manifest: Option<PathBuf>,
    pub overwrite: bool,
    pub overrides: Overrides,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QualitySource {
    Corpus(PathBuf),
    Manifest(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityArgs {
    pub source: QualitySource,
    /// Write the JSON report here instead of printing it.
    pub report: Option<PathBuf>,
    pub overrides: Overrides,
}

impl CliOptions {
    /// Log filter requested on the command line, if any.
    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }
}

pub fn help_text() -> &'static str {
    "speechprep - speech corpus feature extraction and quality screening\n\n\
Usage:\n  \
  speechprep extract <corpus_root> <output_root> [--manifest <path>] [--overwrite]\n  \
  speechprep quality <corpus_root> [--report <path>]\n  \
  speechprep quality --from-manifest <manifest.jsonl> [--report <path>]\n  \
  speechprep profile [--preset <robust|calibrated>] [--write <config.toml>]\n\n\
Options:\n  \
  --config <path>        Config file (default: <app dir>/config.toml)\n  \
  --log-level <filter>   Log filter when RUST_LOG is unset (default: info)\n  \
  --preset <name>        Classifier preset: robust or calibrated\n  \
  --resampler <kind>     Resampler: sinc or linear\n  \
  --sample-rate <hz>     Target sample rate\n  \
  --overwrite            Re-extract clips whose archive already exists\n  \
  --manifest <path>      Manifest path (default: <output_root>/manifest.jsonl)\n  \
  --from-manifest <path> Build the quality report from an existing manifest\n  \
  --report <path>        Write the quality report to a file\n  \
  --write <path>         Save the config with the preset table for editing\n  \
  -h, --help             Show this help\n"
}

pub fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut config = None;
    let mut log_level = None;
    let mut manifest = None;
    let mut from_manifest = None;
    let mut report = None;
    let mut write = None;
    let mut overwrite = false;
    let mut overrides = Overrides::default();
    let mut positional: Vec<String> = Vec::new();
    let mut help = false;

    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "-h" | "--help" => help = true,
            "--overwrite" => overwrite = true,
            "--config" => config = Some(PathBuf::from(flag_value(args, &mut idx, arg)?)),
            "--log-level" => log_level = Some(flag_value(args, &mut idx, arg)?.to_string()),
            "--manifest" => manifest = Some(PathBuf::from(flag_value(args, &mut idx, arg)?)),
            "--from-manifest" => {
                from_manifest = Some(PathBuf::from(flag_value(args, &mut idx, arg)?));
            }
            "--report" => report = Some(PathBuf::from(flag_value(args, &mut idx, arg)?)),
            "--write" => write = Some(PathBuf::from(flag_value(args, &mut idx, arg)?)),
            "--preset" => {
                let value = flag_value(args, &mut idx, arg)?;
                overrides.preset =
                    Some(Preset::parse(value).ok_or_else(|| format!("Unknown preset: {value}"))?);
            }
            "--resampler" => {
                overrides.resampler = Some(parse_resampler(flag_value(args, &mut idx, arg)?)?);
            }
            "--sample-rate" => {
                overrides.sample_rate = Some(parse_u32(flag_value(args, &mut idx, arg)?, arg)?);
            }
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown argument: {flag}\n\n{}", help_text()));
            }
            value => positional.push(value.to_string()),
        }
        idx += 1;
    }

    if help {
        return Ok(CliOptions {
            config,
            log_level,
            command: Command::Help,
        });
    }
    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => return Err(format!("A subcommand is required\n\n{}", help_text())),
        Some("extract") => {
            let corpus_root = positional
                .next()
                .ok_or_else(|| format!("extract requires <corpus_root>\n\n{}", help_text()))?;
            let output_root = positional
                .next()
                .ok_or_else(|| format!("extract requires <output_root>\n\n{}", help_text()))?;
            Command::Extract(ExtractArgs {
                corpus_root: PathBuf::from(corpus_root),
                output_root: PathBuf::from(output_root),
                manifest,
                overwrite,
                overrides,
            })
        }
        Some("quality") => {
            let source = match (positional.next(), from_manifest) {
                (Some(_), Some(_)) => {
                    return Err("quality takes either <corpus_root> or --from-manifest, not both".into());
                }
                (Some(root), None) => QualitySource::Corpus(PathBuf::from(root)),
                (None, Some(path)) => QualitySource::Manifest(path),
                (None, None) => {
                    return Err(format!(
                        "quality requires <corpus_root> or --from-manifest\n\n{}",
                        help_text()
                    ));
                }
            };
            Command::Quality(QualityArgs {
                source,
                report,
                overrides,
            })
        }
        Some("profile") => Command::Profile {
            preset: overrides.preset.unwrap_or_default(),
            write,
        },
        Some(other) => return Err(format!("Unknown subcommand: {other}\n\n{}", help_text())),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {extra}\n\n{}", help_text()));
    }

    Ok(CliOptions {
        config,
        log_level,
        command,
    })
}

fn flag_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> Result<&'a str, String> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_u32(value: &str, flag: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn parse_resampler(value: &str) -> Result<ResamplerKind, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sinc" => Ok(ResamplerKind::Sinc),
        "linear" => Ok(ResamplerKind::Linear),
        _ => Err(format!("Unknown resampler: {value}")),
    }
}

/// Load the config named on the command line, or the app-directory default.
pub fn load_config(options: &CliOptions) -> Result<AppConfig, String> {
    let loaded = match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    };
    loaded.map_err(|err| format!("Failed to load config: {err}"))
}

/// Apply command-line overrides on top of file values.
pub fn apply_overrides(mut config: AppConfig, overrides: &Overrides) -> AppConfig {
    if let Some(preset) = overrides.preset {
        config.classifier.preset = preset;
        config.classifier.profile = None;
    }
    if let Some(resampler) = overrides.resampler {
        config.corpus.resampler = resampler;
    }
    if let Some(rate) = overrides.sample_rate {
        config.extraction.sample_rate = rate;
    }
    config.normalized()
}

/// Execute a parsed command against `config`, returning the exit status.
pub fn run(command: &Command, config: AppConfig) -> Result<i32, String> {
    match command {
        Command::Help => {
            println!("{}", help_text());
            Ok(0)
        }
        Command::Profile {
            preset,
            write: None,
        } => {
            let text = config::render_profile(&ClassifierProfile::preset(*preset))
                .map_err(|err| err.to_string())?;
            print!("{text}");
            Ok(0)
        }
        Command::Profile {
            preset,
            write: Some(path),
        } => {
            write_profile_config(config, *preset, path)?;
            Ok(0)
        }
        Command::Extract(args) => run_extract(args, config),
        Command::Quality(args) => run_quality(args, config),
    }
}

/// Save `config` with `preset` spelled out as an editable `[classifier.profile]`.
fn write_profile_config(mut config: AppConfig, preset: Preset, path: &Path) -> Result<(), String> {
    config.classifier.preset = preset;
    config.classifier.profile = Some(ClassifierProfile::preset(preset));
    config::save_to_path(&config, path).map_err(|err| err.to_string())?;
    info!(path = %path.display(), preset = preset.as_str(), "Wrote config");
    println!("Wrote {}", path.display());
    Ok(())
}

fn build_pipeline(config: &AppConfig) -> ClipPipeline {
    let profile = config.classifier.resolve();
    info!(
        profile = %profile.name,
        sample_rate = config.extraction.sample_rate,
        resampler = ?config.corpus.resampler,
        "Preparing pipeline"
    );
    ClipPipeline::new(config.extraction, config.capabilities(), profile)
}

fn run_extract(args: &ExtractArgs, config: AppConfig) -> Result<i32, String> {
    let config = apply_overrides(config, &args.overrides);
    let mut pipeline = build_pipeline(&config);
    let options = RunOptions {
        corpus_root: args.corpus_root.clone(),
        output_root: args.output_root.clone(),
        manifest_path: args.manifest.clone(),
        overwrite: args.overwrite || config.corpus.overwrite,
    };
    let summary = run_extraction(&options, &mut pipeline).map_err(|err| {
        error!(error = %err, "Extraction aborted");
        err.to_string()
    })?;
    println!(
        "Completed: {} extracted, {} skipped, {} failed. Manifest: {}",
        summary.counters.processed,
        summary.counters.skipped,
        summary.counters.failed,
        summary.manifest_path.display()
    );
    Ok(summary.counters.exit_code())
}

fn run_quality(args: &QualityArgs, config: AppConfig) -> Result<i32, String> {
    let config = apply_overrides(config, &args.overrides);
    let result = match &args.source {
        QualitySource::Corpus(root) => {
            let mut pipeline = build_pipeline(&config);
            report::report_from_corpus(root, &mut pipeline)
        }
        QualitySource::Manifest(path) => report::report_from_manifest(path),
    };
    let report = result.map_err(|err| {
        error!(error = %err, "Quality report aborted");
        err.to_string()
    })?;
    emit_report(&report, args.report.as_deref())?;
    Ok(if report.errors > 0 { 2 } else { 0 })
}

fn emit_report(report: &QualityReport, path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(path) => {
            report::write_report(path, report).map_err(|err| err.to_string())?;
            info!(
                path = %path.display(),
                files = report.total_files,
                noisy = report.noisy_files.len(),
                "Wrote quality report"
            );
            Ok(())
        }
        None => {
            let text = serde_json::to_string_pretty(report).map_err(|err| err.to_string())?;
            println!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_extract_with_flags_in_any_position() {
        let parsed = parse_args(&args(&[
            "--log-level",
            "debug",
            "extract",
            "corpus",
            "--overwrite",
            "out",
            "--preset",
            "Calibrated",
            "--sample-rate",
            "22050",
        ]))
        .unwrap();
        assert_eq!(parsed.log_level(), Some("debug"));
        let Command::Extract(extract) = parsed.command else {
            panic!("expected extract");
        };
        assert_eq!(extract.corpus_root, PathBuf::from("corpus"));
        assert_eq!(extract.output_root, PathBuf::from("out"));
        assert!(extract.overwrite);
        assert_eq!(extract.overrides.preset, Some(Preset::Calibrated));
        assert_eq!(extract.overrides.sample_rate, Some(22_050));
    }

    #[test]
    fn quality_requires_exactly_one_source() {
        assert!(parse_args(&args(&["quality"])).is_err());
        assert!(parse_args(&args(&["quality", "corpus", "--from-manifest", "m.jsonl"])).is_err());
        let parsed = parse_args(&args(&["quality", "--from-manifest", "m.jsonl"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Quality(QualityArgs {
                source: QualitySource::Manifest(PathBuf::from("m.jsonl")),
                report: None,
                overrides: Overrides::default(),
            })
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_arguments() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["extract", "corpus"])).is_err());
        assert!(parse_args(&args(&["extract", "a", "b", "c"])).is_err());
        assert!(parse_args(&args(&["profile", "--bogus"])).is_err());
        assert!(parse_args(&args(&["profile", "--preset"])).is_err());
        assert!(parse_args(&args(&["profile", "--preset", "loud"])).is_err());
        assert!(parse_args(&args(&["extract", "a", "b", "--resampler", "cubic"])).is_err());
        assert!(parse_args(&args(&["transcode"])).is_err());
    }

    #[test]
    fn help_wins_over_missing_arguments() {
        assert_eq!(parse_args(&args(&["--help"])).unwrap().command, Command::Help);
        assert_eq!(parse_args(&args(&["extract", "a", "b", "-h"])).unwrap().command, Command::Help);
    }

    #[test]
    fn profile_defaults_to_robust() {
        let parsed = parse_args(&args(&["profile"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Profile {
                preset: Preset::Robust,
                write: None,
            }
        );
    }

    #[test]
    fn profile_write_saves_an_editable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speechprep.toml");
        let parsed = parse_args(&args(&[
            "profile",
            "--preset",
            "calibrated",
            "--write",
            path.to_str().unwrap(),
        ]))
        .unwrap();
        let mut config = AppConfig::default();
        config.extraction.sample_rate = 22_050;
        assert_eq!(run(&parsed.command, config).unwrap(), 0);

        let saved = config::load_from(&path).unwrap();
        assert_eq!(saved.extraction.sample_rate, 22_050);
        assert_eq!(saved.classifier.preset, Preset::Calibrated);
        assert_eq!(
            saved.classifier.resolve(),
            ClassifierProfile::preset(Preset::Calibrated).normalized()
        );
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[classifier.profile]"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config.classifier.profile = Some(ClassifierProfile::preset(Preset::Robust));
        let overrides = Overrides {
            preset: Some(Preset::Calibrated),
            resampler: Some(ResamplerKind::Linear),
            sample_rate: Some(1),
        };
        let config = apply_overrides(config, &overrides);
        assert_eq!(config.classifier.resolve().name, "calibrated");
        assert_eq!(config.corpus.resampler, ResamplerKind::Linear);
        assert_eq!(config.extraction.sample_rate, 4_000);
    }
}
