//! TOML configuration for extraction runs and the quality classifier.

mod defaults;
mod errors;
mod io;
mod types;

pub use errors::ConfigError;
pub use io::{CONFIG_FILE_NAME, config_path, load_from, load_or_default, render_profile, save_to_path};
pub use types::{AppConfig, ClassifierSettings, CorpusSettings, LoggingSettings};
