//! Entry point for the `speechprep` command-line tool.

use speechprep::cli::{self, EXIT_ABORT};
use speechprep::logging;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(EXIT_ABORT);
        }
    };
    let config = match cli::load_config(&options) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(EXIT_ABORT);
        }
    };

    let level = options
        .log_level()
        .unwrap_or(config.logging.level.as_str())
        .to_string();
    if let Err(err) = logging::init(&level) {
        eprintln!("Logging disabled: {err}");
    }

    match cli::run(&options.command, config) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(EXIT_ABORT);
        }
    }
}
