//! LHE to HDF5 converter CLI
//!
//! This is the command-line interface for the converter. It uses the
//! lhe-decoder library and adds:
//! - Argument parsing and an optional TOML configuration file
//! - Logging setup
//! - A conversion summary (log output and optional JSON file)

use anyhow::{Context, Result};
use clap::Parser;
use lhe_decoder::Converter;
use std::path::PathBuf;

mod config;
mod report;

/// LHE to HDF5 file converter
#[derive(Parser, Debug)]
#[command(name = "lhe2hdf5")]
#[command(about = "Convert LHE event files (plain or .gz) into a single HDF5 file", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the directory containing LHE files (subdirectories included) [default: LHE_dir]
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Path to the output HDF5 file [default: output.h5]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON summary of the conversion
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("lhe2hdf5 v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", lhe_decoder::VERSION);

    let file_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    let settings = file_config.resolve(config::Overrides {
        input_dir: args.input_dir,
        output_file: args.output_file,
        summary: args.summary,
        no_progress: args.no_progress || args.quiet,
    });
    log::debug!("Resolved settings: {:?}", settings);

    let converter = Converter::new(settings.convert);
    let summary = converter
        .convert(&settings.input_dir, &settings.output_file)
        .with_context(|| {
            format!(
                "Conversion of {:?} into {:?} failed",
                settings.input_dir, settings.output_file
            )
        })?;

    report::log_summary(&summary);
    if let Some(path) = &settings.summary {
        report::write_summary(&summary, path)?;
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_env("LHE2HDF5_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from(["lhe2hdf5", "-i", "runs", "-o", "out.h5", "-vv"]).unwrap();
        assert_eq!(args.input_dir, Some(PathBuf::from("runs")));
        assert_eq!(args.output_file, Some(PathBuf::from("out.h5")));
        assert_eq!(args.verbose, 2);
        assert!(!args.no_progress);
    }

    #[test]
    fn test_defaults_apply_without_flags() {
        let args = Args::try_parse_from(["lhe2hdf5"]).unwrap();
        let settings = config::AppConfig::default().resolve(config::Overrides {
            input_dir: args.input_dir,
            output_file: args.output_file,
            summary: args.summary,
            no_progress: args.no_progress,
        });
        assert_eq!(settings.input_dir, PathBuf::from(config::DEFAULT_INPUT_DIR));
        assert_eq!(settings.output_file, PathBuf::from(config::DEFAULT_OUTPUT_FILE));
    }
}
