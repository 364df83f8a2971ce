//! Vocalign - aligning wearable-recorder audio with behavioral labels.
//!
//! This crate reconciles drift-affected recorder clocks with UTC-timestamped
//! label streams, extracts label-dense audio chunks, segments them by
//! volume, and assigns each segment its most plausible label.

#![warn(missing_docs)]

pub mod align;
pub mod audio;
pub mod chunks;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod segment;
pub mod utils;

use clap::Parser;
use cli::{Cli, Command, RunArgs};
use config::{Config, config_file_path, load_default_config, save_default_config};
use pipeline::{PipelineOptions, run_day};
use segment::SegmentSource;

pub use error::{Error, Result};

/// Main entry point for the vocalign CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.run.verbose, cli.run.quiet);

    // Load configuration
    let mut config = load_default_config()?;
    apply_overrides(&mut config, &cli.run);

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    // Show help if no data directory was provided
    let Some(data_path) = cli.data_path else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return Ok(());
    };

    let options = PipelineOptions {
        participant: cli.run.participant.clone(),
        labels_path: cli.run.labels.clone().ok_or(Error::LabelsPathRequired)?,
        participants_path: cli.run.participants.clone(),
        drift_seconds: cli.run.drift,
        utc_offset_hours: cli.run.utc_offset,
        source: if cli.run.raw_files {
            SegmentSource::RawFiles
        } else {
            SegmentSource::LabelChunks
        },
        progress: !cli.run.quiet && !cli.run.no_progress,
    };

    run_day(&data_path, &options, &config)?;
    Ok(())
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(v) = args.min_silence_len {
        config.segmenter.min_silence_len_ms = v;
    }
    if let Some(v) = args.silence_thresh {
        config.segmenter.silence_thresh_db = v;
    }
    if let Some(v) = args.final_padding {
        config.segmenter.final_padding_ms = v;
    }
    if let Some(ref v) = args.token {
        config.segmenter.token.clone_from(v);
    }
    if let Some(v) = args.delay_confident {
        config.matcher.allowed_delay_confident = v;
    }
    if let Some(v) = args.delay_tentative {
        config.matcher.allowed_delay_tentative = v;
    }
}

/// Initialize tracing with a verbosity-derived filter.
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
