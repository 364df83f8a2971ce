//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Align wearable-recorder audio with UTC-timestamped behavioral labels.
#[derive(Debug, Parser)]
#[command(name = "vocalign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Participant-day directory containing the recorder files.
    pub data_path: Option<PathBuf>,

    /// Common options for a pipeline run.
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for a pipeline run.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Participant identifier the labels belong to.
    #[arg(short, long, env = "VOCALIGN_PARTICIPANT")]
    pub participant: Option<String>,

    /// Path to the label stream CSV.
    #[arg(short, long, env = "VOCALIGN_LABELS")]
    pub labels: Option<PathBuf>,

    /// Path to the participant table CSV (UTC offsets per participant).
    #[arg(long, env = "VOCALIGN_PARTICIPANTS")]
    pub participants: Option<PathBuf>,

    /// Recorder clock drift in seconds (positive: recorder clock ran fast).
    #[arg(
        short,
        long,
        default_value_t = 0.0,
        allow_negative_numbers = true,
        env = "VOCALIGN_DRIFT"
    )]
    pub drift: f64,

    /// UTC offset of the recorder timezone in hours, overriding the
    /// participant table.
    #[arg(
        long,
        value_parser = parse_utc_offset,
        allow_negative_numbers = true,
        env = "VOCALIGN_UTC_OFFSET"
    )]
    pub utc_offset: Option<f64>,

    /// Minimum silence run separating two segments, in ms.
    #[arg(long)]
    pub min_silence_len: Option<u64>,

    /// Silence threshold in dBFS.
    #[arg(long, value_parser = parse_silence_thresh, allow_negative_numbers = true)]
    pub silence_thresh: Option<f64>,

    /// Symmetric padding applied to every detected segment, in ms.
    #[arg(long)]
    pub final_padding: Option<u64>,

    /// Run token embedded in output directory and table names.
    #[arg(short, long)]
    pub token: Option<String>,

    /// Maximum gap (s) for a confident nearest-start label assignment.
    #[arg(long, value_parser = parse_delay)]
    pub delay_confident: Option<f64>,

    /// Maximum gap (s) for a tentative nearest-end label assignment.
    #[arg(long, value_parser = parse_delay)]
    pub delay_tentative: Option<f64>,

    /// Segment the raw recorder files instead of the label chunks.
    #[arg(long)]
    pub raw_files: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable progress bars without reducing log output.
    #[arg(long)]
    pub no_progress: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse and validate a UTC offset in hours (-12.0 to 14.0).
fn parse_utc_offset(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(-12.0..=14.0).contains(&value) {
        return Err(format!(
            "UTC offset must be between -12.0 and 14.0 hours, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a silence threshold in dBFS (must be negative or zero).
fn parse_silence_thresh(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value > 0.0 {
        return Err(format!(
            "silence threshold is in dBFS and must be <= 0, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate a matcher delay in seconds (non-negative).
fn parse_delay(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value < 0.0 {
        return Err(format!("delay must be non-negative, got {value}"));
    }

    Ok(value)
}
