//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "vocalign";

/// Chunk locator constants.
pub mod locator {
    /// Labels further apart than this (seconds) start a new chunk.
    pub const DEFAULT_MAX_LABEL_GAP_SECS: f64 = 100.0;

    /// Padding applied before/after each chunk, in seconds.
    pub const DEFAULT_CHUNK_PADDING_SECS: f64 = 20.0;

    /// Multiplier applied to the padding of the first and last chunk
    /// of the day.
    pub const EDGE_PADDING_MULTIPLIER: f64 = 2.0;

    /// Assumed duration of an instantaneous "note" label with no end
    /// timestamp, in seconds.
    pub const NOTE_EVENT_DURATION_SECS: f64 = 5.0;
}

/// Segmenter constants.
pub mod segmenter {
    /// Minimum run of silence separating two vocalization intervals, in ms.
    pub const DEFAULT_MIN_SILENCE_LEN_MS: u64 = 300;

    /// Audio quieter than this (dBFS) is considered silent.
    pub const DEFAULT_SILENCE_THRESH_DB: f64 = -24.0;

    /// Symmetric padding applied to every detected interval, in ms.
    pub const DEFAULT_FINAL_PADDING_MS: u64 = 200;

    /// Default run token used in output directory and table names.
    pub const DEFAULT_TOKEN: &str = "Volume";
}

/// Label matcher constants.
pub mod matcher {
    /// Maximum gap (s) between a segment start and a later label start for
    /// a confident assignment.
    pub const DEFAULT_ALLOWED_DELAY_CONFIDENT: f64 = 15.0;

    /// Maximum gap (s) between a segment start and a label end for a
    /// tentative assignment.
    pub const DEFAULT_ALLOWED_DELAY_TENTATIVE: f64 = 3.0;
}

/// Output directory and file naming.
pub mod layout {
    /// Directory under the data path holding label-bounded audio chunks.
    pub const CHUNK_DIR: &str = "AudioChunksByLabel";

    /// Prefix of the per-run segment directory (`AudioSegments_<token>`).
    pub const SEGMENT_DIR_PREFIX: &str = "AudioSegments_";

    /// Prefix of the aligned-label table (`formattedLabels<daylabel>.csv`).
    pub const FORMATTED_LABELS_PREFIX: &str = "formattedLabels";

    /// Separator between the start and end fields of the time range embedded
    /// in exported chunk and segment filenames.
    pub const TIME_RANGE_SEPARATOR: &str = "--";
}

/// Recorder file extensions accepted when scanning a data directory.
pub const RECORDER_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "aac"];
