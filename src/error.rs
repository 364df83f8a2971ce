//! Error types for vocalign.

/// Result type alias for vocalign operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for vocalign.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No recorder audio files found in the data directory.
    #[error("no recorder audio files found in '{path}'")]
    NoRecorderFiles {
        /// Path to the data directory.
        path: std::path::PathBuf,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a label or participant table.
    #[error("failed to read table '{path}'")]
    TableRead {
        /// Path to the table file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write a table.
    #[error("failed to write table '{path}'")]
    TableWrite {
        /// Path to the table file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A table row could not be parsed.
    #[error("invalid table row in '{path}': {message}")]
    InvalidTableRow {
        /// Path to the table file.
        path: std::path::PathBuf,
        /// Description of the parse failure.
        message: String,
    },

    /// A label timestamp could not be parsed.
    #[error("invalid label timestamp '{value}': {message}")]
    InvalidTimestamp {
        /// The unparseable value.
        value: String,
        /// Description of the parse failure.
        message: String,
    },

    /// A label's end timestamp precedes its creation timestamp.
    #[error("label '{label}' ends before it starts (created {created}, ended {ended})")]
    LabelEndsBeforeStart {
        /// The label text.
        label: String,
        /// Creation timestamp.
        created: chrono::DateTime<chrono::Utc>,
        /// End timestamp.
        ended: chrono::DateTime<chrono::Utc>,
    },

    /// Two labels for the same recorder file overlap in time.
    #[error(
        "labels '{first}' and '{second}' overlap for recorder file '{file}' \
         (label intervals must be disjoint)"
    )]
    OverlappingLabels {
        /// Text of the earlier label.
        first: String,
        /// Text of the later label.
        second: String,
        /// Recorder file both labels map to.
        file: String,
    },

    /// No label stream was provided for a pipeline run.
    #[error("no label stream provided: pass --labels <FILE>")]
    LabelsPathRequired,

    /// No UTC offset available for clock reconciliation.
    #[error(
        "no UTC offset available: pass --utc-offset, or --participants together \
         with --participant"
    )]
    UtcOffsetUnknown,

    /// Participant not found in the reference table.
    #[error("participant '{id}' not found in reference table '{path}'")]
    ParticipantNotFound {
        /// Participant identifier.
        id: String,
        /// Path to the reference table.
        path: std::path::PathBuf,
    },

    /// A chunk filename is missing its embedded time-range token.
    #[error("chunk filename '{path}' has no parseable time-range token")]
    MalformedChunkFilename {
        /// Path to the chunk file.
        path: std::path::PathBuf,
    },

    /// Failed to read file metadata (modification time).
    #[error("failed to read modification time of '{path}'")]
    FileMetadata {
        /// Path to the file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy a matched segment into its label folder.
    #[error("failed to copy segment '{from}' to '{to}'")]
    SegmentCopy {
        /// Source path.
        from: std::path::PathBuf,
        /// Destination path.
        to: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
