//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::constants::{locator, matcher, segmenter};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chunk location settings.
    #[serde(default)]
    pub locator: LocatorConfig,

    /// Silence-based segmentation settings.
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Label matching settings.
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// Chunk location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Maximum gap (s) between consecutive labels kept in one chunk.
    pub max_label_gap_secs: f64,

    /// Padding (s) applied around each chunk; doubled at day edges.
    pub chunk_padding_secs: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            max_label_gap_secs: locator::DEFAULT_MAX_LABEL_GAP_SECS,
            chunk_padding_secs: locator::DEFAULT_CHUNK_PADDING_SECS,
        }
    }
}

/// Silence-based segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Minimum silence run separating two segments, in ms.
    pub min_silence_len_ms: u64,

    /// Silence threshold in dBFS.
    pub silence_thresh_db: f64,

    /// Symmetric padding applied to every detected segment, in ms.
    pub final_padding_ms: u64,

    /// Run token embedded in output directory and table names.
    pub token: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_silence_len_ms: segmenter::DEFAULT_MIN_SILENCE_LEN_MS,
            silence_thresh_db: segmenter::DEFAULT_SILENCE_THRESH_DB,
            final_padding_ms: segmenter::DEFAULT_FINAL_PADDING_MS,
            token: segmenter::DEFAULT_TOKEN.to_string(),
        }
    }
}

/// Label matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Maximum gap (s) for a confident nearest-start assignment.
    pub allowed_delay_confident: f64,

    /// Maximum gap (s) for a tentative nearest-end assignment.
    pub allowed_delay_tentative: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            allowed_delay_confident: matcher::DEFAULT_ALLOWED_DELAY_CONFIDENT,
            allowed_delay_tentative: matcher::DEFAULT_ALLOWED_DELAY_TENTATIVE,
        }
    }
}
