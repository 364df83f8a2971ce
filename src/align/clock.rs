//! Recorder clock reconciliation.
//!
//! Recorder files are stamped by the device's local clock. The UTC start of
//! a file is its filesystem modification time minus the participant's UTC
//! offset minus a manually estimated drift. Both corrections are explicit
//! inputs so a caller can audit them; nothing here reads hidden constants.

use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Error, Result};

/// UTC time span of one recorder file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpan {
    /// UTC time the file starts.
    pub start: DateTime<Utc>,
    /// UTC time the file ends.
    pub end: DateTime<Utc>,
}

impl FileSpan {
    /// Whether `t` falls within the span (start inclusive, end exclusive).
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Seconds from the span start to `t` (negative if `t` precedes it).
    #[must_use]
    pub fn secs_from_start(&self, t: DateTime<Utc>) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            (t - self.start).num_milliseconds() as f64 / 1000.0
        }
    }
}

/// Convert a recorder-local epoch timestamp to UTC.
///
/// Computes `epoch_secs - utc_offset_hours * 3600 - drift_seconds`.
#[must_use]
pub fn to_utc(epoch_secs: f64, utc_offset_hours: f64, drift_seconds: f64) -> DateTime<Utc> {
    let corrected = epoch_secs - utc_offset_hours * 3600.0 - drift_seconds;
    #[allow(clippy::cast_possible_truncation)]
    DateTime::from_timestamp_millis((corrected * 1000.0).round() as i64)
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
}

/// Span covered by a file starting at `utc_start` and lasting
/// `duration_secs`.
#[must_use]
pub fn file_span(utc_start: DateTime<Utc>, duration_secs: f64) -> FileSpan {
    #[allow(clippy::cast_possible_truncation)]
    let millis = (duration_secs * 1000.0).round() as i64;
    FileSpan {
        start: utc_start,
        end: utc_start + TimeDelta::milliseconds(millis),
    }
}

/// Filesystem modification time of `path` as seconds since the Unix epoch.
pub fn mtime_epoch_secs(path: &Path) -> Result<f64> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::FileMetadata {
        path: path.to_path_buf(),
        source: e,
    })?;
    let modified = metadata.modified().map_err(|e| Error::FileMetadata {
        path: path.to_path_buf(),
        source: e,
    })?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::FileMetadata {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;
    Ok(since_epoch.as_secs_f64())
}
