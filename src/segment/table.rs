//! The segment timing table.
//!
//! One row per exported segment, capturing both chunk-relative and
//! recorder-file-relative timing. The segmenter creates the table; the label
//! matcher rewrites it in place with the `Possible Label` column and is the
//! last writer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One row of the segment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Basename of the original recorder file.
    #[serde(rename = "Recorder file")]
    pub recorder_file: String,

    /// Path of the exported segment WAV.
    #[serde(rename = "Segment path")]
    pub segment_path: String,

    /// Path of the chunk (or raw) file the segment was cut from.
    #[serde(rename = "Label chunk file")]
    pub label_chunk_file: String,

    /// Start relative to the recorder file, `:HH:MM:SS.SS` cell format.
    #[serde(rename = "Start relative recorder (hh:mm:ss)")]
    pub start_rel_recorder_hms: String,

    /// Start relative to the recorder file, in seconds.
    #[serde(rename = "Start relative recorder (s)")]
    pub start_rel_recorder_secs: f64,

    /// Segment duration in seconds.
    #[serde(rename = "Segment duration")]
    pub duration_secs: f64,

    /// Start relative to the chunk file, `:HH:MM:SS.SS` cell format.
    #[serde(rename = "Start relative label chunk file (hh:mm:ss)")]
    pub start_rel_chunk_hms: String,

    /// Start relative to the chunk file, in seconds.
    #[serde(rename = "Start relative label chunk file (s)")]
    pub start_rel_chunk_secs: f64,

    /// Label assigned by the matcher; empty until matching runs, and empty
    /// forever for unmatched segments.
    #[serde(rename = "Possible Label", default)]
    pub possible_label: String,
}

impl SegmentRecord {
    /// Segment end relative to the recorder file, in seconds.
    #[must_use]
    pub fn end_rel_recorder_secs(&self) -> f64 {
        self.start_rel_recorder_secs + self.duration_secs
    }
}

/// Write the segment table to `path`, replacing any existing file.
pub fn write_segment_table(path: &Path, records: &[SegmentRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::TableWrite {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    for record in records {
        writer.serialize(record).map_err(|e| Error::TableWrite {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
    }

    writer.flush().map_err(|e| Error::TableWrite {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    Ok(())
}

/// Read a segment table written by [`write_segment_table`].
///
/// Tables written before matching have no `Possible Label` column; the
/// field defaults to empty in that case.
pub fn read_segment_table(path: &Path) -> Result<Vec<SegmentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::TableRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut records = Vec::new();
    for (line_num, result) in reader.deserialize::<SegmentRecord>().enumerate() {
        let record = result.map_err(|e| Error::InvalidTableRow {
            path: path.to_path_buf(),
            message: format!("line {}: {e}", line_num + 2),
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn record(start: f64) -> SegmentRecord {
        SegmentRecord {
            recorder_file: "R1.mp3".to_string(),
            segment_path: format!("/data/AudioSegments_Volume/R1_{start}.wav"),
            label_chunk_file: "/data/AudioChunksByLabel/R1_x.wav".to_string(),
            start_rel_recorder_hms: ":00:00:10.00".to_string(),
            start_rel_recorder_secs: start,
            duration_secs: 2.5,
            start_rel_chunk_hms: ":00:00:05.00".to_string(),
            start_rel_chunk_secs: 5.0,
            possible_label: String::new(),
        }
    }

    #[test]
    fn test_write_read_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let records = vec![record(10.0), record(20.0)];
        write_segment_table(file.path(), &records).unwrap();

        let read_back = read_segment_table(file.path()).unwrap();
        assert_eq!(read_back, records);
    }

    #[test]
    fn test_header_names_match_contract() {
        let file = NamedTempFile::new().unwrap();
        write_segment_table(file.path(), &[record(10.0)]).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let header = contents.lines().next().unwrap();
        assert!(header.starts_with("Recorder file,Segment path,Label chunk file"));
        assert!(header.contains("Start relative recorder (hh:mm:ss)"));
        assert!(header.contains("Start relative label chunk file (s)"));
        assert!(header.ends_with("Possible Label"));
    }

    #[test]
    fn test_read_table_without_label_column() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "Recorder file,Segment path,Label chunk file,\
             Start relative recorder (hh:mm:ss),Start relative recorder (s),\
             Segment duration,Start relative label chunk file (hh:mm:ss),\
             Start relative label chunk file (s)\n\
             R1.mp3,/s.wav,/c.wav,:00:00:10.00,10.0,2.5,:00:00:05.00,5.0\n",
        )
        .unwrap();

        let records = read_segment_table(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].possible_label, "");
        assert_eq!(records[0].end_rel_recorder_secs(), 12.5);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let file = NamedTempFile::new().unwrap();
        let records = vec![record(10.0), record(20.0)];
        write_segment_table(file.path(), &records).unwrap();
        let first = std::fs::read_to_string(file.path()).unwrap();

        let read_back = read_segment_table(file.path()).unwrap();
        write_segment_table(file.path(), &read_back).unwrap();
        let second = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(first, second);
    }
}
