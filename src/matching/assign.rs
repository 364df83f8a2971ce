//! Applying match results: label folders and the final table rewrite.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::segment::{SegmentRecord, write_segment_table};

/// Merge assignments into the segment table and copy matched segments into
/// per-label folders.
///
/// The table at `table_path` is rewritten in place with the
/// `Possible Label` column filled in; unmatched segments keep an empty
/// label and are never dropped. Every matched segment WAV is copied into
/// `<segment_dir>/<label>/`, created on demand. Copy failures are logged
/// per segment; the table rewrite is the authoritative output and its
/// failure propagates.
pub fn apply_assignments(
    table_path: &Path,
    segment_dir: &Path,
    records: &mut [SegmentRecord],
    assignments: &BTreeMap<String, String>,
) -> Result<()> {
    let mut matched = 0usize;

    for record in records.iter_mut() {
        let Some(label) = assignments.get(&record.segment_path) else {
            continue;
        };
        record.possible_label.clone_from(label);
        if label.is_empty() {
            continue;
        }
        matched += 1;

        if let Err(e) = copy_into_label_folder(segment_dir, &record.segment_path, label) {
            warn!("Failed to file segment under label '{label}': {e}");
        }
    }

    write_segment_table(table_path, records)?;
    info!(
        "Matched {matched}/{} segment(s); table rewritten at {}",
        records.len(),
        table_path.display()
    );
    Ok(())
}

/// Copy one segment WAV into its label subfolder, preserving the filename.
fn copy_into_label_folder(segment_dir: &Path, segment_path: &str, label: &str) -> Result<()> {
    let source = Path::new(segment_path);
    let label_dir = segment_dir.join(sanitize_label(label));
    fs::create_dir_all(&label_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: label_dir.clone(),
        source: e,
    })?;

    let file_name = source
        .file_name()
        .ok_or_else(|| Error::SegmentCopy {
            from: source.to_path_buf(),
            to: label_dir.clone(),
            source: std::io::Error::other("segment path has no filename"),
        })?;
    let dest = label_dir.join(file_name);

    fs::copy(source, &dest).map_err(|e| Error::SegmentCopy {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    Ok(())
}

/// Sanitize a label for use as a directory name.
///
/// Replaces characters that are invalid in filenames across platforms and
/// prevents path traversal.
fn sanitize_label(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    sanitized.replace("..", "__")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::segment::read_segment_table;
    use tempfile::TempDir;

    fn record(path: &str, start: f64) -> SegmentRecord {
        SegmentRecord {
            recorder_file: "R1.mp3".to_string(),
            segment_path: path.to_string(),
            label_chunk_file: String::new(),
            start_rel_recorder_hms: String::new(),
            start_rel_recorder_secs: start,
            duration_secs: 1.0,
            start_rel_chunk_hms: String::new(),
            start_rel_chunk_secs: start,
            possible_label: String::new(),
        }
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("cry"), "cry");
        assert_eq!(sanitize_label("a/b:c"), "a_b_c");
        assert_eq!(sanitize_label("../up"), "___up");
    }

    #[test]
    fn test_apply_rewrites_table_and_copies_matched() {
        let dir = TempDir::new().unwrap();
        let segment_dir = dir.path().join("AudioSegments_Volume");
        fs::create_dir_all(&segment_dir).unwrap();

        let seg_path = segment_dir.join("R1_00-00-10.00--00-00-11.00.wav");
        fs::write(&seg_path, b"fake wav").unwrap();

        let table_path = dir.path().join("AudioSegments_Volume_day.csv");
        let mut records = vec![
            record(&seg_path.to_string_lossy(), 10.0),
            record("/missing/unmatched.wav", 50.0),
        ];

        let mut assignments = BTreeMap::new();
        assignments.insert(seg_path.to_string_lossy().into_owned(), "cry".to_string());
        assignments.insert("/missing/unmatched.wav".to_string(), String::new());

        apply_assignments(&table_path, &segment_dir, &mut records, &assignments).unwrap();

        // Matched segment copied into its label folder
        assert!(
            segment_dir
                .join("cry")
                .join("R1_00-00-10.00--00-00-11.00.wav")
                .exists()
        );

        // Table carries the label column; unmatched row retained with
        // empty label
        let read_back = read_segment_table(&table_path).unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].possible_label, "cry");
        assert_eq!(read_back[1].possible_label, "");
    }

    #[test]
    fn test_no_copies_when_nothing_matches() {
        let dir = TempDir::new().unwrap();
        let segment_dir = dir.path().join("AudioSegments_Volume");
        fs::create_dir_all(&segment_dir).unwrap();
        let table_path = dir.path().join("table.csv");

        let mut records = vec![record("/s/far.wav", 500.0)];
        let mut assignments = BTreeMap::new();
        assignments.insert("/s/far.wav".to_string(), String::new());

        apply_assignments(&table_path, &segment_dir, &mut records, &assignments).unwrap();

        // Only the (empty) segment dir itself exists, no label subfolders
        let entries: Vec<_> = fs::read_dir(&segment_dir).unwrap().collect();
        assert!(entries.is_empty());
    }
}
