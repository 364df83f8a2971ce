//! Label stream parsing and alignment to recorder files.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::align::clock::FileSpan;
use crate::constants::locator::NOTE_EVENT_DURATION_SECS;
use crate::error::{Error, Result};
use crate::utils::time::hms_cell_string;

/// One behavioral event from the mobile app, timestamped in UTC.
#[derive(Debug, Clone)]
pub struct LabelEvent {
    /// UTC time the label was created.
    pub created: DateTime<Utc>,
    /// UTC time the label was ended; `None` for an instantaneous note.
    pub end: Option<DateTime<Utc>>,
    /// Label text.
    pub text: String,
}

impl LabelEvent {
    /// End of the event, treating a missing end time as a fixed-length
    /// note event.
    #[must_use]
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end.unwrap_or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            let millis = (NOTE_EVENT_DURATION_SECS * 1000.0) as i64;
            self.created + TimeDelta::milliseconds(millis)
        })
    }
}

/// A label expressed relative to the recorder file it falls within.
#[derive(Debug, Clone)]
pub struct AlignedLabel {
    /// Basename of the recorder file the label maps to.
    pub recorder_file: String,
    /// Label start relative to the recorder file, in seconds.
    pub start_rel_secs: f64,
    /// Label duration in seconds.
    pub duration_secs: f64,
    /// Label text.
    pub text: String,
}

impl AlignedLabel {
    /// Label end relative to the recorder file, in seconds.
    #[must_use]
    pub fn end_rel_secs(&self) -> f64 {
        self.start_rel_secs + self.duration_secs
    }
}

/// Raw record shape of the label stream CSV.
#[derive(Debug, Deserialize)]
struct LabelRecord {
    #[serde(rename = "Participant", default)]
    participant: Option<String>,
    #[serde(rename = "Event Created Time")]
    created: String,
    #[serde(rename = "Event End", default)]
    end: Option<String>,
    #[serde(rename = "Label")]
    label: String,
}

/// Timestamp formats accepted in label tables, tried in order after RFC 3339.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Parse an ISO-8601-ish timestamp to UTC.
///
/// Naive timestamps (no zone suffix) are taken as already being UTC, which
/// is how the labeling app exports them.
pub fn parse_utc_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::InvalidTimestamp {
        value: value.to_string(),
        message: "expected RFC 3339 or 'YYYY-MM-DD HH:MM:SS'".to_string(),
    })
}

/// Load the label stream from a CSV file, sorted by creation time.
///
/// When `participant` is given, rows for other participants are skipped.
/// Rows with an empty `Event End` cell become note events with no end time.
pub fn load_label_stream(path: &Path, participant: Option<&str>) -> Result<Vec<LabelEvent>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::TableRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut labels = Vec::new();

    for (line_num, result) in reader.deserialize::<LabelRecord>().enumerate() {
        let record = result.map_err(|e| Error::InvalidTableRow {
            path: path.to_path_buf(),
            message: format!("line {}: {e}", line_num + 2),
        })?;

        if let (Some(wanted), Some(found)) = (participant, record.participant.as_deref()) {
            if wanted != found {
                continue;
            }
        }

        let created = parse_utc_timestamp(&record.created)?;
        let end = match record.end.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_utc_timestamp(value)?),
        };

        if let Some(ended) = end {
            if ended < created {
                return Err(Error::LabelEndsBeforeStart {
                    label: record.label,
                    created,
                    ended,
                });
            }
        }

        labels.push(LabelEvent {
            created,
            end,
            text: record.label,
        });
    }

    labels.sort_by_key(|l| l.created);
    debug!("Loaded {} labels from {}", labels.len(), path.display());
    Ok(labels)
}

/// Express each label relative to the recorder file whose UTC span contains
/// its creation time.
///
/// Labels that fall outside every file span are dropped with a warning; the
/// matcher cannot use a label with no recorder-file association.
#[must_use]
pub fn align_labels(labels: &[LabelEvent], spans: &BTreeMap<String, FileSpan>) -> Vec<AlignedLabel> {
    let mut aligned = Vec::new();

    for label in labels {
        let Some((file, span)) = spans.iter().find(|(_, span)| span.contains(label.created))
        else {
            warn!(
                "Label '{}' at {} falls outside every recorder file span",
                label.text, label.created
            );
            continue;
        };

        let start_rel_secs = span.secs_from_start(label.created);
        #[allow(clippy::cast_precision_loss)]
        let duration_secs =
            (label.effective_end() - label.created).num_milliseconds() as f64 / 1000.0;

        aligned.push(AlignedLabel {
            recorder_file: file.clone(),
            start_rel_secs,
            duration_secs,
            text: label.text.clone(),
        });
    }

    aligned.sort_by(|a, b| {
        a.recorder_file
            .cmp(&b.recorder_file)
            .then(a.start_rel_secs.total_cmp(&b.start_rel_secs))
    });
    aligned
}

/// Verify that no two labels for the same recorder file overlap.
///
/// The matcher's containment rules rely on this; the labeling app guarantees
/// it, but the check turns a silent data-quality problem into an error.
/// Expects labels sorted by file then start time, as `align_labels` returns.
pub fn validate_non_overlap(aligned: &[AlignedLabel]) -> Result<()> {
    for pair in aligned.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.recorder_file == b.recorder_file && b.start_rel_secs < a.end_rel_secs() {
            return Err(Error::OverlappingLabels {
                first: a.text.clone(),
                second: b.text.clone(),
                file: a.recorder_file.clone(),
            });
        }
    }
    Ok(())
}

/// Write the aligned-label table (`formattedLabels<daylabel>.csv`).
pub fn write_formatted_labels(path: &Path, aligned: &[AlignedLabel]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::TableWrite {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    writer
        .write_record([
            "Recorder file",
            "Label",
            "Start relative recorder (hh:mm:ss)",
            "Start relative recorder (s)",
            "Label duration",
        ])
        .map_err(|e| Error::TableWrite {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    for label in aligned {
        let start_cell = hms_cell_string(label.start_rel_secs);
        let start_secs = format!("{:.2}", label.start_rel_secs);
        let duration = format!("{:.2}", label.duration_secs);
        writer
            .write_record([
                label.recorder_file.as_str(),
                label.text.as_str(),
                start_cell.as_str(),
                start_secs.as_str(),
                duration.as_str(),
            ])
            .map_err(|e| Error::TableWrite {
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

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::align::clock::{file_span, to_utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn utc(epoch: f64) -> DateTime<Utc> {
        to_utc(epoch, 0.0, 0.0)
    }

    #[test]
    fn test_parse_utc_timestamp_formats() {
        let rfc = parse_utc_timestamp("2020-09-10T14:52:21+00:00").unwrap();
        let space = parse_utc_timestamp("2020-09-10 14:52:21").unwrap();
        let t_sep = parse_utc_timestamp("2020-09-10T14:52:21").unwrap();
        assert_eq!(rfc, space);
        assert_eq!(rfc, t_sep);
        assert!(parse_utc_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_label_stream_sorts_and_filters() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Participant,Event Created Time,Event End,Label").unwrap();
        writeln!(file, "P01,2020-09-10 14:10:00,2020-09-10 14:10:30,cry").unwrap();
        writeln!(file, "P02,2020-09-10 14:00:00,2020-09-10 14:00:10,babble").unwrap();
        writeln!(file, "P01,2020-09-10 14:05:00,,note").unwrap();
        file.flush().unwrap();

        let labels = load_label_stream(file.path(), Some("P01")).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].text, "note");
        assert!(labels[0].end.is_none());
        assert_eq!(labels[1].text, "cry");
    }

    #[test]
    fn test_load_label_stream_rejects_inverted_interval() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Event Created Time,Event End,Label").unwrap();
        writeln!(file, "2020-09-10 14:10:00,2020-09-10 14:09:00,cry").unwrap();
        file.flush().unwrap();

        let result = load_label_stream(file.path(), None);
        assert!(matches!(result, Err(Error::LabelEndsBeforeStart { .. })));
    }

    #[test]
    fn test_note_event_effective_end_is_five_seconds() {
        let label = LabelEvent {
            created: utc(1_600_000_000.0),
            end: None,
            text: "note".to_string(),
        };
        assert_eq!(
            (label.effective_end() - label.created).num_seconds(),
            5
        );
    }

    #[test]
    fn test_align_labels_maps_to_containing_span() {
        let mut spans = BTreeMap::new();
        spans.insert("R1.mp3".to_string(), file_span(utc(1000.0), 600.0));
        spans.insert("R2.mp3".to_string(), file_span(utc(2000.0), 600.0));

        let labels = vec![
            LabelEvent {
                created: utc(1100.0),
                end: Some(utc(1130.0)),
                text: "cry".to_string(),
            },
            LabelEvent {
                created: utc(2050.0),
                end: Some(utc(2055.0)),
                text: "babble".to_string(),
            },
            LabelEvent {
                created: utc(5000.0),
                end: None,
                text: "orphan".to_string(),
            },
        ];

        let aligned = align_labels(&labels, &spans);
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].recorder_file, "R1.mp3");
        assert_eq!(aligned[0].start_rel_secs, 100.0);
        assert_eq!(aligned[0].duration_secs, 30.0);
        assert_eq!(aligned[1].recorder_file, "R2.mp3");
        assert_eq!(aligned[1].start_rel_secs, 50.0);
    }

    #[test]
    fn test_validate_non_overlap_detects_overlap() {
        let aligned = vec![
            AlignedLabel {
                recorder_file: "R1.mp3".to_string(),
                start_rel_secs: 10.0,
                duration_secs: 20.0,
                text: "cry".to_string(),
            },
            AlignedLabel {
                recorder_file: "R1.mp3".to_string(),
                start_rel_secs: 25.0,
                duration_secs: 5.0,
                text: "babble".to_string(),
            },
        ];
        assert!(matches!(
            validate_non_overlap(&aligned),
            Err(Error::OverlappingLabels { .. })
        ));
    }

    #[test]
    fn test_validate_non_overlap_allows_adjacent_and_cross_file() {
        let aligned = vec![
            AlignedLabel {
                recorder_file: "R1.mp3".to_string(),
                start_rel_secs: 10.0,
                duration_secs: 20.0,
                text: "cry".to_string(),
            },
            AlignedLabel {
                recorder_file: "R1.mp3".to_string(),
                start_rel_secs: 30.0,
                duration_secs: 5.0,
                text: "babble".to_string(),
            },
            AlignedLabel {
                recorder_file: "R2.mp3".to_string(),
                start_rel_secs: 12.0,
                duration_secs: 5.0,
                text: "laugh".to_string(),
            },
        ];
        assert!(validate_non_overlap(&aligned).is_ok());
    }
}
