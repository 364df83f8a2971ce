//! Participant reference table lookup.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Row shape of the participant reference CSV.
#[derive(Debug, Deserialize)]
struct ParticipantRecord {
    #[serde(rename = "Participant")]
    participant: String,
    #[serde(rename = "UTC_offset")]
    utc_offset: f64,
}

/// Look up a participant's UTC offset (hours, signed) in the reference table.
pub fn lookup_utc_offset(path: &Path, participant: &str) -> Result<f64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::TableRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    for (line_num, result) in reader.deserialize::<ParticipantRecord>().enumerate() {
        let record = result.map_err(|e| Error::InvalidTableRow {
            path: path.to_path_buf(),
            message: format!("line {}: {e}", line_num + 2),
        })?;
        if record.participant == participant {
            return Ok(record.utc_offset);
        }
    }

    Err(Error::ParticipantNotFound {
        id: participant.to_string(),
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_finds_offset() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Participant,UTC_offset,Notes").unwrap();
        writeln!(file, "P01,-5.0,east coast").unwrap();
        writeln!(file, "P02,5.5,half-hour zone").unwrap();
        file.flush().unwrap();

        assert_eq!(lookup_utc_offset(file.path(), "P01").unwrap(), -5.0);
        assert_eq!(lookup_utc_offset(file.path(), "P02").unwrap(), 5.5);
    }

    #[test]
    fn test_lookup_missing_participant_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Participant,UTC_offset").unwrap();
        writeln!(file, "P01,-5.0").unwrap();
        file.flush().unwrap();

        let result = lookup_utc_offset(file.path(), "P99");
        assert!(matches!(result, Err(Error::ParticipantNotFound { .. })));
    }
}
