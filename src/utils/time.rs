//! Conversions between seconds and hour/minute/second representations,
//! and parsing of the time-range tokens embedded in exported filenames.
//!
//! Exported chunk and segment files carry a time range of the form
//! `HH-MM-SS.SS--HH-MM-SS.SS` (file-relative start and end). Table cells use
//! a colon-delimited variant with a leading colon so spreadsheet software
//! does not strip leading zeros.

use crate::constants::layout::TIME_RANGE_SEPARATOR;

/// Split a total number of seconds into whole hours, minutes, and seconds.
#[must_use]
pub fn hms(total_secs: f64) -> (u64, u64, u64) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hours = (total_secs / 3600.0).floor() as u64;
    #[allow(clippy::cast_precision_loss)]
    let rem = total_secs - (hours as f64) * 3600.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = (rem / 60.0).floor() as u64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[allow(clippy::cast_precision_loss)]
    let seconds = (rem - (minutes as f64) * 60.0).floor() as u64;
    (hours, minutes, seconds)
}

/// Whole hours and minutes plus the remaining fractional seconds.
///
/// Rounds to centiseconds before splitting so a fraction that rounds up
/// carries into the minute field instead of printing as 60.00.
#[must_use]
fn hms_with_frac(total_secs: f64) -> (u64, u64, f64) {
    let rounded = (total_secs * 100.0).round() / 100.0;
    let (hours, minutes, _) = hms(rounded);
    #[allow(clippy::cast_precision_loss)]
    let rem = rounded - (hours as f64) * 3600.0 - (minutes as f64) * 60.0;
    (hours, minutes, rem)
}

/// Format a total number of seconds as `HH-MM-SS.SS` for use in filenames.
///
/// Hour and minute fields are two-digit zero-padded; the seconds field
/// carries two decimal places and is zero-padded below ten. With
/// `include_sec_frac = false` the seconds field is a floored two-digit
/// integer instead.
#[must_use]
pub fn hms_string(total_secs: f64, include_sec_frac: bool) -> String {
    if include_sec_frac {
        let (hours, minutes, frac) = hms_with_frac(total_secs);
        format!("{hours:02}-{minutes:02}-{frac:05.2}")
    } else {
        let (hours, minutes, whole_secs) = hms(total_secs);
        format!("{hours:02}-{minutes:02}-{whole_secs:02}")
    }
}

/// Format a total number of seconds as `:HH:MM:SS.SS` for table cells.
///
/// The leading colon keeps spreadsheet software from stripping the
/// zero-padded hour field.
#[must_use]
pub fn hms_cell_string(total_secs: f64) -> String {
    let (hours, minutes, frac) = hms_with_frac(total_secs);
    format!(":{hours:02}:{minutes:02}:{frac:05.2}")
}

/// Parse a single `HH-MM-SS.SS` field back to total seconds.
///
/// Returns `None` if the field does not have exactly three numeric
/// hyphen-separated components.
#[must_use]
pub fn parse_hms_field(field: &str) -> Option<f64> {
    let mut parts = field.splitn(3, '-');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Parse a filename time-range token `HH-MM-SS.SS--HH-MM-SS.SS` into
/// (start, end) total seconds.
#[must_use]
pub fn parse_time_range(token: &str) -> Option<(f64, f64)> {
    let (start, end) = token.split_once(TIME_RANGE_SEPARATOR)?;
    Some((parse_hms_field(start)?, parse_hms_field(end)?))
}

/// Format the filename time-range token for a (start, end) pair of
/// file-relative offsets in seconds.
#[must_use]
pub fn time_range_token(start_secs: f64, end_secs: f64) -> String {
    format!(
        "{}{TIME_RANGE_SEPARATOR}{}",
        hms_string(start_secs, true),
        hms_string(end_secs, true)
    )
}
