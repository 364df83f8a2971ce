//! Clock reconciliation and label alignment.
//!
//! Labels are timestamped in UTC by the mobile app; recorder files carry
//! only a local-clock modification time. This module converts recorder
//! timestamps to UTC and expresses each label relative to the recorder file
//! it falls within.

mod clock;
mod labels;
mod participants;

pub use clock::{FileSpan, file_span, mtime_epoch_secs, to_utc};
pub use labels::{
    AlignedLabel, LabelEvent, align_labels, load_label_stream, parse_utc_timestamp,
    validate_non_overlap, write_formatted_labels,
};
pub use participants::lookup_utc_offset;
