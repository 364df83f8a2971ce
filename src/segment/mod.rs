//! Silence-based vocalization segmentation.

mod segmenter;
mod silence;
mod table;

pub use segmenter::{SegmentRun, SegmentSource, SegmenterParams, segment_directory};
pub use silence::detect_nonsilent;
pub use table::{SegmentRecord, read_segment_table, write_segment_table};
