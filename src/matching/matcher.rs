//! The interval-matching decision policy.
//!
//! Each segment is scored against every label of its recorder file and
//! assigned at most one label. Rules are evaluated in strict priority order
//! and the first that fires wins; a lower-priority rule with a tighter fit
//! never overrides a higher one.

use std::collections::BTreeMap;

use tracing::debug;

use crate::align::AlignedLabel;
use crate::constants::matcher as defaults;
use crate::segment::SegmentRecord;

/// Proximity tolerances for the matching rules.
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    /// Maximum gap (s) between segment start and a later label start for a
    /// confident nearest-start assignment.
    pub allowed_delay_confident: f64,
    /// Maximum gap (s) between segment start and a label end for a
    /// tentative nearest-end assignment.
    pub allowed_delay_tentative: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            allowed_delay_confident: defaults::DEFAULT_ALLOWED_DELAY_CONFIDENT,
            allowed_delay_tentative: defaults::DEFAULT_ALLOWED_DELAY_TENTATIVE,
        }
    }
}

/// Signed deltas from one segment's start to every label of its file.
struct SegmentDeltas {
    /// Index of the label whose start is nearest the segment start.
    nearest_start: usize,
    /// Signed `segment_start - label_start` for that label.
    nearest_start_delta: f64,
    /// Index of the label whose end is nearest the segment start.
    nearest_end: usize,
    /// Signed `segment_start - label_end` for that label.
    nearest_end_delta: f64,
}

fn compute_deltas(seg_start: f64, labels: &[AlignedLabel]) -> SegmentDeltas {
    let mut nearest_start = 0;
    let mut nearest_start_delta = f64::INFINITY;
    let mut nearest_end = 0;
    let mut nearest_end_delta = f64::INFINITY;

    for (i, label) in labels.iter().enumerate() {
        let start_delta = seg_start - label.start_rel_secs;
        if start_delta.abs() < nearest_start_delta.abs() {
            nearest_start = i;
            nearest_start_delta = start_delta;
        }
        let end_delta = seg_start - label.end_rel_secs();
        if end_delta.abs() < nearest_end_delta.abs() {
            nearest_end = i;
            nearest_end_delta = end_delta;
        }
    }

    SegmentDeltas {
        nearest_start,
        nearest_start_delta,
        nearest_end,
        nearest_end_delta,
    }
}

/// Decide the label for one segment, or `None` for no assignment.
fn match_segment(
    seg_start: f64,
    seg_end: f64,
    labels: &[AlignedLabel],
    params: MatchParams,
) -> Option<usize> {
    if labels.is_empty() {
        return None;
    }
    let deltas = compute_deltas(seg_start, labels);

    let start_in_label = |l: &AlignedLabel| {
        seg_start >= l.start_rel_secs && seg_start <= l.end_rel_secs()
    };
    let end_in_label =
        |l: &AlignedLabel| seg_end >= l.start_rel_secs && seg_end <= l.end_rel_secs();

    // Rule 1: segment fully contained in a label. Labels are disjoint, so
    // at most one candidate exists.
    if let Some(i) = labels
        .iter()
        .position(|l| start_in_label(l) && end_in_label(l))
    {
        return Some(i);
    }

    // Rule 2: segment end falls within a label (label pressed after the
    // vocalization was heard).
    if let Some(i) = labels.iter().position(end_in_label) {
        return Some(i);
    }

    // Rule 3: the nearest label start came shortly after the segment start.
    if deltas.nearest_start_delta < 0.0
        && deltas.nearest_start_delta.abs() <= params.allowed_delay_confident
    {
        return Some(deltas.nearest_start);
    }

    // Rule 4: the segment starts close to the nearest label end, either side.
    if deltas.nearest_end_delta.abs() <= params.allowed_delay_tentative {
        return Some(deltas.nearest_end);
    }

    // Rule 5: segment starts inside a label but runs past its end; accept
    // only when the label's end is still close. The labeler may have ended
    // the label expecting the vocalization to stop.
    if let Some(i) = labels.iter().position(start_in_label) {
        let end_delta = seg_start - labels[i].end_rel_secs();
        if end_delta.abs() <= params.allowed_delay_tentative {
            return Some(i);
        }
        return None;
    }

    None
}

/// Assign at most one label to every segment.
///
/// Returns an explicit segment-path to label-text mapping; unmatched
/// segments map to the empty string. Inputs are expected sorted by recorder
/// file then start time, but the outcome of each segment is independent of
/// the others.
#[must_use]
pub fn assign_labels(
    segments: &[SegmentRecord],
    labels: &[AlignedLabel],
    params: MatchParams,
) -> BTreeMap<String, String> {
    let mut assignments = BTreeMap::new();

    // Group labels by recorder file once instead of re-filtering per segment
    let mut labels_by_file: BTreeMap<&str, Vec<AlignedLabel>> = BTreeMap::new();
    for label in labels {
        labels_by_file
            .entry(label.recorder_file.as_str())
            .or_default()
            .push(label.clone());
    }

    for segment in segments {
        let file_labels: &[AlignedLabel] = labels_by_file
            .get(segment.recorder_file.as_str())
            .map_or(&[], |v| v.as_slice());

        let matched = match_segment(
            segment.start_rel_recorder_secs,
            segment.end_rel_recorder_secs(),
            file_labels,
            params,
        );

        let text = matched.map_or_else(String::new, |i| file_labels[i].text.clone());
        if text.is_empty() {
            debug!("No label for segment {}", segment.segment_path);
        }
        assignments.insert(segment.segment_path.clone(), text);
    }

    assignments
}
