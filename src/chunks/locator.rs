//! Gap-based grouping of labels into padded time windows.

use chrono::{DateTime, TimeDelta, Utc};

use crate::align::LabelEvent;
use crate::constants::locator::EDGE_PADDING_MULTIPLIER;

/// A padded UTC time window covering one or more temporally close labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// UTC start of the window.
    pub start: DateTime<Utc>,
    /// UTC end of the window.
    pub end: DateTime<Utc>,
}

fn secs(delta: TimeDelta) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        delta.num_milliseconds() as f64 / 1000.0
    }
}

fn delta_secs(s: f64) -> TimeDelta {
    #[allow(clippy::cast_possible_truncation)]
    TimeDelta::milliseconds((s * 1000.0).round() as i64)
}

/// Group a chronologically sorted label stream into padded chunks.
///
/// A new chunk starts wherever the gap between consecutive label creation
/// times exceeds `max_gap_secs`. Each chunk spans from the first label's
/// creation time minus `padding_secs` to the last label's effective end plus
/// `padding_secs`; the first chunk of the day gets double padding before its
/// start and the last chunk double padding after its end. A single-label
/// stream yields one chunk with double padding on both sides.
#[must_use]
pub fn locate_chunks(labels: &[LabelEvent], max_gap_secs: f64, padding_secs: f64) -> Vec<Chunk> {
    if labels.is_empty() {
        return Vec::new();
    }

    // Indices of run starts: a run breaks where the inter-label gap exceeds
    // the threshold.
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut run_start = 0;
    for i in 0..labels.len() - 1 {
        let gap = secs(labels[i + 1].created - labels[i].created);
        if gap > max_gap_secs {
            runs.push((run_start, i));
            run_start = i + 1;
        }
    }
    runs.push((run_start, labels.len() - 1));

    let pad = delta_secs(padding_secs);
    let edge_pad = delta_secs(padding_secs * EDGE_PADDING_MULTIPLIER);
    let last_run = runs.len() - 1;

    runs.iter()
        .enumerate()
        .map(|(i, &(first, last))| {
            let lead = if i == 0 { edge_pad } else { pad };
            let trail = if i == last_run { edge_pad } else { pad };
            Chunk {
                start: labels[first].created - lead,
                end: labels[last].effective_end() + trail,
            }
        })
        .collect()
}
