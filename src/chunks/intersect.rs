//! Intersection of label chunks against a recorder file's UTC span.

use crate::align::FileSpan;
use crate::chunks::Chunk;

/// How a chunk sits relative to one recorder file's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPlacement {
    /// Both chunk endpoints fall inside the file.
    FullyInside,
    /// The chunk starts inside the file but ends after it.
    StartsInside,
    /// The chunk ends inside the file but starts before it.
    EndsInside,
    /// Neither endpoint falls inside the file.
    Outside,
}

/// Classify a chunk against a file span.
///
/// Endpoint comparisons are strict: a chunk endpoint exactly on the file
/// boundary counts as outside, matching the clipping behavior where partial
/// chunks are cut exactly at the boundary.
#[must_use]
pub fn classify_chunk(chunk: &Chunk, span: &FileSpan) -> ChunkPlacement {
    let start_in = chunk.start > span.start && chunk.start < span.end;
    let end_in = chunk.end > span.start && chunk.end < span.end;
    match (start_in, end_in) {
        (true, true) => ChunkPlacement::FullyInside,
        (true, false) => ChunkPlacement::StartsInside,
        (false, true) => ChunkPlacement::EndsInside,
        (false, false) => ChunkPlacement::Outside,
    }
}

/// Chunks intersected with one file, as file-relative (start, end) seconds.
///
/// Partially inside chunks are clipped to the file boundary; chunks entirely
/// outside the file are dropped.
#[must_use]
pub fn chunks_for_file(chunks: &[Chunk], span: &FileSpan) -> Vec<(f64, f64)> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let (start, end) = match classify_chunk(chunk, span) {
                ChunkPlacement::FullyInside => (chunk.start, chunk.end),
                ChunkPlacement::StartsInside => (chunk.start, span.end),
                ChunkPlacement::EndsInside => (span.start, chunk.end),
                ChunkPlacement::Outside => return None,
            };
            Some((span.secs_from_start(start), span.secs_from_start(end)))
        })
        .collect()
}
