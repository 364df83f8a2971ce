//! Label-dense chunk location, intersection, and extraction.
//!
//! Chunks bound the search space for silence-based segmentation: instead of
//! scanning a whole recorder day, only padded windows around temporally
//! close labels are decoded and exported.

mod extractor;
mod intersect;
mod locator;

pub use extractor::{ChunkManifest, ChunkTiming, extract_chunks};
pub use intersect::{ChunkPlacement, chunks_for_file, classify_chunk};
pub use locator::{Chunk, locate_chunks};
