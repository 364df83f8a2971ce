//! Chunk extraction: cropping decoded recorder audio to label windows.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::audio::{DecodedAudio, crop_samples, write_wav_file};
use crate::error::{Error, Result};
use crate::utils::time::{parse_time_range, time_range_token};

/// Timing of one exported chunk relative to its recorder file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTiming {
    /// Basename of the recorder file the chunk was cut from.
    pub recorder_file: String,
    /// Chunk start relative to the recorder file, in seconds.
    pub offset_secs: f64,
    /// Chunk duration in seconds.
    pub duration_secs: f64,
}

/// Chunk timings keyed by exported path minus extension.
///
/// The manifest is the strongly-typed carrier of chunk offsets between
/// extraction and segmentation. Parsing the offset back out of the filename
/// is only a fallback for segmenting a chunk directory produced by an
/// earlier run.
#[derive(Debug, Default)]
pub struct ChunkManifest {
    entries: BTreeMap<PathBuf, ChunkTiming>,
}

impl ChunkManifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timing of an exported chunk.
    pub fn insert(&mut self, exported: &Path, timing: ChunkTiming) {
        self.entries.insert(exported.with_extension(""), timing);
    }

    /// Timing for an exported chunk path, if recorded in this process.
    #[must_use]
    pub fn get(&self, exported: &Path) -> Option<&ChunkTiming> {
        self.entries.get(&exported.with_extension(""))
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timing for a chunk file, recovering it from the filename when the
    /// chunk was not extracted in this process.
    ///
    /// The fallback parses the embedded `HH-MM-SS.SS--HH-MM-SS.SS` token and
    /// takes everything before the final underscore as the recorder file
    /// stem. A chunk filename without a parseable token is an error; the
    /// offset is never silently zeroed.
    pub fn timing_for(&self, chunk_path: &Path) -> Result<ChunkTiming> {
        if let Some(timing) = self.get(chunk_path) {
            return Ok(timing.clone());
        }
        parse_chunk_filename(chunk_path)
    }
}

/// Recover chunk timing from a filename of the form
/// `<recorder-stem>_<HH-MM-SS.SS>--<HH-MM-SS.SS>.wav`.
fn parse_chunk_filename(chunk_path: &Path) -> Result<ChunkTiming> {
    let stem = chunk_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::MalformedChunkFilename {
            path: chunk_path.to_path_buf(),
        })?;

    let (recorder_stem, range) =
        stem.rsplit_once('_')
            .ok_or_else(|| Error::MalformedChunkFilename {
                path: chunk_path.to_path_buf(),
            })?;

    let (start, end) = parse_time_range(range).ok_or_else(|| Error::MalformedChunkFilename {
        path: chunk_path.to_path_buf(),
    })?;

    Ok(ChunkTiming {
        recorder_file: format!("{recorder_stem}.mp3"),
        offset_secs: start,
        duration_secs: end - start,
    })
}

/// Export one WAV per chunk interval of a decoded recorder file.
///
/// Filenames encode the file-relative time range; the manifest records each
/// chunk's offset and duration for the segmenter. Returns the number of
/// chunks written.
pub fn extract_chunks(
    recorder_path: &Path,
    decoded: &DecodedAudio,
    intervals: &[(f64, f64)],
    chunk_dir: &Path,
    manifest: &mut ChunkManifest,
) -> Result<usize> {
    if intervals.is_empty() {
        return Ok(0);
    }

    fs::create_dir_all(chunk_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: chunk_dir.to_path_buf(),
        source: e,
    })?;

    let recorder_file = recorder_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = recorder_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut written = 0;
    for &(start, end) in intervals {
        let samples = crop_samples(&decoded.samples, decoded.sample_rate, start, end);
        let filename = format!("{stem}_{}.wav", time_range_token(start, end));
        let export_path = chunk_dir.join(filename);

        write_wav_file(&export_path, samples, decoded.sample_rate)?;
        info!(
            "Exported chunk {} ({:.2}s-{:.2}s)",
            export_path.display(),
            start,
            end
        );

        manifest.insert(
            &export_path,
            ChunkTiming {
                recorder_file: recorder_file.clone(),
                offset_secs: start,
                duration_secs: end - start,
            },
        );
        written += 1;
    }

    Ok(written)
}
