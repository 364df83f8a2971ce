//! The participant-day pipeline.
//!
//! One run covers one participant-day directory: reconcile the recorder
//! clock with UTC, extract label-dense chunks, segment them by volume, and
//! assign labels to the resulting segments.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::align::{
    FileSpan, align_labels, file_span, load_label_stream, lookup_utc_offset, mtime_epoch_secs,
    to_utc, validate_non_overlap, write_formatted_labels,
};
use crate::audio::decode_audio_file;
use crate::chunks::{Chunk, ChunkManifest, chunks_for_file, extract_chunks, locate_chunks};
use crate::config::Config;
use crate::constants::RECORDER_EXTENSIONS;
use crate::constants::layout::{CHUNK_DIR, FORMATTED_LABELS_PREFIX};
use crate::error::{Error, Result};
use crate::matching::{MatchParams, apply_assignments, assign_labels};
use crate::segment::{SegmentSource, SegmenterParams, segment_directory};

/// Inputs for one participant-day run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Participant identifier, used for label filtering and the UTC offset
    /// lookup.
    pub participant: Option<String>,
    /// Path to the label stream CSV.
    pub labels_path: PathBuf,
    /// Path to the participant table CSV.
    pub participants_path: Option<PathBuf>,
    /// Recorder clock drift in seconds.
    pub drift_seconds: f64,
    /// UTC offset in hours, overriding the participant table.
    pub utc_offset_hours: Option<f64>,
    /// Where the segmenter reads its input audio from.
    pub source: SegmentSource,
    /// Whether to draw progress bars.
    pub progress: bool,
}

/// Counters summarizing one completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DaySummary {
    /// Recorder files whose clock was reconciled successfully.
    pub recorder_files: usize,
    /// Chunk WAVs exported.
    pub chunks_written: usize,
    /// Labels aligned to a recorder file.
    pub labels_aligned: usize,
    /// Segments exported.
    pub segments: usize,
    /// Segments that received a label.
    pub matched: usize,
}

/// Run the full pipeline over one participant-day directory.
pub fn run_day(data_path: &Path, options: &PipelineOptions, config: &Config) -> Result<DaySummary> {
    let utc_offset = resolve_utc_offset(options)?;
    info!(
        "Processing {} (UTC offset {utc_offset:+.1} h, drift {:+.1} s)",
        data_path.display(),
        options.drift_seconds
    );

    let labels = load_label_stream(&options.labels_path, options.participant.as_deref())?;
    info!("Loaded {} label event(s)", labels.len());

    let chunks = locate_chunks(
        &labels,
        config.locator.max_label_gap_secs,
        config.locator.chunk_padding_secs,
    );
    info!("Located {} label-dense chunk(s)", chunks.len());

    let recorder_files = collect_recorder_files(data_path)?;
    let mut summary = DaySummary::default();
    let mut spans: BTreeMap<String, FileSpan> = BTreeMap::new();
    let mut manifest = ChunkManifest::new();
    let chunk_dir = data_path.join(CHUNK_DIR);

    for path in &recorder_files {
        match process_recorder_file(path, &chunks, &chunk_dir, utc_offset, options, &mut manifest)
        {
            Ok((name, span, written)) => {
                spans.insert(name, span);
                summary.recorder_files += 1;
                summary.chunks_written += written;
            }
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
    }

    if spans.is_empty() {
        return Err(Error::NoRecorderFiles {
            path: data_path.to_path_buf(),
        });
    }

    let aligned = align_labels(&labels, &spans);
    validate_non_overlap(&aligned)?;
    summary.labels_aligned = aligned.len();

    let day_label = data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let labels_table = data_path.join(format!("{FORMATTED_LABELS_PREFIX}{day_label}.csv"));
    write_formatted_labels(&labels_table, &aligned)?;
    info!(
        "Wrote {} aligned label(s) to {}",
        aligned.len(),
        labels_table.display()
    );

    let params = SegmenterParams {
        min_silence_len_ms: config.segmenter.min_silence_len_ms,
        silence_thresh_db: config.segmenter.silence_thresh_db,
        final_padding_ms: config.segmenter.final_padding_ms,
        token: config.segmenter.token.clone(),
        progress: options.progress,
    };
    let Some(mut run) = segment_directory(data_path, options.source, &params, &manifest)? else {
        return Ok(summary);
    };
    summary.segments = run.records.len();

    let match_params = MatchParams {
        allowed_delay_confident: config.matcher.allowed_delay_confident,
        allowed_delay_tentative: config.matcher.allowed_delay_tentative,
    };
    let assignments = assign_labels(&run.records, &aligned, match_params);
    summary.matched = assignments.values().filter(|l| !l.is_empty()).count();

    apply_assignments(
        &run.table_path,
        &run.segment_dir,
        &mut run.records,
        &assignments,
    )?;

    info!(
        "Done: {} file(s), {} chunk(s), {} segment(s), {} matched",
        summary.recorder_files, summary.chunks_written, summary.segments, summary.matched
    );
    Ok(summary)
}

/// Reconcile one recorder file's clock and export its chunk intervals.
///
/// Returns the file's basename, its UTC span, and the number of chunks
/// written. In raw-file mode no chunks are extracted, but the span is still
/// needed to align labels.
fn process_recorder_file(
    path: &Path,
    chunks: &[Chunk],
    chunk_dir: &Path,
    utc_offset: f64,
    options: &PipelineOptions,
    manifest: &mut ChunkManifest,
) -> Result<(String, FileSpan, usize)> {
    let decoded = decode_audio_file(path)?;
    let mtime = mtime_epoch_secs(path)?;
    let start = to_utc(mtime, utc_offset, options.drift_seconds);
    let span = file_span(start, decoded.duration_secs());

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        "{name}: UTC span {} to {} ({:.1} s)",
        span.start,
        span.end,
        decoded.duration_secs()
    );

    let written = if options.source == SegmentSource::LabelChunks {
        let intervals = chunks_for_file(chunks, &span);
        extract_chunks(path, &decoded, &intervals, chunk_dir, manifest)?
    } else {
        0
    };

    Ok((name, span, written))
}

/// Resolve the UTC offset for the run.
///
/// A command-line override wins; otherwise the participant table is
/// consulted. Having neither is an error, since clock reconciliation cannot
/// proceed without it.
fn resolve_utc_offset(options: &PipelineOptions) -> Result<f64> {
    if let Some(offset) = options.utc_offset_hours {
        return Ok(offset);
    }
    match (&options.participants_path, &options.participant) {
        (Some(path), Some(participant)) => lookup_utc_offset(path, participant),
        _ => Err(Error::UtcOffsetUnknown),
    }
}

/// Collect recorder audio files in the data directory, sorted by name.
///
/// When a compressed original and a converted WAV share a stem, only the
/// compressed file is kept; its modification time is the authoritative one.
fn collect_recorder_files(data_path: &Path) -> Result<Vec<PathBuf>> {
    let mut by_stem: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in fs::read_dir(data_path)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
        else {
            continue;
        };
        if !RECORDER_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        match by_stem.get(&stem) {
            None => {
                by_stem.insert(stem, path);
            }
            Some(existing) => {
                let existing_is_wav =
                    existing.extension().and_then(|e| e.to_str()) == Some("wav");
                if existing_is_wav && ext != "wav" {
                    by_stem.insert(stem, path);
                } else if ext == "wav" {
                    info!(
                        "Ignoring {} in favor of {}",
                        path.display(),
                        existing.display()
                    );
                }
            }
        }
    }

    Ok(by_stem.into_values().collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_utc_offset_prefers_override() {
        let options = PipelineOptions {
            participant: Some("P01".to_string()),
            labels_path: PathBuf::from("/labels.csv"),
            participants_path: Some(PathBuf::from("/participants.csv")),
            drift_seconds: 0.0,
            utc_offset_hours: Some(-5.0),
            source: SegmentSource::LabelChunks,
            progress: false,
        };
        assert!((resolve_utc_offset(&options).unwrap() - -5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_utc_offset_requires_a_source() {
        let options = PipelineOptions {
            participant: None,
            labels_path: PathBuf::from("/labels.csv"),
            participants_path: None,
            drift_seconds: 0.0,
            utc_offset_hours: None,
            source: SegmentSource::LabelChunks,
            progress: false,
        };
        assert!(matches!(
            resolve_utc_offset(&options),
            Err(Error::UtcOffsetUnknown)
        ));
    }

    #[test]
    fn test_collect_recorder_files_prefers_compressed_over_wav() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("R1.mp3"), b"x").unwrap();
        fs::write(dir.path().join("R1.wav"), b"x").unwrap();
        fs::write(dir.path().join("R2.wav"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = collect_recorder_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["R1.mp3", "R2.wav"]);
    }
}
