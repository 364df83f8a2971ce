//! Segmentation of chunk or raw audio files into vocalization segments.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audio::{convert_to_wav, crop_samples, decode_audio_file, write_wav_file};
use crate::chunks::{ChunkManifest, ChunkTiming};
use crate::constants::layout::{CHUNK_DIR, SEGMENT_DIR_PREFIX};
use crate::constants::{RECORDER_EXTENSIONS, segmenter as defaults};
use crate::error::{Error, Result};
use crate::output::progress;
use crate::segment::silence::detect_nonsilent;
use crate::segment::table::{SegmentRecord, write_segment_table};
use crate::utils::time::{hms_cell_string, time_range_token};

/// Where the segmenter reads its input audio from.
///
/// The choice is explicit; the presence or absence of a chunk directory is
/// never used as an implicit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSource {
    /// Segment the label-bounded chunk files under `AudioChunksByLabel/`.
    LabelChunks,
    /// Segment the raw recorder files, converting them to WAV first.
    RawFiles,
}

/// Silence-detection and export parameters for one segmentation run.
#[derive(Debug, Clone)]
pub struct SegmenterParams {
    /// Minimum silence run separating two segments, in ms.
    pub min_silence_len_ms: u64,
    /// Silence threshold in dBFS.
    pub silence_thresh_db: f64,
    /// Symmetric padding applied to every detected interval, in ms.
    pub final_padding_ms: u64,
    /// Run token embedded in output names.
    pub token: String,
    /// Whether to draw progress bars.
    pub progress: bool,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            min_silence_len_ms: defaults::DEFAULT_MIN_SILENCE_LEN_MS,
            silence_thresh_db: defaults::DEFAULT_SILENCE_THRESH_DB,
            final_padding_ms: defaults::DEFAULT_FINAL_PADDING_MS,
            token: defaults::DEFAULT_TOKEN.to_string(),
            progress: false,
        }
    }
}

/// Output of a segmentation run that produced at least one segment.
#[derive(Debug)]
pub struct SegmentRun {
    /// Run token, for downstream path construction.
    pub token: String,
    /// Directory the segment WAVs were exported to.
    pub segment_dir: PathBuf,
    /// Path of the segment table CSV.
    pub table_path: PathBuf,
    /// Table rows, sorted by recorder file then start time.
    pub records: Vec<SegmentRecord>,
}

/// Pad an interval and clamp it to the file bounds.
fn pad_interval(start_ms: u64, end_ms: u64, padding_ms: u64, file_length_ms: u64) -> (u64, u64) {
    let start = start_ms.saturating_sub(padding_ms);
    let end = (end_ms + padding_ms).min(file_length_ms);
    (start, end)
}

/// Segment every input file of a participant-day by volume.
///
/// Detected intervals are padded, clamped, exported as WAVs named with
/// recorder-file-relative times, and collected into the segment table CSV
/// `<data_path>/AudioSegments_<token>_<daylabel>.csv`.
///
/// Returns `Ok(None)` when no segments were found across all inputs; the
/// caller is expected to skip matching in that case. Per-file decode
/// failures are logged and skipped; table write failures propagate.
pub fn segment_directory(
    data_path: &Path,
    source: SegmentSource,
    params: &SegmenterParams,
    manifest: &ChunkManifest,
) -> Result<Option<SegmentRun>> {
    let input_dir = match source {
        SegmentSource::LabelChunks => data_path.join(CHUNK_DIR),
        SegmentSource::RawFiles => data_path.to_path_buf(),
    };

    if !input_dir.is_dir() {
        warn!("No input directory at {}", input_dir.display());
        return Ok(None);
    }

    let files = collect_input_files(&input_dir, source)?;
    info!(
        "Found {} file(s) to segment in {}",
        files.len(),
        input_dir.display()
    );

    let segment_dir = data_path.join(format!("{SEGMENT_DIR_PREFIX}{}", params.token));
    let day_label = data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table_path =
        data_path.join(format!("{SEGMENT_DIR_PREFIX}{}_{day_label}.csv", params.token));

    let bar = progress::create_file_progress(files.len(), params.progress);
    let mut records: Vec<SegmentRecord> = Vec::new();

    for file in &files {
        match segment_one_file(file, data_path, source, params, manifest, &segment_dir) {
            Ok(mut file_records) => records.append(&mut file_records),
            Err(e) => warn!("Failed to segment {}: {e}", file.display()),
        }
        progress::inc_progress(bar.as_ref());
    }
    progress::finish_progress(bar, "Segmented");

    if records.is_empty() {
        warn!("No segments found with the specified parameters");
        return Ok(None);
    }

    // Documented sort key: recorder file, then recorder-relative start.
    records.sort_by(|a, b| {
        a.recorder_file
            .cmp(&b.recorder_file)
            .then(a.start_rel_recorder_secs.total_cmp(&b.start_rel_recorder_secs))
    });

    write_segment_table(&table_path, &records)?;
    info!(
        "Wrote {} segment row(s) to {}",
        records.len(),
        table_path.display()
    );

    Ok(Some(SegmentRun {
        token: params.token.clone(),
        segment_dir,
        table_path,
        records,
    }))
}

/// Segment a single chunk or raw file, exporting its vocalization WAVs.
fn segment_one_file(
    file: &Path,
    data_path: &Path,
    source: SegmentSource,
    params: &SegmenterParams,
    manifest: &ChunkManifest,
    segment_dir: &Path,
) -> Result<Vec<SegmentRecord>> {
    info!("Segmenting by volume: {}", file.display());
    let decoded = decode_audio_file(file)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let file_length_ms = (decoded.duration_secs() * 1000.0) as u64;

    let timing = match source {
        SegmentSource::LabelChunks => manifest.timing_for(file)?,
        SegmentSource::RawFiles => ChunkTiming {
            recorder_file: resolve_recorder_file(data_path, file),
            offset_secs: 0.0,
            duration_secs: decoded.duration_secs(),
        },
    };
    let recorder_stem = Path::new(&timing.recorder_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let intervals = detect_nonsilent(
        &decoded.samples,
        decoded.sample_rate,
        params.min_silence_len_ms,
        params.silence_thresh_db,
    );

    let mut records = Vec::new();
    for (raw_start, raw_end) in intervals {
        let (start_ms, end_ms) =
            pad_interval(raw_start, raw_end, params.final_padding_ms, file_length_ms);
        #[allow(clippy::cast_precision_loss)]
        let start_secs = start_ms as f64 / 1000.0;
        #[allow(clippy::cast_precision_loss)]
        let end_secs = end_ms as f64 / 1000.0;

        let start_rel_recorder = timing.offset_secs + start_secs;
        let end_rel_recorder = timing.offset_secs + end_secs;

        fs::create_dir_all(segment_dir).map_err(|e| Error::OutputDirCreateFailed {
            path: segment_dir.to_path_buf(),
            source: e,
        })?;

        let filename = format!(
            "{recorder_stem}_{}.wav",
            time_range_token(start_rel_recorder, end_rel_recorder)
        );
        let export_path = segment_dir.join(filename);
        let samples = crop_samples(&decoded.samples, decoded.sample_rate, start_secs, end_secs);
        write_wav_file(&export_path, samples, decoded.sample_rate)?;

        records.push(SegmentRecord {
            recorder_file: timing.recorder_file.clone(),
            segment_path: export_path.to_string_lossy().into_owned(),
            label_chunk_file: file.to_string_lossy().into_owned(),
            start_rel_recorder_hms: hms_cell_string(start_rel_recorder),
            start_rel_recorder_secs: start_rel_recorder,
            duration_secs: end_secs - start_secs,
            start_rel_chunk_hms: hms_cell_string(start_secs),
            start_rel_chunk_secs: start_secs,
            possible_label: String::new(),
        });
    }

    Ok(records)
}

/// Collect the WAV inputs for one segmentation run, in sorted path order.
///
/// In raw-file mode, non-WAV recorder files are converted beside the
/// originals first; conversion failures skip that file only.
fn collect_input_files(input_dir: &Path, source: SegmentSource) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match (source, ext.as_deref()) {
            (_, Some("wav")) => files.push(path),
            (SegmentSource::RawFiles, Some(ext)) if RECORDER_EXTENSIONS.contains(&ext) => {
                match convert_to_wav(&path) {
                    Ok(wav_path) => {
                        if !files.contains(&wav_path) {
                            files.push(wav_path);
                        }
                    }
                    Err(e) => warn!("Failed to convert {}: {e}", path.display()),
                }
            }
            _ => {}
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Recorder file basename for a raw input WAV.
///
/// Prefers an original compressed file with the same stem in the data
/// directory; falls back to the WAV itself.
fn resolve_recorder_file(data_path: &Path, wav_file: &Path) -> String {
    let stem = wav_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in RECORDER_EXTENSIONS {
        if *ext == "wav" {
            continue;
        }
        let candidate = data_path.join(format!("{stem}.{ext}"));
        if candidate.exists() {
            return format!("{stem}.{ext}");
        }
    }
    format!("{stem}.wav")
}
