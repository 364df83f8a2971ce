//! WAV file writing.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::audio::decode_audio_file;
use crate::error::{Error, Result};

/// Write mono f32 samples to a 16-bit PCM WAV file.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Convert f32 samples to i16
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let sample_i16 = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| Error::WavWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    writer.finalize().map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Convert an audio file to a 16-bit PCM WAV beside the original.
///
/// Returns the path of the converted file. If a WAV with the target name
/// already exists it is reused without re-decoding.
pub fn convert_to_wav(path: &Path) -> Result<PathBuf> {
    let wav_path = path.with_extension("wav");
    if wav_path.exists() {
        return Ok(wav_path);
    }

    info!("Converting {} to WAV", path.display());
    let decoded = decode_audio_file(path)?;
    write_wav_file(&wav_path, &decoded.samples, decoded.sample_rate)?;
    Ok(wav_path)
}
