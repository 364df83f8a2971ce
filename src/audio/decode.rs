//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Duration of the decoded audio in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.samples.len() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Decode an audio file to mono f32 samples.
///
/// Supports WAV, FLAC, MP3, and AAC (including M4A containers).
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    // Probe the file
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    // Create decoder
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        append_samples(decoded, channels, &mut samples);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Append decoded samples to the output buffer, converting to mono f32.
///
/// `SampleBuffer` handles the conversion for every sample format symphonia
/// can decode (u8 through f64, including 24-bit), so no format is ever
/// silently dropped.
fn append_samples(buffer: AudioBufferRef, channels: usize, output: &mut Vec<f32>) {
    let spec = *buffer.spec();
    let duration = buffer.capacity() as u64;

    let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
    sample_buf.copy_interleaved_ref(buffer);
    let interleaved = sample_buf.samples();

    if channels <= 1 {
        output.extend_from_slice(interleaved);
    } else {
        // Mix interleaved frames to mono
        for frame in interleaved.chunks_exact(channels) {
            let sum: f32 = frame.iter().sum();
            #[allow(clippy::cast_precision_loss)]
            output.push(sum / channels as f32);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    #[test]
    fn test_decodes_24_bit_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s24.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        // Half a second of a square wave at roughly half amplitude
        for i in 0..4000i32 {
            let value = if i % 2 == 0 { 4_000_000 } else { -4_000_000 };
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode_audio_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 4000);
        let peak = decoded.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.477).abs() < 0.01, "peak was {peak}");
    }

    #[test]
    fn test_mixes_stereo_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..1000 {
            writer.write_sample(16000i16).unwrap(); // left
            writer.write_sample(0i16).unwrap(); // right
        }
        writer.finalize().unwrap();

        let decoded = decode_audio_file(&path).unwrap();
        assert_eq!(decoded.samples.len(), 1000);
        // Mono mix averages the channels
        let expected = f32::from(16000i16) / 32768.0 / 2.0;
        assert!((decoded.samples[0] - expected).abs() < 0.001);
    }
}
