//! Audio decoding, cropping, and WAV export.

mod crop;
mod decode;
mod wav;

pub use crop::crop_samples;
pub use decode::{DecodedAudio, decode_audio_file};
pub use wav::{convert_to_wav, write_wav_file};
