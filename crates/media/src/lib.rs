//! # Verdant Media
//!
//! Audio utilities for verdant:
//! - `convert`: decode MP3 (or any format symphonia probes) and re-encode
//!   it as a WAV file
//! - `tts`: text-to-speech through the Google Translate speech endpoint,
//!   producing an MP3 byte stream

pub mod convert;
pub mod error;
pub mod tts;

pub use convert::{
    convert_to_wav, decode_audio_bytes, decode_audio_file, write_wav, AudioData, WavOptions,
    WavSampleFormat,
};
pub use error::{MediaError, Result};
pub use tts::{split_text, TtsClient, TtsOptions, Voice, VOICES};
