//! Error types for audio conversion and speech synthesis

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("WAV encode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("no decodable audio track found")]
    NoAudioTrack,

    #[error("audio stream does not declare a sample rate")]
    UnknownSampleRate,

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech service returned HTTP {status} for chunk {chunk}")]
    HttpStatus { status: u16, chunk: usize },

    #[error("unknown voice '{0}'")]
    UnknownVoice(String),

    #[error("no text to speak")]
    EmptyText,
}

/// Result alias for media operations.
pub type Result<T> = std::result::Result<T, MediaError>;
