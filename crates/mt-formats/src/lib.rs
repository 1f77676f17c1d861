//! File formats for microtracker.
//!
//! The song image is a fixed-size raw dump: tuning divisor, order list, then
//! every pattern cell. WAV output is 16-bit stereo PCM.

mod song_format;
mod wav_format;

use std::fmt;

pub use song_format::{
    load_song, load_song_into, save_song, song_from_bytes, song_to_bytes, SONG_IMAGE_SIZE,
};
pub use wav_format::{frames_to_wav, write_wav};

/// Error type for reading and writing files.
#[derive(Debug)]
pub enum FormatError {
    /// I/O error
    Io(std::io::Error),
    /// Song image shorter than the fixed size
    UnexpectedEof { expected: usize, actual: usize },
    /// Song image longer than the fixed size
    TrailingData { expected: usize, actual: usize },
    /// Field-level decode or encode failure
    Binary(binrw::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io(e) => write!(f, "I/O error: {}", e),
            FormatError::UnexpectedEof { expected, actual } => {
                write!(f, "Song image truncated: {} of {} bytes", actual, expected)
            }
            FormatError::TrailingData { expected, actual } => {
                write!(f, "Song image too long: {} bytes, expected {}", actual, expected)
            }
            FormatError::Binary(e) => write!(f, "Binary format error: {}", e),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io(e) => Some(e),
            FormatError::Binary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e)
    }
}

impl From<binrw::Error> for FormatError {
    fn from(e: binrw::Error) -> Self {
        FormatError::Binary(e)
    }
}
