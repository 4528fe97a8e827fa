//! File formats for hexaphonic.
//!
//! Parses TOML show files into a validated schedule, layout and engine
//! configuration, and reads/writes the PCM WAV files used for the program
//! track and offline renders.

mod show;
mod wav_format;

pub use show::{load_show, parse_show, Show, ShowFile};
pub use wav_format::{frames_to_wav, load_wav, write_wav};

use hx_ir::ConfigError;
use thiserror::Error;

/// Error type for format parsing.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid file header")]
    InvalidHeader,
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("unsupported format: {0}")]
    Unsupported(&'static str),
    #[error("show file syntax: {0}")]
    Syntax(#[from] toml::de::Error),
    #[error("show file: {0}")]
    InvalidShow(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
