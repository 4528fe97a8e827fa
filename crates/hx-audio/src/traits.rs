//! Audio output trait and error types.

use hx_engine::Frame;
use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
    #[error("no audio device available")]
    NoDevice,
}

/// Trait for audio output backends.
///
/// Writes never block: the caller asks how much room there is and renders
/// exactly that much, so all engine state stays on the caller's thread.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Frames that can be written right now without dropping any.
    fn vacant(&self) -> usize;

    /// Queue frames for playback. Returns how many were accepted.
    fn write(&mut self, frames: &[Frame]) -> usize;

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
