//! Output that discards audio, for machines without a sound device.

use hx_engine::Frame;

use crate::traits::{AudioError, AudioOutput};

/// Swallows frames, reporting a fixed amount of room per write so the
/// caller's clock keeps moving.
#[derive(Clone, Debug)]
pub struct NullOutput {
    sample_rate: u32,
    block: usize,
    written: u64,
    running: bool,
}

impl NullOutput {
    pub fn new(sample_rate: u32, block: usize) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            block,
            written: 0,
            running: false,
        }
    }

    /// Total frames accepted since creation.
    pub fn frames_written(&self) -> u64 {
        self.written
    }
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn vacant(&self) -> usize {
        if self.running {
            self.block
        } else {
            0
        }
    }

    fn write(&mut self, frames: &[Frame]) -> usize {
        let n = frames.len().min(self.vacant());
        self.written += n as u64;
        n
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running = false;
        Ok(())
    }
}
