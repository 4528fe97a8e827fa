//! The program feed: the mono track every speaker plays.

use std::f64::consts::TAU;

/// Anything that can produce the program signal at a media time.
pub trait ProgramSource {
    /// Mono sample at `time` seconds; silence outside the program.
    fn sample_at(&self, time: f64) -> f32;
    /// Length in seconds, if the source is finite.
    fn duration(&self) -> Option<f64>;
}

/// A decoded track held in memory, resampled on read.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl ProgramBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Downmix interleaved frames of `channels` samples to mono.
    pub fn from_interleaved(data: &[f32], channels: usize, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let samples = data
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl ProgramSource for ProgramBuffer {
    fn sample_at(&self, time: f64) -> f32 {
        if time.is_nan() || time < 0.0 {
            return 0.0;
        }
        let pos = time * self.sample_rate as f64;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let Some(&a) = self.samples.get(idx) else {
            return 0.0;
        };
        let b = self.samples.get(idx + 1).copied().unwrap_or(0.0);
        a + (b - a) * frac
    }

    fn duration(&self) -> Option<f64> {
        Some(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Pulsed sine used when no track could be loaded, so the spatial movement
/// is still audible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestTone {
    pub frequency: f64,
    pub amplitude: f32,
    /// Pulses per second.
    pub pulse_rate: f64,
    pub length: f64,
}

impl TestTone {
    pub fn new(length: f64) -> Self {
        Self {
            frequency: 440.0,
            amplitude: 0.25,
            pulse_rate: 2.0,
            length: length.max(0.0),
        }
    }
}

impl ProgramSource for TestTone {
    fn sample_at(&self, time: f64) -> f32 {
        if !(0.0..self.length).contains(&time) {
            return 0.0;
        }
        // Raised-cosine envelope per pulse avoids clicks at pulse edges.
        let phase = (time * self.pulse_rate).fract();
        let env = 0.5 - 0.5 * (phase * TAU).cos();
        (self.amplitude as f64 * env * (time * self.frequency * TAU).sin()) as f32
    }

    fn duration(&self) -> Option<f64> {
        Some(self.length)
    }
}

/// The program a session plays.
#[derive(Clone, Debug, PartialEq)]
pub enum Program {
    Buffer(ProgramBuffer),
    Tone(TestTone),
}

impl ProgramSource for Program {
    fn sample_at(&self, time: f64) -> f32 {
        match self {
            Program::Buffer(b) => b.sample_at(time),
            Program::Tone(t) => t.sample_at(time),
        }
    }

    fn duration(&self) -> Option<f64> {
        match self {
            Program::Buffer(b) => b.duration(),
            Program::Tone(t) => t.duration(),
        }
    }
}

/// Min/max peaks of the program, one pair per bucket, for the lane view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveform {
    peaks: Vec<(f32, f32)>,
    duration: f64,
}

/// Reads per bucket when scanning a program.
const READS_PER_BUCKET: usize = 64;

impl Waveform {
    pub fn from_program(program: &impl ProgramSource, buckets: usize) -> Self {
        let duration = program.duration().unwrap_or(0.0);
        if buckets == 0 || duration <= 0.0 {
            return Self::default();
        }
        let bucket_len = duration / buckets as f64;
        let peaks = (0..buckets)
            .map(|b| {
                let start = b as f64 * bucket_len;
                (0..READS_PER_BUCKET).fold((0.0f32, 0.0f32), |(lo, hi), p| {
                    let s = program.sample_at(start + bucket_len * p as f64 / READS_PER_BUCKET as f64);
                    (lo.min(s), hi.max(s))
                })
            })
            .collect();
        Self { peaks, duration }
    }

    pub fn peaks(&self) -> &[(f32, f32)] {
        &self.peaks
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Bucket covering media time `time`.
    pub fn bucket_at(&self, time: f64) -> Option<usize> {
        if self.peaks.is_empty() || !(0.0..self.duration).contains(&time) {
            return None;
        }
        Some(((time / self.duration) * self.peaks.len() as f64) as usize)
    }
}
