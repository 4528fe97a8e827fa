//! Runtime core for hexaphonic.
//!
//! Resolves the active gain pattern from the playback clock, routes gain
//! ramps to the spatializer, integrates listener rotation input, and
//! publishes one consistent snapshot per frame for renderers.
//!
//! Everything here runs on a single cooperative loop. Two drivers call in:
//! the media time-update callback (`Session::on_time_update`) and the
//! animation frame callback (`Session::animation_frame`); input handlers call
//! `Session::apply_input`. Each handler fully updates state before returning.

mod clock;
mod config;
mod frame;
mod graph;
pub mod orientation;
mod panner;
mod program;
pub mod scheduler;
mod session;
mod snapshot;
mod spatializer;

pub use clock::{MediaClock, SampleClock, TimeUpdateTimer};
pub use config::EngineConfig;
pub use frame::Frame;
pub use graph::SpatialGraph;
pub use orientation::{DragState, InputEvent, JoystickState, OrientationController, RotateKey};
pub use panner::PannerBank;
pub use program::{Program, ProgramBuffer, ProgramSource, TestTone, Waveform};
pub use scheduler::{PatternScheduler, TimeUpdate};
pub use session::Session;
pub use snapshot::{FrameSnapshot, SceneTransforms, SnapshotView, SpeakerTransform, VisualSync};
pub use spatializer::{ListenerPose, Spatializer};
