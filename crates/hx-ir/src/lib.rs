//! Core data types for the hexaphonic spatial cue player.
//!
//! This crate defines the static description of a listening experience:
//! where the virtual speakers sit, which gain patterns exist, and when each
//! pattern becomes active. The runtime engine consumes these types and never
//! mutates the schedule.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;
mod orientation;
mod pattern;
mod ramp;
mod routing;
pub mod schedule;
mod speaker;
mod vec3;

pub use error::ConfigError;
pub use orientation::{wrap_degrees, Orientation};
pub use pattern::{Pattern, MAX_SPEAKERS};
pub use ramp::{interpolate, RampCurve, TransitionRamp};
pub use routing::GainRouting;
pub use schedule::{Cue, Schedule};
pub use speaker::{SpeakerLayout, SpeakerSlot};
pub use vec3::Vec3;
