//! Utility Module
//!
//! This module provides the small math collaborators the engine builds on:
//!
//! - [`Easing`]: monotonic easing maps used by the curve envelopes
//! - [`NoiseField`]: deterministic scalar noise, with [`GradientNoise`] as default
//! - [`FrameClock`]: wall-clock or fixed-step frame timing for drivers

pub mod easing;
pub mod noise;
pub mod time;

pub use easing::Easing;
pub use noise::{FlatNoise, GradientNoise, NoiseField, NoiseKind};
pub use time::FrameClock;
