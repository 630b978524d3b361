//! Transition scheduling.
//!
//! - [`delay`]: per-instance start offsets derived from the sample layout
//! - [`state`]: per-instance progress and the transition state machine

pub mod delay;
pub mod state;

pub use delay::{DelayConfig, DelayMetric, DelayScheduler, DelayShaping};
pub use state::{AnimationState, Phase, Sweep, Transition, TransitionKind, TransitionPolicy};
