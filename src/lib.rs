#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Formation Engine
//!
//! Animates a large set of small instanced objects that fly in from
//! off-screen, settle into positions that together reconstruct a picture,
//! and can later fly out again. Each instance follows its own noise-shaped
//! spline, starts after a spatially derived delay, and reacts to the pointer
//! while a damped wave ripples through the whole formation.
//!
//! ```rust,ignore
//! use formation::{FormationBuilder, FormationConfig, InstanceBuffer, PlaneProjector, PoissonDiskSampler};
//!
//! let config = FormationConfig::sphere();
//! let mut formation = FormationBuilder::new(config)
//!     .sampler(PoissonDiskSampler::new(config.seed))
//!     .pointer_projector(PlaneProjector::new(view_projection, viewport, 0.0))
//!     .build(InstanceBuffer::new())?;
//!
//! formation.animate_to(0.5);
//! // every frame:
//! formation.update(dt, elapsed);
//! upload(formation.sink().as_bytes());
//! ```

pub mod animation;
pub mod config;
pub mod curve;
pub mod deform;
pub mod errors;
pub mod formation;
pub mod pointer;
pub mod sampling;
pub mod sink;
pub mod utils;

pub use animation::{DelayMetric, DelayScheduler, DelayShaping, Phase, TransitionPolicy};
pub use config::FormationConfig;
pub use curve::{Curve, CurveBuilder, CurveSample, CurveShape};
pub use deform::{Blend, DeformationUpdater, WaveParams};
pub use errors::{FormationError, Result};
pub use formation::{Formation, FormationBuilder, Instance};
pub use pointer::{PlaneProjector, PointerHandle, PointerProjector};
pub use sampling::{FixedSampler, PointField, PointSampler, PoissonDiskSampler};
pub use sink::{InstanceBuffer, InstanceSink, InstanceTransform, MaterialProjector};
pub use utils::{Easing, FrameClock, GradientNoise, NoiseField};
