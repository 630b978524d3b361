//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`FormationError`] covers the integration-time failure
//! modes of the engine:
//! - Invalid configuration values rejected at construction
//! - Missing collaborators (sampler, pointer projector)
//! - Configuration loading errors (I/O, JSON)
//!
//! Nothing in the per-frame path returns an error. Once a [`Formation`]
//! has been built, `update` cannot fail.
//!
//! # Usage
//!
//! ```rust,ignore
//! use formation::errors::{FormationError, Result};
//!
//! fn load() -> Result<FormationConfig> {
//!     FormationConfig::from_json_file("formation.json")
//! }
//! ```
//!
//! [`Formation`]: crate::formation::Formation

use thiserror::Error;

/// The main error type for the formation engine.
#[derive(Error, Debug)]
pub enum FormationError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Curves need an exact center vertex, so the count must be odd.
    #[error("Curve vertex count must be odd and at least 3, got {0}")]
    InvalidVertexCount(usize),

    /// Transition duration must be strictly positive.
    #[error("Animation duration must be positive, got {0}")]
    NonPositiveDuration(f32),

    /// Pointer displacement radius must not be negative.
    #[error("Displacement radius must not be negative, got {0}")]
    NegativeRadius(f32),

    /// Any other rejected configuration value.
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    // ========================================================================
    // Wiring Errors
    // ========================================================================
    /// A required collaborator was not supplied to the builder.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    // ========================================================================
    // Loading Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl FormationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FormationError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Alias for `Result<T, FormationError>`.
pub type Result<T> = std::result::Result<T, FormationError>;
