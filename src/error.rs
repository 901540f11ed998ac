//! Error types for configuration
//!
//! The simulation itself never fails: numeric trouble is skipped or clamped.
//! Only configuration can be rejected, before it reaches the particles.

use thiserror::Error;

/// Reasons a configuration snapshot is rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Particle count must be positive")]
    NonPositiveParticleCount,

    #[error("Invalid size range: min {min}, max {max} (need 0 < min <= max)")]
    InvalidSizeRange { min: f32, max: f32 },

    #[error("Invalid arena dimensions: {width} x {height}")]
    InvalidArena { width: f32, height: f32 },

    #[error("Arena {width} x {height} cannot contain particles with margin {margin}")]
    ArenaTooSmall { width: f32, height: f32, margin: f32 },

    #[error("Value out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
