//! Particle Arena - a 2D particle playground
//!
//! Core modules:
//! - `sim`: Simulation core (integration, force laws, collisions, boundaries)
//! - `config`: Configuration snapshot and validation
//! - `color`: Color generation for particles
//! - `error`: Configuration errors
//!
//! Rendering, input capture and frame scheduling live outside this crate.
//! The core consumes a time step, a global force and a pointer position, and
//! produces updated particle state for a renderer to read.

pub mod color;
pub mod config;
pub mod error;
pub mod sim;

pub use color::{ColorMode, Hsl};
pub use config::{BoundaryPolicy, CollisionResolution, ShapeMode, SimConfig, SizeDistribution};
pub use error::ConfigError;
pub use sim::{InteractionMode, Particle, ParticleSystem, Shape, TickInput};

use glam::Vec2;

/// Simulation tuning constants
pub mod consts {
    /// Fixed frame timestep used by the headless driver (60 Hz)
    pub const FRAME_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest elapsed time a single step will integrate (seconds)
    pub const MAX_STEP_SECS: f32 = 0.1;

    /// Mass per unit of size
    pub const MASS_PER_SIZE: f32 = 0.1;

    /// Field mode: global force scale per second
    pub const FIELD_TIME_SCALE: f32 = 30.0;

    /// Vortex mode
    pub const VORTEX_RADIUS: f32 = 150.0;
    pub const VORTEX_STRENGTH: f32 = 0.05;
    /// Attract mode
    pub const ATTRACT_RADIUS: f32 = 200.0;
    pub const ATTRACT_STRENGTH: f32 = 0.02;
    /// Repel mode
    pub const REPEL_RADIUS: f32 = 150.0;
    pub const REPEL_STRENGTH: f32 = 0.05;
    /// Fluid mode (pairwise)
    pub const FLUID_RADIUS: f32 = 50.0;
    pub const FLUID_STRENGTH: f32 = 0.2;
    /// Springs mode (pairwise)
    pub const SPRING_RADIUS: f32 = 50.0;
    pub const SPRING_REST_LENGTH: f32 = 25.0;
    pub const SPRING_STIFFNESS: f32 = 0.03;

    /// Spin differential applied when a non-circular particle collides
    pub const ROTATION_TRANSFER: f32 = 0.2;
    /// Spin damping on wall contact
    pub const WALL_SPIN_DAMPING: f32 = 0.8;
    /// Initial rotation speed range (radians/tick, symmetric)
    pub const MAX_SPAWN_SPIN: f32 = 0.05;
    /// Initial velocity range (pixels/tick, symmetric per axis)
    pub const MAX_SPAWN_SPEED: f32 = 2.0;

    /// Explosion impulse per unit of configured force at the epicenter
    pub const EXPLOSION_SCALE: f32 = 20.0;
    /// Random jitter added per axis to explosion impulses
    pub const EXPLOSION_JITTER: f32 = 0.5;

    /// Pointer offset to global force scale
    pub const POINTER_GRAVITY_SCALE: f32 = 0.01;
    /// Device tilt (degrees) to global force scale
    pub const ORIENTATION_SCALE: f32 = 0.1;
}

/// Unit vector from `from` toward `to`, with the distance between them.
///
/// Returns `None` when the points coincide, so callers can skip the
/// contribution instead of producing NaN.
#[inline]
pub fn direction_and_distance(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let dist = delta.length();
    if dist > f32::EPSILON {
        Some((delta / dist, dist))
    } else {
        None
    }
}

/// Rotate a vector into a frame whose x-axis points along `angle`
#[inline]
pub fn rotate_into(v: Vec2, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(v.x * cos + v.y * sin, v.y * cos - v.x * sin)
}

/// Inverse of [`rotate_into`]
#[inline]
pub fn rotate_out_of(v: Vec2, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(v.x * cos - v.y * sin, v.y * cos + v.x * sin)
}
