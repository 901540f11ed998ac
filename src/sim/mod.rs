//! Simulation core
//!
//! Pure in-memory physics, single-threaded and frame-driven:
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering, input or platform dependencies

pub mod boundary;
pub mod collision;
pub mod forces;
pub mod particle;
pub mod system;
pub mod tick;

pub use collision::{Contact, detect, elastic_1d, resolve_pair};
pub use forces::{
    Attract, Field, Fluid, ForceContext, ForceLaw, InteractionMode, Repel, Springs, Vortex,
};
pub use particle::{Particle, Shape, Siblings, SiblingsMut, StepContext, split_around};
pub use system::{ParticleSystem, explosion_impulse};
pub use tick::{TickInput, effective_global_force, orientation_force, step};
