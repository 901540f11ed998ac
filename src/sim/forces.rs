//! Interaction-mode force laws
//!
//! Each mode is a [`ForceLaw`] returning the velocity delta for one particle
//! this tick. Pointer laws act within a radius of the pointer; pairwise laws
//! sum over every sibling in range. Coincident points are skipped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::{Particle, Siblings};
use crate::consts::*;
use crate::direction_and_distance;

/// Everything a force law may read this tick
#[derive(Debug, Clone, Copy)]
pub struct ForceContext<'a> {
    pub global_force: Vec2,
    pub dt_secs: f32,
    pub pointer: Option<Vec2>,
    pub speed_multiplier: f32,
    pub siblings: Siblings<'a>,
}

/// A velocity contribution computed from one particle's surroundings
pub trait ForceLaw {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2;
}

/// Uniform global field (gravity/wind)
#[derive(Debug, Clone, Copy, Default)]
pub struct Field;

impl ForceLaw for Field {
    fn apply(&self, _particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        ctx.global_force * FIELD_TIME_SCALE * ctx.dt_secs * ctx.speed_multiplier
    }
}

/// Swirl around the pointer
#[derive(Debug, Clone, Copy, Default)]
pub struct Vortex;

impl ForceLaw for Vortex {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        pointer_falloff(particle, ctx, VORTEX_RADIUS)
            .map(|(to_pointer, falloff)| {
                to_pointer.perp() * falloff * VORTEX_STRENGTH * ctx.speed_multiplier
            })
            .unwrap_or(Vec2::ZERO)
    }
}

/// Pull toward the pointer
#[derive(Debug, Clone, Copy, Default)]
pub struct Attract;

impl ForceLaw for Attract {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        pointer_falloff(particle, ctx, ATTRACT_RADIUS)
            .map(|(to_pointer, falloff)| {
                to_pointer * falloff * ATTRACT_STRENGTH * ctx.speed_multiplier
            })
            .unwrap_or(Vec2::ZERO)
    }
}

/// Push away from the pointer
#[derive(Debug, Clone, Copy, Default)]
pub struct Repel;

impl ForceLaw for Repel {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        pointer_falloff(particle, ctx, REPEL_RADIUS)
            .map(|(to_pointer, falloff)| {
                -to_pointer * falloff * REPEL_STRENGTH * ctx.speed_multiplier
            })
            .unwrap_or(Vec2::ZERO)
    }
}

/// Short-range flow between neighbours
#[derive(Debug, Clone, Copy, Default)]
pub struct Fluid;

impl ForceLaw for Fluid {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        neighbours_within(particle, ctx.siblings, FLUID_RADIUS)
            .map(|(dir, dist)| {
                dir * (1.0 - dist / FLUID_RADIUS) * ctx.speed_multiplier * FLUID_STRENGTH
            })
            .sum()
    }
}

/// Springs with a fixed rest length between neighbours
#[derive(Debug, Clone, Copy, Default)]
pub struct Springs;

impl ForceLaw for Springs {
    fn apply(&self, particle: &Particle, ctx: &ForceContext<'_>) -> Vec2 {
        neighbours_within(particle, ctx.siblings, SPRING_RADIUS)
            .map(|(dir, dist)| {
                dir * (dist - SPRING_REST_LENGTH) * SPRING_STIFFNESS * ctx.speed_multiplier
            })
            .sum()
    }
}

/// Vector to the pointer and the linear falloff `(R - d) / R`, if in range
fn pointer_falloff(particle: &Particle, ctx: &ForceContext<'_>, radius: f32) -> Option<(Vec2, f32)> {
    let pointer = ctx.pointer?;
    let (dir, dist) = direction_and_distance(particle.pos, pointer)?;
    (dist < radius).then(|| (dir * dist, (radius - dist) / radius))
}

/// Unit direction and distance to every sibling closer than `radius`
fn neighbours_within<'a>(
    particle: &'a Particle,
    siblings: Siblings<'a>,
    radius: f32,
) -> impl Iterator<Item = (Vec2, f32)> + 'a {
    siblings
        .iter()
        .filter_map(move |other| direction_and_distance(particle.pos, other.pos))
        .filter(move |&(_, dist)| dist < radius)
}

/// Selected force law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Field,
    Vortex,
    Attract,
    Repel,
    Fluid,
    Springs,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 6] = [
        InteractionMode::Field,
        InteractionMode::Vortex,
        InteractionMode::Attract,
        InteractionMode::Repel,
        InteractionMode::Fluid,
        InteractionMode::Springs,
    ];

    pub fn law(&self) -> &'static dyn ForceLaw {
        match self {
            InteractionMode::Field => &Field,
            InteractionMode::Vortex => &Vortex,
            InteractionMode::Attract => &Attract,
            InteractionMode::Repel => &Repel,
            InteractionMode::Fluid => &Fluid,
            InteractionMode::Springs => &Springs,
        }
    }

    /// Whether the law reads siblings (O(n²) per tick)
    pub fn is_pairwise(&self) -> bool {
        matches!(self, InteractionMode::Fluid | InteractionMode::Springs)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Field => "Field",
            InteractionMode::Vortex => "Vortex",
            InteractionMode::Attract => "Attract",
            InteractionMode::Repel => "Repel",
            InteractionMode::Fluid => "Fluid",
            InteractionMode::Springs => "Springs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "field" | "gravity" => Some(InteractionMode::Field),
            "vortex" => Some(InteractionMode::Vortex),
            "attract" => Some(InteractionMode::Attract),
            "repel" => Some(InteractionMode::Repel),
            "fluid" => Some(InteractionMode::Fluid),
            "springs" | "spring" => Some(InteractionMode::Springs),
            _ => None,
        }
    }
}
