//! Particle state and per-tick integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boundary;
use super::collision::resolve_pair;
use super::forces::{ForceContext, InteractionMode};
use crate::color::{ColorMode, Hsl, kinetic_color};
use crate::config::{BoundaryPolicy, CollisionResolution};
use crate::consts::MASS_PER_SIZE;

/// Particle outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Circle, Shape::Square, Shape::Triangle];

    /// Multiplier from size to collision/boundary radius
    #[inline]
    pub fn factor(&self) -> f32 {
        match self {
            Shape::Circle => 1.0,
            Shape::Square => std::f32::consts::SQRT_2,
            Shape::Triangle => 1.5,
        }
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        *self == Shape::Circle
    }
}

/// A simulated particle
///
/// Serialized for snapshots only; particles are created by the system so
/// that size (and with it mass) is always positive.
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Position before the last move (trail start for rendering)
    pub prev_pos: Vec2,
    pub vel: Vec2,
    /// Radians
    pub rotation: f32,
    /// Radians per tick (only applied to non-circular shapes)
    pub rotation_speed: f32,
    pub shape: Shape,
    pub color: Hsl,
    /// Velocity retained per tick
    pub friction: f32,
    /// Restitution for collisions and wall bounces
    pub restitution: f32,
    /// Base speed limit before the speed multiplier
    pub speed_limit: f32,
    /// Seconds since spawn/reset
    pub age: f32,
    /// Pulsing intensity in [0, 1]
    pub life: f32,
    size: f32,
}

impl Particle {
    pub fn new(pos: Vec2, size: f32, shape: Shape) -> Self {
        debug_assert!(size > 0.0, "particle size must be positive");
        Self {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            shape,
            color: Hsl::default(),
            friction: 0.99,
            restitution: 0.6,
            speed_limit: 15.0,
            age: 0.0,
            life: 1.0,
            size: size.max(f32::EPSILON),
        }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Mass is always derived from size
    #[inline]
    pub fn mass(&self) -> f32 {
        self.size * MASS_PER_SIZE
    }

    /// Size scaled by the shape factor
    #[inline]
    pub fn effective_radius(&self) -> f32 {
        self.size * self.shape.factor()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Rescale velocity so its magnitude does not exceed `limit`
    pub fn limit_speed(&mut self, limit: f32) {
        let speed = self.speed();
        if speed > limit && speed > 0.0 {
            self.vel *= limit / speed;
        }
    }

    /// Put the particle back to rest at `pos`
    pub fn reset_at(&mut self, pos: Vec2, vel: Vec2) {
        self.pos = pos;
        self.prev_pos = pos;
        self.vel = vel;
        self.rotation = 0.0;
        self.age = 0.0;
        self.life = 1.0;
    }

    /// Advance this particle one tick.
    ///
    /// Applies the interaction-mode force, friction and the speed limit,
    /// moves, spins, resolves collisions against `siblings` and applies the
    /// boundary policy. Siblings touched by a collision are re-limited and
    /// re-contained as well.
    pub fn integrate(&mut self, ctx: &StepContext, siblings: &mut SiblingsMut<'_>) {
        let limit = self.speed_limit * ctx.speed_multiplier;

        let delta = {
            let force_ctx = ForceContext {
                global_force: ctx.global_force,
                dt_secs: ctx.dt_secs,
                pointer: ctx.pointer,
                speed_multiplier: ctx.speed_multiplier,
                siblings: siblings.as_shared(),
            };
            ctx.mode.law().apply(self, &force_ctx)
        };
        self.vel += delta;
        self.vel *= self.friction;
        self.limit_speed(limit);

        self.prev_pos = self.pos;
        self.pos += self.vel;

        if !self.shape.is_circle() {
            self.rotation += self.rotation_speed;
        }

        for other in siblings.collision_targets(ctx.resolution) {
            if resolve_pair(self, other) {
                other.limit_speed(other.speed_limit * ctx.speed_multiplier);
                boundary::apply(other, ctx.boundary, ctx.arena);
            }
        }
        self.limit_speed(limit);

        boundary::apply(self, ctx.boundary, ctx.arena);

        if ctx.color_mode == ColorMode::Kinetic {
            self.color = kinetic_color(self.speed(), limit);
        }

        self.age += ctx.dt_secs;
        self.life = self.age.sin() * 0.5 + 0.5;

        self.repair_non_finite();
    }

    /// Zero out NaN/Infinity kinematics
    fn repair_non_finite(&mut self) {
        let finite = self.pos.is_finite() && self.vel.is_finite() && self.rotation_speed.is_finite();
        debug_assert!(finite, "non-finite particle state: {self:?}");
        if !finite {
            log::warn!("Repairing non-finite particle state at {:?}", self.prev_pos);
            if !self.vel.is_finite() {
                self.vel = Vec2::ZERO;
            }
            if !self.pos.is_finite() {
                self.pos = if self.prev_pos.is_finite() {
                    self.prev_pos
                } else {
                    Vec2::ZERO
                };
                self.prev_pos = self.pos;
            }
            if !self.rotation_speed.is_finite() {
                self.rotation_speed = 0.0;
            }
        }
    }
}

/// Per-tick inputs shared by every particle
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub global_force: Vec2,
    pub dt_secs: f32,
    pub pointer: Option<Vec2>,
    pub mode: InteractionMode,
    pub speed_multiplier: f32,
    pub arena: Vec2,
    pub boundary: BoundaryPolicy,
    pub resolution: CollisionResolution,
    pub color_mode: ColorMode,
}

impl Default for StepContext {
    fn default() -> Self {
        Self {
            global_force: Vec2::ZERO,
            dt_secs: 1.0 / 60.0,
            pointer: None,
            mode: InteractionMode::Field,
            speed_multiplier: 1.0,
            arena: Vec2::new(800.0, 600.0),
            boundary: BoundaryPolicy::Clamp,
            resolution: CollisionResolution::PerParticle,
            color_mode: ColorMode::Gradient,
        }
    }
}

/// Read-only view of every other particle in the system
#[derive(Debug, Clone, Copy)]
pub struct Siblings<'a> {
    before: &'a [Particle],
    after: &'a [Particle],
}

impl<'a> Siblings<'a> {
    pub fn new(before: &'a [Particle], after: &'a [Particle]) -> Self {
        Self { before, after }
    }

    pub fn empty() -> Self {
        Self {
            before: &[],
            after: &[],
        }
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Particle> {
        self.before.iter().chain(self.after.iter())
    }
}

/// Mutable view of every other particle, used for collision exchange
#[derive(Debug)]
pub struct SiblingsMut<'a> {
    before: &'a mut [Particle],
    after: &'a mut [Particle],
}

impl<'a> SiblingsMut<'a> {
    pub fn new(before: &'a mut [Particle], after: &'a mut [Particle]) -> Self {
        Self { before, after }
    }

    pub fn as_shared(&self) -> Siblings<'_> {
        Siblings::new(self.before, self.after)
    }

    /// Siblings this particle resolves collisions against.
    ///
    /// Per-pair resolution only looks forward so each pair is handled once.
    pub fn collision_targets(
        &mut self,
        resolution: CollisionResolution,
    ) -> impl Iterator<Item = &mut Particle> {
        let take_before = match resolution {
            CollisionResolution::PerParticle => self.before.len(),
            CollisionResolution::PerPairOnce => 0,
        };
        self.before
            .iter_mut()
            .take(take_before)
            .chain(self.after.iter_mut())
    }
}

/// Split `particles` into the one at `index` and everything else
pub fn split_around(
    particles: &mut [Particle],
    index: usize,
) -> Option<(&mut Particle, SiblingsMut<'_>)> {
    if index >= particles.len() {
        return None;
    }
    let (before, rest) = particles.split_at_mut(index);
    let (current, after) = rest.split_first_mut()?;
    Some((current, SiblingsMut::new(before, after)))
}
