//! Pairwise collision detection and response
//!
//! Particles collide as discs whose radius is the size scaled by the shape
//! factor. Response is a 1D elastic collision along the line of centers:
//! rotate both velocities into the collision frame, exchange the normal
//! components by momentum, scale each by its own restitution and rotate back.

use glam::Vec2;

use super::particle::Particle;
use crate::consts::ROTATION_TRANSFER;
use crate::{direction_and_distance, rotate_into, rotate_out_of};

/// Contact between two particles
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit vector from `a` toward `b`
    pub normal: Vec2,
    pub distance: f32,
    /// How far the effective radii overlap
    pub penetration: f32,
}

/// Check whether `a` and `b` overlap.
///
/// Coincident centers are not a contact: there is no line of centers to
/// resolve along.
pub fn detect(a: &Particle, b: &Particle) -> Option<Contact> {
    let (normal, distance) = direction_and_distance(a.pos, b.pos)?;
    let reach = a.effective_radius() + b.effective_radius();
    (distance < reach).then_some(Contact {
        normal,
        distance,
        penetration: reach - distance,
    })
}

/// Normal velocities after a 1D elastic collision of masses `m1`, `m2`
#[inline]
pub fn elastic_1d(v1: f32, v2: f32, m1: f32, m2: f32) -> (f32, f32) {
    let total = m1 + m2;
    (
        ((m1 - m2) * v1 + 2.0 * m2 * v2) / total,
        ((m2 - m1) * v2 + 2.0 * m1 * v1) / total,
    )
}

/// Resolve a collision between `a` and `b` if they overlap.
///
/// Mutates both velocities and positions (the overlap is split equally).
/// When either particle is non-circular their spins are blended to the
/// average plus/minus a fixed differential; this is a stylistic effect,
/// not derived from the impact. Returns whether a collision happened.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    let Some(contact) = detect(a, b) else {
        return false;
    };

    let (sin, cos) = (contact.normal.y, contact.normal.x);

    let va = rotate_into(a.vel, sin, cos);
    let vb = rotate_into(b.vel, sin, cos);
    let (na, nb) = elastic_1d(va.x, vb.x, a.mass(), b.mass());

    a.vel = rotate_out_of(Vec2::new(na * a.restitution, va.y), sin, cos);
    b.vel = rotate_out_of(Vec2::new(nb * b.restitution, vb.y), sin, cos);

    let push = contact.normal * (contact.penetration * 0.5);
    a.pos -= push;
    b.pos += push;

    if !a.shape.is_circle() || !b.shape.is_circle() {
        let avg = (a.rotation_speed + b.rotation_speed) * 0.5;
        a.rotation_speed = avg * (1.0 + ROTATION_TRANSFER);
        b.rotation_speed = avg * (1.0 - ROTATION_TRANSFER);
    }

    true
}
