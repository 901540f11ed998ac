//! Arena edge handling

use glam::Vec2;

use super::particle::Particle;
use crate::config::BoundaryPolicy;
use crate::consts::WALL_SPIN_DAMPING;

/// Apply `policy` to keep `p` inside an arena of size `arena`.
///
/// Returns whether the particle touched an edge.
pub fn apply(p: &mut Particle, policy: BoundaryPolicy, arena: Vec2) -> bool {
    match policy {
        BoundaryPolicy::Wrap => wrap(p, arena),
        BoundaryPolicy::Clamp => clamp_and_bounce(p, arena),
    }
}

/// Teleport across edges; the trail start is snapped so no segment
/// is drawn across the arena.
pub fn wrap(p: &mut Particle, arena: Vec2) -> bool {
    let mut wrapped = false;

    if p.pos.x < 0.0 {
        p.pos.x = arena.x;
        wrapped = true;
    } else if p.pos.x > arena.x {
        p.pos.x = 0.0;
        wrapped = true;
    }

    if p.pos.y < 0.0 {
        p.pos.y = arena.y;
        wrapped = true;
    } else if p.pos.y > arena.y {
        p.pos.y = 0.0;
        wrapped = true;
    }

    if wrapped {
        p.prev_pos = p.pos;
    }
    wrapped
}

/// Clamp to `[margin, dimension - margin]` and bounce off the crossed edge
pub fn clamp_and_bounce(p: &mut Particle, arena: Vec2) -> bool {
    let margin = p.effective_radius();
    let mut hit = false;

    if p.pos.x < margin {
        p.pos.x = margin;
        p.vel.x = p.vel.x.abs() * p.restitution;
        hit = true;
    } else if p.pos.x > arena.x - margin {
        p.pos.x = arena.x - margin;
        p.vel.x = -p.vel.x.abs() * p.restitution;
        hit = true;
    }

    if p.pos.y < margin {
        p.pos.y = margin;
        p.vel.y = p.vel.y.abs() * p.restitution;
        hit = true;
    } else if p.pos.y > arena.y - margin {
        p.pos.y = arena.y - margin;
        p.vel.y = -p.vel.y.abs() * p.restitution;
        hit = true;
    }

    if hit {
        p.rotation_speed *= WALL_SPIN_DAMPING;
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Shape;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_wrap_right_edge() {
        let mut p = Particle::new(Vec2::new(805.0, 300.0), 3.0, Shape::Circle);
        p.prev_pos = Vec2::new(795.0, 300.0);
        assert!(wrap(&mut p, ARENA));
        assert_eq!(p.pos, Vec2::new(0.0, 300.0));
        assert_eq!(p.prev_pos, p.pos);
    }

    #[test]
    fn test_wrap_top_edge() {
        let mut p = Particle::new(Vec2::new(400.0, -2.0), 3.0, Shape::Circle);
        assert!(wrap(&mut p, ARENA));
        assert_eq!(p.pos.y, 600.0);
        assert_eq!(p.prev_pos, p.pos);
    }

    #[test]
    fn test_wrap_inside_is_noop() {
        let mut p = Particle::new(Vec2::new(400.0, 300.0), 3.0, Shape::Circle);
        p.prev_pos = Vec2::new(390.0, 300.0);
        assert!(!wrap(&mut p, ARENA));
        assert_eq!(p.prev_pos, Vec2::new(390.0, 300.0));
    }

    #[test]
    fn test_clamp_bounces_with_restitution() {
        let mut p = Particle::new(Vec2::new(-5.0, 300.0), 4.0, Shape::Circle);
        p.vel = Vec2::new(-10.0, 2.0);
        p.restitution = 0.5;
        p.rotation_speed = 1.0;

        assert!(clamp_and_bounce(&mut p, ARENA));
        assert_eq!(p.pos.x, 4.0);
        assert!((p.vel.x - 5.0).abs() < 1e-6);
        assert_eq!(p.vel.y, 2.0);
        assert!((p.rotation_speed - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_uses_shape_margin() {
        let mut p = Particle::new(Vec2::new(799.0, 599.0), 4.0, Shape::Triangle);
        p.vel = Vec2::new(3.0, 3.0);
        assert!(clamp_and_bounce(&mut p, ARENA));
        assert_eq!(p.pos, Vec2::new(794.0, 594.0));
        assert!(p.vel.x < 0.0 && p.vel.y < 0.0);
    }

    #[test]
    fn test_clamp_inside_keeps_spin() {
        let mut p = Particle::new(Vec2::new(400.0, 300.0), 4.0, Shape::Square);
        p.rotation_speed = 0.3;
        assert!(!apply(&mut p, BoundaryPolicy::Clamp, ARENA));
        assert_eq!(p.rotation_speed, 0.3);
    }
}
