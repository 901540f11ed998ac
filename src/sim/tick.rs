//! Simulation step
//!
//! Advances every particle once, in collection order, against a single
//! context built from this tick's input.

use glam::Vec2;

use super::particle::{StepContext, split_around};
use super::system::ParticleSystem;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Elapsed time since the previous tick (milliseconds)
    pub dt_ms: f32,
    /// Base gravity/wind
    pub global_force: Vec2,
    /// Pointer position in arena coordinates, if any
    pub pointer: Option<Vec2>,
}

/// Advance the system by one tick. Does nothing while the system is paused.
pub fn step(system: &mut ParticleSystem, input: &TickInput) {
    if !system.running {
        return;
    }

    let dt_secs = if input.dt_ms.is_finite() {
        (input.dt_ms * 0.001).clamp(0.0, MAX_STEP_SECS)
    } else {
        0.0
    };
    // Non-finite input is dropped rather than fed into the particles
    let pointer = input.pointer.filter(|p| p.is_finite());
    let global_force = if input.global_force.is_finite() {
        input.global_force
    } else {
        Vec2::ZERO
    };
    if pointer != input.pointer || global_force != input.global_force {
        log::warn!(
            "Ignoring non-finite tick input: force {:?}, pointer {:?}",
            input.global_force,
            input.pointer
        );
    }

    let arena = system.arena();
    let config = &system.config;
    let ctx = StepContext {
        global_force: effective_global_force(global_force, pointer, arena, config.pointer_gravity),
        dt_secs,
        pointer,
        mode: config.interaction_mode,
        speed_multiplier: config.speed_multiplier,
        arena,
        boundary: config.boundary,
        resolution: config.collision_resolution,
        color_mode: config.color_mode,
    };

    for i in 0..system.particles.len() {
        if let Some((particle, mut siblings)) = split_around(&mut system.particles, i) {
            particle.integrate(&ctx, &mut siblings);
        }
    }

    system.time_ticks += 1;
    if system.time_ticks.is_multiple_of(600) {
        log::debug!(
            "Tick {}: {} particles, mode {}{}",
            system.time_ticks,
            system.particles.len(),
            ctx.mode.as_str(),
            if ctx.mode.is_pairwise() { " (pairwise)" } else { "" }
        );
    }
}

/// Global force plus the pointer bias: the pointer's offset from the arena
/// center pulls the field toward it.
pub fn effective_global_force(
    base: Vec2,
    pointer: Option<Vec2>,
    arena: Vec2,
    pointer_gravity: f32,
) -> Vec2 {
    match pointer {
        Some(pointer) if pointer_gravity > 0.0 => {
            base + (pointer - arena * 0.5) * POINTER_GRAVITY_SCALE * pointer_gravity
        }
        _ => base,
    }
}

/// Map device tilt (degrees) to a global force
pub fn orientation_force(beta: f32, gamma: f32) -> Vec2 {
    Vec2::new(gamma, beta) * ORIENTATION_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoundaryPolicy, CollisionResolution, SimConfig};
    use crate::sim::InteractionMode;

    fn quiet_config(count: usize) -> SimConfig {
        SimConfig {
            particle_count: count,
            pointer_gravity: 0.0,
            seed: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_paused_system_does_not_move() {
        let mut system = ParticleSystem::new(quiet_config(10)).unwrap();
        let before: Vec<Vec2> = system.particles().iter().map(|p| p.pos).collect();

        system.set_running(false);
        step(
            &mut system,
            &TickInput {
                dt_ms: 16.0,
                global_force: Vec2::new(0.0, 5.0),
                pointer: None,
            },
        );

        let after: Vec<Vec2> = system.particles().iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
        assert_eq!(system.time_ticks(), 0);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut system = ParticleSystem::new(quiet_config(1)).unwrap();
        system.particles[0].pos = Vec2::new(400.0, 100.0);
        system.particles[0].vel = Vec2::ZERO;

        system.set_global_force(Vec2::new(0.0, 1.0));
        for _ in 0..10 {
            system.step(16.0);
        }
        assert!(system.particles()[0].pos.y > 100.0);
        assert!(system.particles()[0].vel.y > 0.0);
        assert_eq!(system.time_ticks(), 10);
    }

    #[test]
    fn test_long_frame_gap_is_clamped() {
        let mut system = ParticleSystem::new(quiet_config(1)).unwrap();
        system.particles[0].pos = Vec2::new(400.0, 100.0);
        system.particles[0].vel = Vec2::ZERO;
        system.particles[0].friction = 1.0;

        system.set_global_force(Vec2::new(0.0, 1.0));
        system.step(5000.0);
        // 1.0 * 30 * 0.1
        assert!((system.particles()[0].vel.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_bias() {
        let arena = Vec2::new(800.0, 600.0);
        let base = Vec2::new(0.0, 1.0);

        assert_eq!(effective_global_force(base, None, arena, 2.0), base);
        assert_eq!(
            effective_global_force(base, Some(Vec2::new(500.0, 300.0)), arena, 0.0),
            base
        );
        let biased = effective_global_force(base, Some(Vec2::new(500.0, 300.0)), arena, 2.0);
        assert!((biased - Vec2::new(2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_orientation_force() {
        let f = orientation_force(30.0, -10.0);
        assert!((f - Vec2::new(-1.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_attract_mode_gathers_toward_pointer() {
        let mut system = ParticleSystem::new(SimConfig {
            interaction_mode: InteractionMode::Attract,
            ..quiet_config(1)
        })
        .unwrap();
        system.particles[0].pos = Vec2::new(300.0, 300.0);
        system.particles[0].vel = Vec2::ZERO;
        system.set_pointer(Some(Vec2::new(400.0, 300.0)));

        system.step(16.0);
        assert!(system.particles()[0].vel.x > 0.0);
    }

    fn head_on_pair(resolution: CollisionResolution) -> ParticleSystem {
        let mut system = ParticleSystem::new(SimConfig {
            size_min: 5.0,
            size_max: 5.0,
            restitution: 1.0,
            friction: 1.0,
            collision_resolution: resolution,
            ..quiet_config(2)
        })
        .unwrap();
        system.particles[0].pos = Vec2::new(391.0, 300.0);
        system.particles[0].vel = Vec2::new(2.0, 0.0);
        system.particles[1].pos = Vec2::new(409.0, 300.0);
        system.particles[1].vel = Vec2::new(-2.0, 0.0);
        system
    }

    #[test]
    fn test_head_on_collision_in_step() {
        for resolution in [CollisionResolution::PerParticle, CollisionResolution::PerPairOnce] {
            let mut system = head_on_pair(resolution);
            for _ in 0..5 {
                system.step(16.0);
            }
            let (a, b) = (&system.particles()[0], &system.particles()[1]);
            // They met and bounced apart
            assert!(a.vel.x < 0.0, "{resolution:?}");
            assert!(b.vel.x > 0.0, "{resolution:?}");
            assert!(b.pos.x - a.pos.x >= 10.0 - 1e-3);
        }
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut system = ParticleSystem::new(quiet_config(5)).unwrap();
        system.set_pointer(Some(Vec2::new(f32::NAN, 0.0)));
        system.step(16.0);

        system.set_interaction_mode(InteractionMode::Attract);
        system.set_pointer(Some(Vec2::new(400.0, f32::INFINITY)));
        system.step(16.0);

        system.set_interaction_mode(InteractionMode::Field);
        system.set_pointer(None);
        system.set_global_force(Vec2::new(f32::NAN, 1.0));
        system.step(16.0);

        for p in system.particles() {
            assert!(p.pos.is_finite() && p.vel.is_finite());
        }
        assert_eq!(system.time_ticks(), 3);
    }

    #[test]
    fn test_nan_force_contributes_nothing() {
        let mut system = ParticleSystem::new(quiet_config(1)).unwrap();
        system.particles[0].pos = Vec2::new(400.0, 300.0);
        system.particles[0].vel = Vec2::ZERO;
        system.set_global_force(Vec2::new(f32::NAN, f32::NAN));

        system.step(16.0);
        assert_eq!(system.particles()[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_resolution_modes_differ_within_a_tick() {
        let run = |resolution| {
            let mut system = ParticleSystem::new(SimConfig {
                size_min: 5.0,
                size_max: 5.0,
                restitution: 1.0,
                friction: 1.0,
                collision_resolution: resolution,
                ..quiet_config(2)
            })
            .unwrap();
            system.particles[0].pos = Vec2::new(400.0, 300.0);
            system.particles[0].vel = Vec2::ZERO;
            system.particles[1].pos = Vec2::new(415.0, 300.0);
            system.particles[1].vel = Vec2::new(-8.0, 0.0);
            system.step(16.0);
            (system.particles()[0].vel, system.particles()[1].vel)
        };

        // Particle 1 moves into particle 0 during its own update; only the
        // per-particle mode lets it resolve against an earlier sibling.
        let (v0, v1) = run(CollisionResolution::PerParticle);
        assert!((v0 - Vec2::new(-8.0, 0.0)).length() < 1e-4);
        assert!(v1.length() < 1e-4);

        let (v0, v1) = run(CollisionResolution::PerPairOnce);
        assert_eq!(v0, Vec2::ZERO);
        assert!((v1 - Vec2::new(-8.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_wrap_policy_snaps_trail() {
        let mut system = ParticleSystem::new(SimConfig {
            boundary: BoundaryPolicy::Wrap,
            ..quiet_config(1)
        })
        .unwrap();
        system.particles[0].pos = Vec2::new(798.0, 300.0);
        system.particles[0].vel = Vec2::new(5.0, 0.0);

        system.step(16.0);
        let p = &system.particles()[0];
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.prev_pos, p.pos);
    }
}
