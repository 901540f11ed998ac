//! Particle collection ownership and commands
//!
//! The system owns every particle, the configuration snapshot and the RNG.
//! Configuration only changes between ticks through the setters below, each
//! of which validates before touching any state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::boundary;
use super::forces::InteractionMode;
use super::particle::{Particle, Shape};
use super::tick::{TickInput, step};
use crate::color::{ColorMode, spawn_color};
use crate::config::{
    BoundaryPolicy, CollisionResolution, ShapeMode, SimConfig, SizeDistribution, validate_arena,
};
use crate::consts::*;
use crate::error::ConfigError;

/// Owns the particles and drives the simulation
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pub(crate) particles: Vec<Particle>,
    pub(crate) config: SimConfig,
    pub(crate) running: bool,
    pub(crate) time_ticks: u64,
    global_force: Vec2,
    pointer: Option<Vec2>,
    rng: Pcg32,
}

impl ParticleSystem {
    /// Create a system and spawn `config.particle_count` particles
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut system = Self {
            particles: Vec::with_capacity(config.particle_count),
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            running: true,
            time_ticks: 0,
            global_force: Vec2::ZERO,
            pointer: None,
        };
        system.populate();
        Ok(system)
    }

    /// Read-only particle state for rendering
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn arena(&self) -> Vec2 {
        Vec2::new(self.config.width, self.config.height)
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn global_force(&self) -> Vec2 {
        self.global_force
    }

    /// Base gravity/wind used by [`ParticleSystem::step`]
    pub fn set_global_force(&mut self, force: Vec2) {
        self.global_force = force;
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Pointer position used by [`ParticleSystem::step`] (`None` when released)
    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    /// Advance one tick with the stored global force and pointer
    pub fn step(&mut self, dt_ms: f32) {
        let input = TickInput {
            dt_ms,
            global_force: self.global_force,
            pointer: self.pointer,
        };
        step(self, &input);
    }

    /// Replace the configuration and respawn every particle
    pub fn rebuild(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.seed != self.config.seed {
            self.rng = Pcg32::seed_from_u64(config.seed);
        }
        self.config = config;
        self.populate();
        Ok(())
    }

    pub fn set_particle_count(&mut self, count: usize) -> Result<(), ConfigError> {
        self.rebuild(SimConfig {
            particle_count: count,
            ..self.config.clone()
        })
    }

    pub fn set_size_distribution(
        &mut self,
        distribution: SizeDistribution,
        min: f32,
        max: f32,
    ) -> Result<(), ConfigError> {
        self.rebuild(SimConfig {
            size_distribution: distribution,
            size_min: min,
            size_max: max,
            ..self.config.clone()
        })
    }

    pub fn set_shape_mode(&mut self, shape_mode: ShapeMode) -> Result<(), ConfigError> {
        self.rebuild(SimConfig {
            shape_mode,
            ..self.config.clone()
        })
    }

    /// Recolors every particle from the new mode
    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.config.color_mode = color_mode;
        let arena = self.arena();
        for p in &mut self.particles {
            p.color = spawn_color(color_mode, p.pos, arena, &mut self.rng);
        }
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.config.interaction_mode = mode;
    }

    pub fn set_collision_resolution(&mut self, resolution: CollisionResolution) {
        self.config.collision_resolution = resolution;
    }

    pub fn set_speed_multiplier(&mut self, multiplier: f32) -> Result<(), ConfigError> {
        let config = SimConfig {
            speed_multiplier: multiplier,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_explosion_force(&mut self, force: f32) -> Result<(), ConfigError> {
        let config = SimConfig {
            explosion_force: force,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Switch boundary policy; particles are re-contained immediately
    pub fn set_boundary(&mut self, boundary: BoundaryPolicy) -> Result<(), ConfigError> {
        let config = SimConfig {
            boundary,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.contain_all();
        Ok(())
    }

    /// Change arena dimensions, keeping existing particles inside
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        validate_arena(width, height)?;
        let config = SimConfig {
            width,
            height,
            ..self.config.clone()
        };
        config.validate()?;
        log::info!(
            "Arena resized: {}x{} -> {}x{}",
            self.config.width,
            self.config.height,
            width,
            height
        );
        self.config = config;
        self.contain_all();
        Ok(())
    }

    /// Scatter every particle to a fresh random position and velocity.
    ///
    /// Count, sizes, shapes and colors are kept.
    pub fn reset(&mut self) {
        for p in &mut self.particles {
            scatter(p, &self.config, &mut self.rng);
        }
        self.time_ticks = 0;
        log::info!("Reset {} particles", self.particles.len());
    }

    /// Radial impulse away from `point`, fading linearly to zero at `radius`
    /// (configured explosion radius when `None`). Returns how many particles
    /// were pushed.
    pub fn explode_at_point(&mut self, point: Vec2, radius: Option<f32>) -> usize {
        let radius = radius.unwrap_or(self.config.explosion_radius);
        if !(radius > 0.0 && radius.is_finite()) {
            log::warn!("Ignoring explosion with radius {radius}");
            return 0;
        }
        if !point.is_finite() {
            log::warn!("Ignoring explosion at non-finite point {point:?}");
            return 0;
        }
        let force = self.config.explosion_force;

        let mut affected = 0;
        for p in &mut self.particles {
            let offset = p.pos - point;
            let dist = offset.length();
            if dist >= radius {
                continue;
            }
            let dir = if dist > f32::EPSILON {
                offset / dist
            } else {
                Vec2::from_angle(self.rng.random_range(0.0..std::f32::consts::TAU))
            };
            let jitter = Vec2::new(
                self.rng.random_range(-EXPLOSION_JITTER..=EXPLOSION_JITTER),
                self.rng.random_range(-EXPLOSION_JITTER..=EXPLOSION_JITTER),
            );
            p.vel += dir * explosion_impulse(dist, radius, force) + jitter;
            affected += 1;
        }

        log::info!(
            "Explosion at ({:.0}, {:.0}) r={radius}: {affected} particles",
            point.x,
            point.y
        );
        affected
    }

    fn populate(&mut self) {
        self.particles.clear();
        for _ in 0..self.config.particle_count {
            let p = spawn(&self.config, &mut self.rng);
            self.particles.push(p);
        }
        log::info!(
            "Spawned {} particles ({}, {}, {})",
            self.particles.len(),
            self.config.shape_mode.as_str(),
            self.config.size_distribution.as_str(),
            self.config.boundary.as_str()
        );
    }

    fn contain_all(&mut self) {
        let arena = self.arena();
        for p in &mut self.particles {
            boundary::apply(p, self.config.boundary, arena);
        }
    }
}

/// Impulse magnitude (before jitter) at `distance` from an explosion
pub fn explosion_impulse(distance: f32, radius: f32, force: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    (1.0 - distance / radius) * force * EXPLOSION_SCALE
}

fn spawn(config: &SimConfig, rng: &mut Pcg32) -> Particle {
    let size = match config.size_distribution {
        SizeDistribution::Uniform => (config.size_min + config.size_max) * 0.5,
        SizeDistribution::Random => rng.random_range(config.size_min..=config.size_max),
    };
    let shape = match config.shape_mode {
        ShapeMode::Circle => Shape::Circle,
        ShapeMode::Square => Shape::Square,
        ShapeMode::Triangle => Shape::Triangle,
        ShapeMode::Mixed => Shape::ALL[rng.random_range(0..Shape::ALL.len())],
    };

    let mut p = Particle::new(Vec2::ZERO, size, shape);
    p.friction = config.friction;
    p.restitution = config.restitution;
    p.speed_limit = config.speed_limit;
    if !shape.is_circle() {
        p.rotation_speed = rng.random_range(-MAX_SPAWN_SPIN..=MAX_SPAWN_SPIN);
    }
    scatter(&mut p, config, rng);

    let arena = Vec2::new(config.width, config.height);
    p.color = spawn_color(config.color_mode, p.pos, arena, rng);
    p
}

fn scatter(p: &mut Particle, config: &SimConfig, rng: &mut Pcg32) {
    let margin = match config.boundary {
        BoundaryPolicy::Clamp => p.effective_radius(),
        BoundaryPolicy::Wrap => 0.0,
    };
    let pos = Vec2::new(
        rng.random_range(margin..=config.width - margin),
        rng.random_range(margin..=config.height - margin),
    );
    let vel = Vec2::new(
        rng.random_range(-MAX_SPAWN_SPEED..=MAX_SPAWN_SPEED),
        rng.random_range(-MAX_SPAWN_SPEED..=MAX_SPAWN_SPEED),
    );
    p.reset_at(pos, vel);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            particle_count: 20,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_spawns_configured_count() {
        let system = ParticleSystem::new(small_config()).unwrap();
        assert_eq!(system.particles().len(), 20);
        for p in system.particles() {
            assert!(p.size() >= 2.0 && p.size() <= 6.0);
            assert!(p.mass() > 0.0);
            let m = p.effective_radius();
            assert!(p.pos.x >= m && p.pos.x <= 800.0 - m);
            assert!(p.pos.y >= m && p.pos.y <= 600.0 - m);
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(ParticleSystem::new(config).is_err());
    }

    #[test]
    fn test_uniform_sizes() {
        let mut system = ParticleSystem::new(small_config()).unwrap();
        system
            .set_size_distribution(SizeDistribution::Uniform, 2.0, 8.0)
            .unwrap();
        assert!(system.particles().iter().all(|p| p.size() == 5.0));
    }

    #[test]
    fn test_failed_setter_keeps_state() {
        let mut system = ParticleSystem::new(small_config()).unwrap();
        let before: Vec<Vec2> = system.particles().iter().map(|p| p.pos).collect();

        assert!(system.set_particle_count(0).is_err());
        assert!(system.set_size_distribution(SizeDistribution::Random, -1.0, 3.0).is_err());
        assert!(system.set_speed_multiplier(0.0).is_err());
        assert!(system.resize(0.0, 100.0).is_err());

        assert_eq!(system.particles().len(), 20);
        let after: Vec<Vec2> = system.particles().iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
        assert_eq!(system.config().speed_multiplier, 1.0);
    }

    #[test]
    fn test_set_particle_count_rebuilds() {
        let mut system = ParticleSystem::new(small_config()).unwrap();
        system.set_particle_count(35).unwrap();
        assert_eq!(system.particles().len(), 35);
        assert_eq!(system.config().particle_count, 35);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let config = SimConfig {
            shape_mode: ShapeMode::Mixed,
            color_mode: ColorMode::Rainbow,
            ..small_config()
        };
        let mut system = ParticleSystem::new(config).unwrap();
        let before: Vec<_> = system
            .particles()
            .iter()
            .map(|p| (p.shape, p.color, p.size(), p.pos))
            .collect();

        system.reset();

        assert_eq!(system.particles().len(), before.len());
        let mut moved = 0;
        for (p, (shape, color, size, pos)) in system.particles().iter().zip(&before) {
            assert_eq!(p.shape, *shape);
            assert_eq!(p.color, *color);
            assert_eq!(p.size(), *size);
            assert_eq!(p.prev_pos, p.pos);
            if p.pos != *pos {
                moved += 1;
            }
        }
        assert!(moved > 0);
        assert_eq!(system.config().color_mode, ColorMode::Rainbow);
    }

    #[test]
    fn test_explosion_impulse_profile() {
        assert!((explosion_impulse(0.0, 200.0, 5.0) - 100.0).abs() < 1e-4);
        assert!((explosion_impulse(100.0, 200.0, 5.0) - 50.0).abs() < 1e-4);
        assert_eq!(explosion_impulse(200.0, 200.0, 5.0), 0.0);
        assert_eq!(explosion_impulse(350.0, 200.0, 5.0), 0.0);
    }

    #[test]
    fn test_explode_pushes_outward_within_radius() {
        let mut system = ParticleSystem::new(SimConfig {
            particle_count: 2,
            ..small_config()
        })
        .unwrap();
        system.particles[0].pos = Vec2::new(450.0, 300.0);
        system.particles[0].vel = Vec2::ZERO;
        system.particles[1].pos = Vec2::new(700.0, 300.0);
        system.particles[1].vel = Vec2::ZERO;

        let affected = system.explode_at_point(Vec2::new(400.0, 300.0), Some(200.0));
        assert_eq!(affected, 1);

        // (1 - 50/200) * 5 * 20 = 75, plus at most 0.5 jitter per axis
        let v = system.particles[0].vel;
        assert!((v.x - 75.0).abs() <= EXPLOSION_JITTER + 1e-4);
        assert!(v.y.abs() <= EXPLOSION_JITTER + 1e-4);
        assert_eq!(system.particles[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_explode_at_epicenter_is_finite() {
        let mut system = ParticleSystem::new(SimConfig {
            particle_count: 1,
            ..small_config()
        })
        .unwrap();
        system.particles[0].pos = Vec2::new(400.0, 300.0);
        system.particles[0].vel = Vec2::ZERO;

        system.explode_at_point(Vec2::new(400.0, 300.0), None);
        let speed = system.particles[0].speed();
        assert!(speed.is_finite());
        assert!((speed - 100.0).abs() <= 1.0);
    }

    #[test]
    fn test_explode_ignores_non_finite_point() {
        let mut system = ParticleSystem::new(SimConfig {
            particle_count: 5,
            ..small_config()
        })
        .unwrap();
        let before: Vec<Vec2> = system.particles().iter().map(|p| p.vel).collect();

        assert_eq!(system.explode_at_point(Vec2::new(f32::NAN, 300.0), None), 0);
        assert_eq!(
            system.explode_at_point(Vec2::new(400.0, f32::INFINITY), Some(100.0)),
            0
        );

        let after: Vec<Vec2> = system.particles().iter().map(|p| p.vel).collect();
        assert_eq!(before, after);
        assert!(after.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_resize_recontains_particles() {
        let mut system = ParticleSystem::new(small_config()).unwrap();
        system.resize(200.0, 150.0).unwrap();
        for p in system.particles() {
            let m = p.effective_radius();
            assert!(p.pos.x >= m && p.pos.x <= 200.0 - m);
            assert!(p.pos.y >= m && p.pos.y <= 150.0 - m);
        }
    }

    #[test]
    fn test_same_seed_same_spawn() {
        let a = ParticleSystem::new(small_config()).unwrap();
        let b = ParticleSystem::new(small_config()).unwrap();
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.vel, pb.vel);
        }
    }
}
