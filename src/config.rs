//! Simulation configuration
//!
//! One owned snapshot, replaced between ticks through the system's setters.
//! Bound to UI controls by the embedding application and optionally loaded
//! from JSON.

use serde::{Deserialize, Serialize};

use crate::color::ColorMode;
use crate::error::ConfigError;
use crate::sim::{InteractionMode, Shape};

/// What happens when a particle reaches the arena edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoundaryPolicy {
    /// Teleport to the opposite edge
    Wrap,
    /// Clamp inside the arena and bounce
    #[default]
    Clamp,
}

impl BoundaryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryPolicy::Wrap => "Wrap",
            BoundaryPolicy::Clamp => "Clamp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wrap" => Some(BoundaryPolicy::Wrap),
            "clamp" | "bounce" => Some(BoundaryPolicy::Clamp),
            _ => None,
        }
    }
}

/// How particle sizes are drawn from the configured range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SizeDistribution {
    /// Every particle gets the midpoint of the range
    Uniform,
    /// Each particle draws a size from the range
    #[default]
    Random,
}

impl SizeDistribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeDistribution::Uniform => "Uniform",
            SizeDistribution::Random => "Random",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "uniform" => Some(SizeDistribution::Uniform),
            "random" => Some(SizeDistribution::Random),
            _ => None,
        }
    }
}

/// Which shapes are spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShapeMode {
    #[default]
    Circle,
    Square,
    Triangle,
    /// Random mix of all shapes
    Mixed,
}

impl ShapeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeMode::Circle => "Circle",
            ShapeMode::Square => "Square",
            ShapeMode::Triangle => "Triangle",
            ShapeMode::Mixed => "Mixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "circle" => Some(ShapeMode::Circle),
            "square" => Some(ShapeMode::Square),
            "triangle" => Some(ShapeMode::Triangle),
            "mixed" => Some(ShapeMode::Mixed),
            _ => None,
        }
    }

    /// Largest radius factor among the shapes this mode can spawn
    pub fn max_shape_factor(&self) -> f32 {
        match self {
            ShapeMode::Circle => Shape::Circle.factor(),
            ShapeMode::Square => Shape::Square.factor(),
            ShapeMode::Triangle | ShapeMode::Mixed => Shape::Triangle.factor(),
        }
    }
}

/// How often each colliding pair is resolved per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CollisionResolution {
    /// Every particle checks every sibling, so a pair can resolve twice
    #[default]
    PerParticle,
    /// Each unordered pair resolves at most once
    PerPairOnce,
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    pub width: f32,
    pub height: f32,
    pub boundary: BoundaryPolicy,

    // === Population ===
    pub particle_count: usize,
    pub size_min: f32,
    pub size_max: f32,
    pub size_distribution: SizeDistribution,
    pub shape_mode: ShapeMode,
    pub color_mode: ColorMode,

    // === Physics ===
    pub interaction_mode: InteractionMode,
    /// Scales every mode force and the speed limit
    pub speed_multiplier: f32,
    /// Base speed limit (pixels/tick) before the multiplier
    pub speed_limit: f32,
    /// Velocity retained per tick (0 < f <= 1)
    pub friction: f32,
    /// Restitution on collisions and wall bounces (0 <= b <= 1)
    pub restitution: f32,
    pub collision_resolution: CollisionResolution,

    // === Commands ===
    pub explosion_force: f32,
    pub explosion_radius: f32,
    /// Pointer offset to global force multiplier (0 disables)
    pub pointer_gravity: f32,

    /// RNG seed for spawning and jitter
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            boundary: BoundaryPolicy::Clamp,

            particle_count: 150,
            size_min: 2.0,
            size_max: 6.0,
            size_distribution: SizeDistribution::Random,
            shape_mode: ShapeMode::Circle,
            color_mode: ColorMode::Gradient,

            interaction_mode: InteractionMode::Field,
            speed_multiplier: 1.0,
            speed_limit: 15.0,
            friction: 0.99,
            restitution: 0.6,
            collision_resolution: CollisionResolution::PerParticle,

            explosion_force: 5.0,
            explosion_radius: 200.0,
            pointer_gravity: 2.0,

            seed: 0,
        }
    }
}

impl SimConfig {
    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NonPositiveParticleCount);
        }
        if !(self.size_min > 0.0 && self.size_max.is_finite() && self.size_min <= self.size_max) {
            return Err(ConfigError::InvalidSizeRange {
                min: self.size_min,
                max: self.size_max,
            });
        }
        validate_arena(self.width, self.height)?;

        positive("speed_multiplier", self.speed_multiplier)?;
        positive("speed_limit", self.speed_limit)?;
        positive("explosion_force", self.explosion_force)?;
        positive("explosion_radius", self.explosion_radius)?;
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "friction",
                value: self.friction,
            });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::OutOfRange {
                field: "restitution",
                value: self.restitution,
            });
        }
        if !(self.pointer_gravity >= 0.0 && self.pointer_gravity.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "pointer_gravity",
                value: self.pointer_gravity,
            });
        }

        if self.boundary == BoundaryPolicy::Clamp {
            let margin = self.max_margin();
            if self.width < 2.0 * margin || self.height < 2.0 * margin {
                return Err(ConfigError::ArenaTooSmall {
                    width: self.width,
                    height: self.height,
                    margin,
                });
            }
        }

        Ok(())
    }

    /// Largest clamp margin any spawned particle can have
    pub fn max_margin(&self) -> f32 {
        self.size_max * self.shape_mode.max_shape_factor()
    }

    /// Effective speed limit after the multiplier
    pub fn effective_speed_limit(&self) -> f32 {
        self.speed_limit * self.speed_multiplier
    }

    /// Parse a configuration from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn validate_arena(width: f32, height: f32) -> Result<(), ConfigError> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(ConfigError::InvalidArena { width, height });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
