//! Particle colors
//!
//! The simulation treats color as an opaque descriptor. This module is the
//! default color source: it picks a color at spawn time and, in kinetic mode,
//! recolors particles by speed every tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How particle colors are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorMode {
    /// Cyan to blue gradient across the arena diagonal
    #[default]
    Gradient,
    /// Random hue per particle
    Rainbow,
    /// Single hue, random lightness
    Monochrome,
    /// Hue follows speed (blue when slow, red when at the speed limit)
    Kinetic,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Gradient => "Gradient",
            ColorMode::Rainbow => "Rainbow",
            ColorMode::Monochrome => "Monochrome",
            ColorMode::Kinetic => "Kinetic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gradient" => Some(ColorMode::Gradient),
            "rainbow" => Some(ColorMode::Rainbow),
            "monochrome" | "mono" => Some(ColorMode::Monochrome),
            "kinetic" => Some(ColorMode::Kinetic),
            _ => None,
        }
    }
}

/// HSL color (hue in degrees, saturation/lightness in percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// CSS color string, e.g. `hsl(180, 50%, 50%)`
    pub fn to_css(&self) -> String {
        format!("hsl({:.0}, {:.0}%, {:.0}%)", self.h, self.s, self.l)
    }
}

impl Default for Hsl {
    fn default() -> Self {
        Self::new(180.0, 50.0, 50.0)
    }
}

const GRADIENT_START_HUE: f32 = 180.0;
const GRADIENT_END_HUE: f32 = 240.0;
const MONOCHROME_HUE: f32 = 200.0;
const KINETIC_SLOW_HUE: f32 = 240.0;

/// Pick a spawn color for a particle at `pos` in an arena of `arena` size
pub fn spawn_color<R: Rng>(mode: ColorMode, pos: Vec2, arena: Vec2, rng: &mut R) -> Hsl {
    match mode {
        ColorMode::Gradient => {
            // Position along the top-left to bottom-right diagonal
            let t = (pos.dot(arena) / arena.length_squared()).clamp(0.0, 1.0);
            let hue = GRADIENT_START_HUE + (GRADIENT_END_HUE - GRADIENT_START_HUE) * t;
            Hsl::new(hue, 50.0, 50.0)
        }
        ColorMode::Rainbow => Hsl::new(rng.random_range(0.0..360.0), 70.0, 55.0),
        ColorMode::Monochrome => Hsl::new(MONOCHROME_HUE, 60.0, rng.random_range(35.0..=75.0)),
        ColorMode::Kinetic => kinetic_color(0.0, 1.0),
    }
}

/// Speed-mapped color: blue at rest, sweeping to red at `limit`
pub fn kinetic_color(speed: f32, limit: f32) -> Hsl {
    let ratio = if limit > 0.0 {
        (speed / limit).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Hsl::new(KINETIC_SLOW_HUE * (1.0 - ratio), 80.0, 50.0 + 10.0 * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_gradient_spans_diagonal() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Vec2::new(800.0, 600.0);

        let start = spawn_color(ColorMode::Gradient, Vec2::ZERO, arena, &mut rng);
        let end = spawn_color(ColorMode::Gradient, arena, arena, &mut rng);
        assert!((start.h - 180.0).abs() < 0.001);
        assert!((end.h - 240.0).abs() < 0.001);
    }

    #[test]
    fn test_kinetic_color_range() {
        assert!((kinetic_color(0.0, 15.0).h - 240.0).abs() < 0.001);
        assert!(kinetic_color(15.0, 15.0).h.abs() < 0.001);
        // Over the limit saturates
        assert!(kinetic_color(100.0, 15.0).h.abs() < 0.001);
        // Degenerate limit does not divide by zero
        assert!(kinetic_color(5.0, 0.0).h.is_finite());
    }

    #[test]
    fn test_css_format() {
        assert_eq!(Hsl::new(210.0, 50.0, 50.0).to_css(), "hsl(210, 50%, 50%)");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(ColorMode::from_str("KINETIC"), Some(ColorMode::Kinetic));
        assert_eq!(ColorMode::from_str("mono"), Some(ColorMode::Monochrome));
        assert_eq!(ColorMode::from_str("plaid"), None);
        assert_eq!(ColorMode::Rainbow.as_str(), "Rainbow");
    }
}
