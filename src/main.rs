//! Particle Arena headless driver
//!
//! Runs the simulation without a renderer: loads a configuration, feeds a
//! scripted pointer and device tilt through a fixed-timestep loop, and logs
//! speed statistics once per simulated second.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::Vec2;

use particle_arena::consts::*;
use particle_arena::sim::{InteractionMode, orientation_force};
use particle_arena::{ParticleSystem, SimConfig};

#[derive(Parser)]
#[command(name = "particle-arena")]
#[command(about = "Run the particle arena headless and report statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file (defaults when omitted)
    config: Option<PathBuf>,

    /// Number of display frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Interaction mode override (field, vortex, attract, repel, fluid, springs)
    #[arg(long)]
    mode: Option<String>,

    /// Print the final particle snapshot as JSON
    #[arg(long)]
    dump: bool,
}

/// Drives the system the way a display loop would
struct Driver {
    system: ParticleSystem,
    accumulator: f32,
    frame: u32,
}

impl Driver {
    fn new(system: ParticleSystem) -> Self {
        Self {
            system,
            accumulator: 0.0,
            frame: 0,
        }
    }

    /// Run fixed steps for `frame_ms` of wall time
    fn update(&mut self, frame_ms: f32) {
        let frame_ms = frame_ms.min(MAX_STEP_SECS * 1000.0);
        self.accumulator += frame_ms;

        let mut substeps = 0;
        while self.accumulator >= FRAME_DT_MS && substeps < MAX_SUBSTEPS {
            self.system.step(FRAME_DT_MS);
            self.accumulator -= FRAME_DT_MS;
            substeps += 1;
        }
        self.frame += 1;
    }

    /// Pointer circling the arena center, arena gently tilting back and forth
    fn scripted_input(&mut self) {
        let t = self.frame as f32 / 60.0;
        let center = self.system.arena() * 0.5;
        let orbit = center.min_element() * 0.4;
        self.system
            .set_pointer(Some(center + Vec2::from_angle(t * 1.2) * orbit));
        self.system
            .set_global_force(orientation_force(10.0 * (t * 0.5).sin(), 4.0 * t.cos()));
    }

    fn log_stats(&self) {
        let particles = self.system.particles();
        let (min, max, sum) = particles.iter().map(|p| p.speed()).fold(
            (f32::MAX, 0.0f32, 0.0f32),
            |(min, max, sum), s| (min.min(s), max.max(s), sum + s),
        );
        log::info!(
            "t={:.1}s ticks={} speed min={:.2} max={:.2} mean={:.2}",
            self.frame as f32 / 60.0,
            self.system.time_ticks(),
            min,
            max,
            sum / particles.len().max(1) as f32
        );
    }
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SimConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(mode) = &cli.mode {
        match InteractionMode::from_str(mode) {
            Some(mode) => config.interaction_mode = mode,
            None => bail!("Unknown interaction mode: {mode}"),
        }
    }
    Ok(config)
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::info!(
        "Particle Arena: {} particles, mode {}, {} frames",
        config.particle_count,
        config.interaction_mode.as_str(),
        cli.frames
    );

    let mut driver = Driver::new(ParticleSystem::new(config)?);
    let explode_frame = cli.frames / 2;

    for frame in 0..cli.frames {
        driver.scripted_input();
        if frame == explode_frame {
            let center = driver.system.arena() * 0.5;
            driver.system.explode_at_point(center, None);
        }
        // Display frames alternate 16/17 ms like a 60 Hz vsync
        driver.update(if frame % 3 == 0 { 17.0 } else { 16.0 });

        if driver.frame % 60 == 0 {
            driver.log_stats();
        }
    }

    if cli.dump {
        let snapshot = serde_json::to_string_pretty(driver.system.particles())
            .context("Failed to serialize particle snapshot")?;
        println!("{snapshot}");
    }

    Ok(())
}
