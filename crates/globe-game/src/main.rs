//! Headless globe-snake runner.
//!
//! Loads `config.ron`, applies CLI overrides, builds the planet and riders,
//! and advances the simulation on a fixed 60 Hz step while logging telemetry.
//!
//! Run with: `cargo run -p globe-game -- --duration 10 --flat`

mod game_loop;
mod session;

use std::time::Duration;

use clap::Parser;
use globe_config::{CliArgs, Config};
use tracing::{info, warn};

use crate::game_loop::{FIXED_DT, GameLoop};
use crate::session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => dir,
        None => Config::default_dir()?,
    };

    // Load or create config, then apply CLI overrides
    let (mut config, load_error) = match Config::load_or_create(&config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    globe_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = load_error {
        warn!("Failed to load config: {e}, using defaults");
    }

    info!(
        "Planet: radius={:.0}m, seed={}, craters={}, flat={}",
        config.terrain.base_radius,
        config.terrain.seed,
        config.terrain.craters.count,
        config.simulation.flat,
    );

    let mut session = Session::build(&config)?;
    let mut game_loop = GameLoop::new();
    let duration = config.simulation.duration_s;

    while game_loop.total_sim_time() < duration {
        let mut alpha = 0.0;
        if config.simulation.realtime {
            game_loop.tick(|_, t| session.update(t), |a| alpha = a);
            std::thread::sleep(Duration::from_millis(2));
        } else {
            game_loop.advance(FIXED_DT, |_, t| session.update(t), |a| alpha = a);
        }
        session.report(game_loop.total_sim_time(), alpha);
    }

    let summary = session.summary();
    info!(
        ticks = summary.ticks,
        frames = game_loop.frame_count(),
        steps = game_loop.update_count(),
        riders = summary.riders,
        sim_time = game_loop.total_sim_time(),
        max_hover_error = summary.max_hover_error,
        max_alignment_error = summary.max_alignment_error,
        mean_speed = summary.mean_speed,
        "run complete"
    );
    Ok(())
}
