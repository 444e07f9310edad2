//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Globe rider simulation command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "globe-snake", about = "Headless snake-on-a-planet simulation")]
pub struct CliArgs {
    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Planet base radius in meters.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Number of craters to scatter.
    #[arg(long)]
    pub craters: Option<u32>,

    /// Ride an ideal sphere instead of procedural terrain.
    #[arg(long)]
    pub flat: bool,

    /// Simulated seconds to run.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Pace the simulation against the wall clock.
    #[arg(long)]
    pub realtime: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(radius) = args.radius {
            self.terrain.base_radius = radius;
        }
        if let Some(craters) = args.craters {
            self.terrain.craters.count = craters;
        }
        if args.flat {
            self.simulation.flat = true;
        }
        if let Some(duration) = args.duration {
            self.simulation.duration_s = duration;
        }
        if args.realtime {
            self.simulation.realtime = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
