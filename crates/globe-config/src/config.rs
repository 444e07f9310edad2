//! Configuration sections with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use globe_physics::{GravityConfig, HoverConfig, LocomotionConfig, RiderConfig};
use globe_terrain::TerrainConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet shape, noise layers, craters and elevation cache.
    pub terrain: TerrainConfig,
    pub gravity: GravityConfig,
    pub hover: HoverConfig,
    pub locomotion: LocomotionConfig,
    /// Headless run settings.
    pub simulation: SimulationConfig,
    pub debug: DebugConfig,
}

/// Settings for a headless run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated time to run, in seconds.
    pub duration_s: f64,
    /// Pace steps against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Use the ideal sphere instead of procedural terrain.
    pub flat: bool,
    /// Number of riders, spread around the spawn direction.
    pub riders: u32,
    /// Direction from the planet center the first rider spawns along.
    pub spawn_direction: [f32; 3],
    pub rider_mass: f32,
    pub rider_radius: f32,
    /// Peak scripted steering input (0.0 - 1.0).
    pub steer_amplitude: f32,
    /// Period of the scripted steering sweep, in seconds.
    pub steer_period_s: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_s: 30.0,
            realtime: false,
            flat: false,
            riders: 1,
            spawn_direction: [0.0, 1.0, 0.0],
            rider_mass: 1.0,
            rider_radius: 1.0,
            steer_amplitude: 0.6,
            steer_period_s: 8.0,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter override (e.g., "debug", "info,globe_physics=trace").
    pub log_level: String,
    /// Seconds of simulated time between telemetry log lines.
    pub telemetry_interval_s: f64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            telemetry_interval_s: 1.0,
        }
    }
}

impl Config {
    /// `<platform config dir>/globe-snake`.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("globe-snake"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Rider settings assembled from the hover, locomotion and simulation sections.
    pub fn rider(&self) -> RiderConfig {
        RiderConfig {
            mass: self.simulation.rider_mass,
            radius: self.simulation.rider_radius,
            hover: self.hover.clone(),
            locomotion: self.locomotion.clone(),
        }
    }

    /// Reject settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        let sim = &self.simulation;
        if !(sim.rider_mass.is_finite() && sim.rider_mass > 0.0) {
            return Err(ConfigError::InvalidSimulation(format!(
                "rider_mass must be positive, got {}",
                sim.rider_mass
            )));
        }
        if !(sim.rider_radius.is_finite() && sim.rider_radius > 0.0) {
            return Err(ConfigError::InvalidSimulation(format!(
                "rider_radius must be positive, got {}",
                sim.rider_radius
            )));
        }
        if !sim.duration_s.is_finite() || sim.duration_s < 0.0 {
            return Err(ConfigError::InvalidSimulation(format!(
                "duration_s must be non-negative, got {}",
                sim.duration_s
            )));
        }
        Ok(())
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        log::debug!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it differs from `self`, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config == self {
            return Ok(None);
        }
        new_config.validate()?;
        log::info!("Config reloaded with changes");
        Ok(Some(new_config))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
