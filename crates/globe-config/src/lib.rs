//! Configuration for the globe simulation.
//!
//! Settings persist to disk as RON, accept CLI overrides via clap, and load
//! forward/backward compatibly since every section defaults missing fields.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, SimulationConfig};
pub use error::ConfigError;
