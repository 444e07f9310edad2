//! Configuration error types.

use globe_terrain::TerrainError;

/// Errors from locating, reading, writing, or validating `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no platform config directory; pass --config")]
    NoConfigDir,

    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// The file parsed but describes a planet that cannot exist.
    #[error("invalid terrain settings: {0}")]
    InvalidTerrain(#[from] TerrainError),

    #[error("invalid simulation settings: {0}")]
    InvalidSimulation(String),
}
