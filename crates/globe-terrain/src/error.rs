//! Terrain construction errors.

/// Errors raised when a [`TerrainConfig`](crate::TerrainConfig) cannot describe a planet.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The base radius is zero, negative, or not finite.
    #[error("invalid planet radius: {0}")]
    InvalidRadius(f64),

    /// Crater size bounds are not finite numbers.
    #[error("invalid crater sizes: min={min}, max={max}")]
    InvalidCraterSizes { min: f64, max: f64 },

    /// Cache precision beyond what a direction key can represent.
    #[error("cache precision {precision} exceeds maximum {max}")]
    InvalidCachePrecision { precision: u32, max: u32 },
}
