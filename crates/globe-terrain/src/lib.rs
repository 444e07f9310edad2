//! Procedural planet terrain: crater field, cached elevation sampling, and surface normals.

mod config;
mod crater;
mod direction;
mod elevation;
mod error;
mod normal;
mod planet;
mod provider;

pub use config::{CacheConfig, CraterConfig, NoiseLayer, RidgeConfig, TerrainConfig, ValleyConfig};
pub use crater::{Crater, CraterField};
pub use direction::{DEGENERATE_LENGTH_SQ, Direction, DirectionKey, MAX_KEY_PRECISION};
pub use elevation::{ElevationSampler, SOFTEN_RANGE, SOFTEN_THRESHOLD, soften_elevation};
pub use error::TerrainError;
pub use normal::{DEFAULT_NORMAL_EPSILON, SurfaceNormalEstimator};
pub use planet::ProceduralPlanet;
pub use provider::{Terrain, TerrainProvider};
