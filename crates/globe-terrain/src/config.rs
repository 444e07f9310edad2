//! Terrain generation parameters.
//!
//! Created once at planet-generation time and read-only afterwards. Every
//! section carries `#[serde(default)]` so partial RON files still load.

use serde::{Deserialize, Serialize};

use crate::direction::MAX_KEY_PRECISION;
use crate::error::TerrainError;

/// One band of multi-octave noise (large, medium or small features).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseLayer {
    /// Frequency of the first octave, in cycles per unit of direction space.
    pub frequency: f64,
    /// Weight of this band in the noise sum. `0.0` disables the band.
    pub influence: f64,
    /// Number of octaves. `0` disables the band.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
}

impl NoiseLayer {
    /// A layer that contributes nothing.
    pub const fn disabled() -> Self {
        Self {
            frequency: 1.0,
            influence: 0.0,
            octaves: 0,
            persistence: 0.5,
        }
    }

    /// Whether this layer contributes to the noise sum at all.
    pub fn is_active(&self) -> bool {
        self.octaves > 0 && self.influence != 0.0
    }
}

impl Default for NoiseLayer {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            influence: 0.5,
            octaves: 3,
            persistence: 0.5,
        }
    }
}

/// Sharp linear ridges from `pow(1 - |noise|, sharpness)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RidgeConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub influence: f64,
    pub sharpness: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 3.0,
            influence: 0.25,
            sharpness: 3.0,
        }
    }
}

/// One-sided depressions carved from the negative half of a noise field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValleyConfig {
    pub enabled: bool,
    pub frequency: f64,
    pub influence: f64,
}

impl Default for ValleyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 1.5,
            influence: 0.6,
        }
    }
}

/// Random crater placement parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CraterConfig {
    /// Number of craters. `0` yields an empty field.
    pub count: u32,
    /// Minimum crater size (surface distance from center to rim).
    pub min_size: f64,
    /// Maximum crater size.
    pub max_size: f64,
    /// Lower bound of depth as a fraction of size.
    pub min_depth_fraction: f64,
    /// Upper bound of depth as a fraction of size.
    pub max_depth_fraction: f64,
}

impl CraterConfig {
    /// No craters at all.
    pub const fn none() -> Self {
        Self {
            count: 0,
            min_size: 0.0,
            max_size: 0.0,
            min_depth_fraction: 0.1,
            max_depth_fraction: 0.3,
        }
    }
}

impl Default for CraterConfig {
    fn default() -> Self {
        Self {
            count: 24,
            min_size: 20.0,
            max_size: 90.0,
            min_depth_fraction: 0.1,
            max_depth_fraction: 0.3,
        }
    }
}

/// Elevation cache tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Decimal digits kept per direction component when forming cache keys,
    /// at most [`MAX_KEY_PRECISION`]. Elevation is evaluated at the center
    /// of each key cell, so this is also the resolution of the field.
    pub precision: u32,
    /// Entry count above which the cache is cleared. `0` disables caching.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            capacity: 1 << 20,
        }
    }
}

/// Full set of terrain parameters for one planet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for noise layers and crater placement.
    pub seed: u64,
    /// Radius of the ideal sphere, elevation zero.
    pub base_radius: f64,
    /// Multiplier turning the dimensionless noise sum into elevation units.
    pub height_scale: f64,
    /// Frequency of the single base noise sample.
    pub base_frequency: f64,
    /// Weight of the base noise sample.
    pub roughness: f64,
    pub large: NoiseLayer,
    pub medium: NoiseLayer,
    pub small: NoiseLayer,
    pub ridge: RidgeConfig,
    pub valley: ValleyConfig,
    pub craters: CraterConfig,
    pub cache: CacheConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            base_radius: 800.0,
            height_scale: 18.0,
            base_frequency: 1.2,
            roughness: 0.4,
            large: NoiseLayer {
                frequency: 0.8,
                influence: 1.0,
                octaves: 2,
                persistence: 0.5,
            },
            medium: NoiseLayer::default(),
            small: NoiseLayer {
                frequency: 8.0,
                influence: 0.15,
                octaves: 4,
                persistence: 0.45,
            },
            ridge: RidgeConfig::default(),
            valley: ValleyConfig::default(),
            craters: CraterConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// A perfectly smooth sphere of the given radius: no noise, no craters.
    pub fn flat(base_radius: f64) -> Self {
        Self {
            base_radius,
            height_scale: 0.0,
            roughness: 0.0,
            large: NoiseLayer::disabled(),
            medium: NoiseLayer::disabled(),
            small: NoiseLayer::disabled(),
            ridge: RidgeConfig {
                enabled: false,
                ..RidgeConfig::default()
            },
            valley: ValleyConfig {
                enabled: false,
                ..ValleyConfig::default()
            },
            craters: CraterConfig::none(),
            ..Self::default()
        }
    }

    /// Reject parameters no planet can be built from.
    ///
    /// Zero or negative counts, octaves and sizes are accepted and simply
    /// disable the feature; only non-physical radii and non-finite crater
    /// sizes and a cache precision above [`MAX_KEY_PRECISION`] are errors.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.base_radius.is_finite() || self.base_radius <= 0.0 {
            return Err(TerrainError::InvalidRadius(self.base_radius));
        }
        let c = &self.craters;
        if !c.min_size.is_finite() || !c.max_size.is_finite() {
            return Err(TerrainError::InvalidCraterSizes {
                min: c.min_size,
                max: c.max_size,
            });
        }
        if self.cache.precision > MAX_KEY_PRECISION {
            return Err(TerrainError::InvalidCachePrecision {
                precision: self.cache.precision,
                max: MAX_KEY_PRECISION,
            });
        }
        Ok(())
    }
}
