//! Scalar elevation field over the unit sphere.
//!
//! Sums a base noise sample, three multi-octave bands, optional ridge and
//! valley shaping, subtracts crater depressions, then softens hilltops.
//! Results are memoized per quantized direction; the cache never changes a
//! sampled value, only how fast it is produced.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use glam::DVec3;
use noise::{NoiseFn, Simplex};
use tracing::{trace, warn};

use crate::config::{NoiseLayer, TerrainConfig};
use crate::crater::CraterField;
use crate::direction::{Direction, DirectionKey};

/// Elevations at or below this pass through [`soften_elevation`] untouched.
pub const SOFTEN_THRESHOLD: f64 = 0.5;
/// Width of the smoothstep ramp above [`SOFTEN_THRESHOLD`].
pub const SOFTEN_RANGE: f64 = 20.0;

/// Derive a per-layer noise seed from the planet seed.
fn layer_seed(seed: u64, layer: u32) -> u32 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    layer.hash(&mut hasher);
    hasher.finish() as u32
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Round off low hills while leaving valleys and craters untouched.
///
/// Above the threshold the excess is scaled by `0.5 + 0.5 * smoothstep(excess / 20)`,
/// which halves the slope at the foot of a hill and restores it fully once
/// the hill is 20 units tall. The mapping is continuous and monotonic.
pub fn soften_elevation(elevation: f64) -> f64 {
    if elevation <= SOFTEN_THRESHOLD {
        return elevation;
    }
    let excess = elevation - SOFTEN_THRESHOLD;
    SOFTEN_THRESHOLD + excess * (0.5 + 0.5 * smoothstep(excess / SOFTEN_RANGE))
}

/// Deterministic elevation sampler for one planet.
///
/// Owns its noise generators, craters and cache; nothing is shared between
/// instances, so independent planets (or tests) never interfere.
pub struct ElevationSampler {
    config: TerrainConfig,
    craters: CraterField,
    base: Simplex,
    large: Simplex,
    medium: Simplex,
    small: Simplex,
    ridge: Simplex,
    valley: Simplex,
    cache: DashMap<DirectionKey, f64>,
    degenerate: AtomicU64,
}

impl ElevationSampler {
    /// Build a sampler from terrain parameters and an already-generated crater field.
    pub fn new(config: TerrainConfig, craters: CraterField) -> Self {
        let seed = config.seed;
        Self {
            base: Simplex::new(layer_seed(seed, 0)),
            large: Simplex::new(layer_seed(seed, 1)),
            medium: Simplex::new(layer_seed(seed, 2)),
            small: Simplex::new(layer_seed(seed, 3)),
            ridge: Simplex::new(layer_seed(seed, 4)),
            valley: Simplex::new(layer_seed(seed, 5)),
            cache: DashMap::new(),
            degenerate: AtomicU64::new(0),
            config,
            craters,
        }
    }

    /// Elevation at `direction`, which need not be normalized.
    ///
    /// Degenerate inputs (zero length or NaN) are logged and read as elevation `0.0`.
    pub fn sample(&self, direction: DVec3) -> f64 {
        match Direction::new(direction) {
            Some(d) => self.sample_direction(d),
            None => {
                self.degenerate.fetch_add(1, Ordering::Relaxed);
                warn!(?direction, "degenerate direction passed to elevation sampler");
                0.0
            }
        }
    }

    /// Elevation at a normalized direction, served from the cache when possible.
    pub fn sample_direction(&self, direction: Direction) -> f64 {
        let capacity = self.config.cache.capacity;
        if capacity == 0 {
            return self.sample_uncached(direction);
        }

        let key = direction.key(self.config.cache.precision);
        if let Some(hit) = self.cache.get(&key) {
            return *hit;
        }

        let elevation = self.sample_uncached(direction);
        if self.cache.len() >= capacity {
            trace!(entries = self.cache.len(), "elevation cache full, clearing");
            self.cache.clear();
        }
        self.cache.insert(key, elevation);
        elevation
    }

    /// Elevation at `direction` computed from scratch, bypassing the cache.
    ///
    /// The field is evaluated at the center of the direction's key cell, so
    /// a cached value is exactly what this returns for any direction that
    /// shares the key.
    pub fn sample_uncached(&self, direction: Direction) -> f64 {
        let center = direction.snapped(self.config.cache.precision);
        let raw = self.noise_sum(center) * self.config.height_scale - self.craters.depth_at(center);
        soften_elevation(raw)
    }

    /// Dimensionless sum of all noise contributions, before height scaling.
    pub fn noise_sum(&self, direction: Direction) -> f64 {
        let cfg = &self.config;
        let d = direction.get();
        let mut sum = 0.0;

        if cfg.roughness != 0.0 {
            sum += sample_noise(&self.base, d * cfg.base_frequency) * cfg.roughness;
        }

        for (noise, layer) in [
            (&self.large, &cfg.large),
            (&self.medium, &cfg.medium),
            (&self.small, &cfg.small),
        ] {
            if layer.is_active() {
                sum += fbm(noise, d, layer) * layer.influence;
            }
        }

        if cfg.ridge.enabled {
            let n = sample_noise(&self.ridge, d * cfg.ridge.frequency);
            let ridge = (1.0 - n.abs()).max(0.0).powf(cfg.ridge.sharpness);
            sum += ridge * cfg.ridge.influence;
        }

        if cfg.valley.enabled {
            let n = sample_noise(&self.valley, d * cfg.valley.frequency);
            if n < 0.0 {
                sum -= n * n * cfg.valley.influence;
            }
        }

        sum
    }

    /// Deepest crater depression at `direction`.
    pub fn crater_depth(&self, direction: Direction) -> f64 {
        self.craters.depth_at(direction)
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn craters(&self) -> &CraterField {
        &self.craters
    }

    /// Number of memoized elevations.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every memoized elevation.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// How many degenerate directions have been rejected so far.
    pub fn degenerate_count(&self) -> u64 {
        self.degenerate.load(Ordering::Relaxed)
    }
}

#[inline]
fn sample_noise(noise: &Simplex, p: DVec3) -> f64 {
    noise.get([p.x, p.y, p.z])
}

/// Multi-octave noise: frequency doubles and amplitude scales by `persistence` per octave.
fn fbm(noise: &Simplex, d: DVec3, layer: &NoiseLayer) -> f64 {
    let mut total = 0.0;
    let mut frequency = layer.frequency;
    let mut amplitude = 1.0;
    for _ in 0..layer.octaves {
        total += sample_noise(noise, d * frequency) * amplitude;
        frequency *= 2.0;
        amplitude *= layer.persistence;
    }
    total
}
