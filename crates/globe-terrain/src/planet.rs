//! Seeded procedural planet: crater field, elevation sampler and normal estimator.

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::TerrainConfig;
use crate::crater::CraterField;
use crate::direction::Direction;
use crate::elevation::ElevationSampler;
use crate::error::TerrainError;
use crate::normal::SurfaceNormalEstimator;

/// A procedurally generated planet.
///
/// Everything mutable (the elevation cache) lives inside this instance and is
/// dropped with it.
pub struct ProceduralPlanet {
    sampler: ElevationSampler,
    normals: SurfaceNormalEstimator,
}

impl ProceduralPlanet {
    /// Generate a planet, placing craters with a `ChaCha8Rng` seeded from `config.seed`.
    pub fn new(config: TerrainConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let craters = CraterField::generate(&mut rng, &config.craters, config.base_radius);
        Self::with_craters(config, craters)
    }

    /// Build a planet around an explicit crater field.
    pub fn with_craters(config: TerrainConfig, craters: CraterField) -> Result<Self, TerrainError> {
        config.validate()?;
        info!(
            seed = config.seed,
            radius = config.base_radius,
            craters = craters.len(),
            "procedural planet created"
        );
        Ok(Self {
            sampler: ElevationSampler::new(config, craters),
            normals: SurfaceNormalEstimator::default(),
        })
    }

    /// Base radius of the ideal sphere.
    pub fn radius(&self) -> f64 {
        self.sampler.config().base_radius
    }

    /// Elevation at `direction` (need not be normalized).
    pub fn sample_elevation(&self, direction: DVec3) -> f64 {
        self.sampler.sample(direction)
    }

    /// Outward unit normal of the terrain at `direction`.
    pub fn surface_normal(&self, direction: Direction) -> DVec3 {
        self.normals
            .estimate(direction, self.radius(), |d| self.sampler.sample_direction(d))
    }

    pub fn sampler(&self) -> &ElevationSampler {
        &self.sampler
    }

    pub fn craters(&self) -> &CraterField {
        self.sampler.craters()
    }

    pub fn config(&self) -> &TerrainConfig {
        self.sampler.config()
    }

    /// Drop all memoized elevations.
    pub fn clear_cache(&self) {
        self.sampler.clear_cache();
    }
}
