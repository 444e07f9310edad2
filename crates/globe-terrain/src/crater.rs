//! Randomly placed surface craters.
//!
//! Each crater precomputes `cos(size / planet_radius)` so the containment test
//! in the elevation hot path is a single dot product instead of an `acos`.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use tracing::debug;

use crate::config::CraterConfig;
use crate::direction::Direction;

/// A circular depression on the planet surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Crater {
    /// Crater center on the unit sphere.
    pub position: Direction,
    /// Surface distance from center to rim.
    pub size: f64,
    /// Depth at the center.
    pub depth: f64,
    /// Cosine of the crater's angular radius, `cos(size / planet_radius)`.
    pub cos_radius: f64,
}

impl Crater {
    /// Build a crater on a planet of `planet_radius`.
    pub fn new(position: Direction, size: f64, depth: f64, planet_radius: f64) -> Self {
        Self {
            position,
            size,
            depth,
            cos_radius: (size / planet_radius).cos(),
        }
    }

    /// Depression at `direction`: `depth` at the center easing to zero at the rim.
    ///
    /// Returns exactly `0.0` whenever `dot(direction, position) <= cos_radius`.
    #[inline]
    pub fn depression(&self, direction: Direction) -> f64 {
        let dot = direction.dot(self.position);
        if dot <= self.cos_radius || self.cos_radius >= 1.0 {
            return 0.0;
        }
        // 1 at the center, 0 at the rim.
        let t = ((dot - self.cos_radius) / (1.0 - self.cos_radius)).min(1.0);
        let shape = (1.0 - (t * PI).cos()) * 0.5;
        shape * self.depth
    }
}

/// The fixed set of craters for one planet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CraterField {
    craters: Vec<Crater>,
}

impl CraterField {
    /// A field with no craters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an explicit list of craters.
    pub fn from_craters(craters: Vec<Crater>) -> Self {
        Self { craters }
    }

    /// Place `config.count` craters uniformly over the sphere.
    ///
    /// Uses `theta = acos(2u - 1)`, `phi = 2πv` so craters do not cluster at
    /// the poles. A zero count or a non-positive or non-finite size bound
    /// yields an empty field.
    pub fn generate(rng: &mut impl Rng, config: &CraterConfig, planet_radius: f64) -> Self {
        let (mut min_size, mut max_size) = (config.min_size, config.max_size);
        if min_size > max_size {
            std::mem::swap(&mut min_size, &mut max_size);
        }
        if config.count == 0 || !min_size.is_finite() || !max_size.is_finite() || max_size <= 0.0 {
            return Self::empty();
        }
        let min_size = min_size.max(0.0);

        // NaN and out-of-range fractions collapse into [0, 1].
        let mut min_frac = config.min_depth_fraction.max(0.0).min(1.0);
        let mut max_frac = config.max_depth_fraction.max(0.0).min(1.0);
        if min_frac > max_frac {
            std::mem::swap(&mut min_frac, &mut max_frac);
        }

        let craters: Vec<Crater> = (0..config.count)
            .map(|_| {
                let u: f64 = rng.random();
                let v: f64 = rng.random();
                let theta = (2.0 * u - 1.0).clamp(-1.0, 1.0).acos();
                let phi = TAU * v;
                let size = rng.random_range(min_size..=max_size);
                let depth = size * rng.random_range(min_frac..=max_frac);
                Crater::new(Direction::from_spherical(theta, phi), size, depth, planet_radius)
            })
            .collect();

        debug!(count = craters.len(), min_size, max_size, "generated crater field");
        Self { craters }
    }

    /// Deepest depression any crater produces at `direction`.
    ///
    /// Overlapping craters combine by maximum, not sum.
    pub fn depth_at(&self, direction: Direction) -> f64 {
        self.craters
            .iter()
            .map(|c| c.depression(direction))
            .fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.craters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.craters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Crater> {
        self.craters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn crater_at_x() -> Crater {
        Crater::new(Direction::X, 60.0, 12.0, 800.0)
    }

    #[test]
    fn test_cos_radius_precomputed() {
        let c = crater_at_x();
        assert!((c.cos_radius - (60.0f64 / 800.0).cos()).abs() < 1e-15);
    }

    #[test]
    fn test_center_depression_equals_depth() {
        let c = crater_at_x();
        let d = c.depression(Direction::X);
        assert!((d - 12.0).abs() < 1e-12, "center depression {d}");
    }

    #[test]
    fn test_outside_rim_contributes_exactly_zero() {
        let c = crater_at_x();
        let angle = 60.0f64 / 800.0 * 1.001;
        let past_rim = Direction::new(DVec3::new(angle.cos(), angle.sin(), 0.0)).unwrap();
        assert_eq!(c.depression(past_rim), 0.0);
        let outside = Direction::new(DVec3::new(0.9, 0.5, 0.0)).unwrap();
        assert!(outside.dot(c.position) <= c.cos_radius);
        assert_eq!(c.depression(outside), 0.0);
        assert_eq!(c.depression(Direction::new(DVec3::NEG_X).unwrap()), 0.0);
    }

    #[test]
    fn test_profile_decreases_toward_rim() {
        let c = crater_at_x();
        let max_angle = 60.0f64 / 800.0;
        let mut prev = f64::INFINITY;
        for i in 0..=20 {
            let a = max_angle * i as f64 / 20.0;
            let d = Direction::new(DVec3::new(a.cos(), 0.0, a.sin())).unwrap();
            let depth = c.depression(d);
            assert!(depth <= prev + 1e-12, "profile not monotonic at step {i}");
            assert!((0.0..=12.0 + 1e-12).contains(&depth));
            prev = depth;
        }
    }

    #[test]
    fn test_overlapping_craters_take_maximum() {
        let a = Crater::new(Direction::X, 60.0, 12.0, 800.0);
        let b = Crater::new(Direction::X, 80.0, 5.0, 800.0);
        let field = CraterField::from_craters(vec![a, b]);
        let depth = field.depth_at(Direction::X);
        assert!((depth - 12.0).abs() < 1e-12, "expected max 12, got {depth}");
    }

    #[test]
    fn test_generate_zero_count_is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cfg = CraterConfig {
            count: 0,
            ..CraterConfig::default()
        };
        let field = CraterField::generate(&mut rng, &cfg, 800.0);
        assert!(field.is_empty());
        assert_eq!(field.depth_at(Direction::Y), 0.0);
    }

    #[test]
    fn test_generate_respects_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cfg = CraterConfig {
            count: 200,
            min_size: 20.0,
            max_size: 40.0,
            min_depth_fraction: 0.1,
            max_depth_fraction: 0.3,
        };
        let field = CraterField::generate(&mut rng, &cfg, 800.0);
        assert_eq!(field.len(), 200);
        for c in field.iter() {
            assert!((20.0..=40.0).contains(&c.size), "size {}", c.size);
            let frac = c.depth / c.size;
            assert!((0.1 - 1e-12..=0.3 + 1e-12).contains(&frac), "depth fraction {frac}");
            assert!((c.position.get().length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_generate_is_deterministic_for_seed() {
        let cfg = CraterConfig::default();
        let a = CraterField::generate(&mut ChaCha8Rng::seed_from_u64(42), &cfg, 800.0);
        let b = CraterField::generate(&mut ChaCha8Rng::seed_from_u64(42), &cfg, 800.0);
        let c = CraterField::generate(&mut ChaCha8Rng::seed_from_u64(43), &cfg, 800.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_positions_not_clustered_at_poles() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cfg = CraterConfig {
            count: 4000,
            ..CraterConfig::default()
        };
        let field = CraterField::generate(&mut rng, &cfg, 800.0);
        // Uniform on the sphere: z is uniform in [-1, 1], so |z| > 0.9 holds ~10%.
        let polar = field.iter().filter(|c| c.position.get().z.abs() > 0.9).count();
        let frac = polar as f64 / field.len() as f64;
        assert!(
            (0.07..0.13).contains(&frac),
            "polar fraction {frac} suggests clustering"
        );
    }

    #[test]
    fn test_swapped_size_bounds_are_tolerated() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let cfg = CraterConfig {
            count: 10,
            min_size: 50.0,
            max_size: 10.0,
            ..CraterConfig::default()
        };
        let field = CraterField::generate(&mut rng, &cfg, 800.0);
        assert_eq!(field.len(), 10);
        assert!(field.iter().all(|c| (10.0..=50.0).contains(&c.size)));
    }
}
