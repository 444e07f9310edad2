//! Surface normals from central differences of the elevation field.

use glam::DVec3;

use crate::direction::Direction;

/// Default angular step for the finite differences, in radians.
pub const DEFAULT_NORMAL_EPSILON: f64 = 1e-3;

/// Estimates the outward unit normal of the terrain surface `r(d) = R + h(d)`.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceNormalEstimator {
    /// Angular step used to offset the direction along each tangent.
    pub epsilon: f64,
}

impl Default for SurfaceNormalEstimator {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_NORMAL_EPSILON,
        }
    }
}

impl SurfaceNormalEstimator {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Normal at `direction` for a planet of base radius `radius`.
    ///
    /// Samples `elevation` at `direction ± ε·u` and `direction ± ε·v`, turns
    /// the central differences into slopes per radian, and tilts the radial
    /// direction against the slope: `normalize(d - (u·gu + v·gv) / (R + h))`.
    /// The result is unit length and always has a positive dot product with
    /// `direction`.
    pub fn estimate(
        &self,
        direction: Direction,
        radius: f64,
        elevation: impl Fn(Direction) -> f64,
    ) -> DVec3 {
        let d = direction.get();
        let eps = self.epsilon;
        if eps.is_nan() || eps <= 0.0 {
            return d;
        }

        let (u, v) = direction.tangent_basis();
        let grad_u =
            (elevation(direction.offset(u, eps)) - elevation(direction.offset(u, -eps))) / (2.0 * eps);
        let grad_v =
            (elevation(direction.offset(v, eps)) - elevation(direction.offset(v, -eps))) / (2.0 * eps);

        let surface_radius = radius + elevation(direction);
        if !surface_radius.is_finite() || surface_radius <= f64::EPSILON {
            return d;
        }

        let tilted = d - (u * grad_u + v * grad_v) / surface_radius;
        Direction::new(tilted).map_or(d, Direction::get)
    }
}
