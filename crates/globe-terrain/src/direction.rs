//! Unit directions from the planet center, the coordinate every terrain query uses.

use glam::DVec3;

/// Squared length below which a vector is treated as degenerate.
pub const DEGENERATE_LENGTH_SQ: f64 = 1e-18;

/// Largest key precision. At `10^15` a scaled unit component is still an
/// exact integer in both `f64` and `i64`.
pub const MAX_KEY_PRECISION: u32 = 15;

/// A unit vector from the planet center.
///
/// Construction always renormalizes, so a `Direction` is never stored
/// un-normalized. Degenerate inputs (zero length, NaN, infinite) are rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction(DVec3);

/// Cache key for a direction quantized to a fixed number of decimal digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirectionKey(i64, i64, i64);

impl Direction {
    /// +X axis.
    pub const X: Self = Self(DVec3::X);
    /// +Y axis.
    pub const Y: Self = Self(DVec3::Y);
    /// +Z axis.
    pub const Z: Self = Self(DVec3::Z);

    /// Normalize `v` into a direction, or `None` if `v` has no usable direction.
    pub fn new(v: DVec3) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let len_sq = v.length_squared();
        if len_sq < DEGENERATE_LENGTH_SQ {
            return None;
        }
        Some(Self(v / len_sq.sqrt()))
    }

    /// Direction from spherical angles: `theta` from +Z (polar), `phi` around Z.
    pub fn from_spherical(theta: f64, phi: f64) -> Self {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        Self(DVec3::new(sin_t * cos_p, sin_t * sin_p, cos_t).normalize())
    }

    /// The underlying unit vector.
    #[inline]
    pub fn get(self) -> DVec3 {
        self.0
    }

    /// Dot product with another direction (cosine of the angle between them).
    #[inline]
    pub fn dot(self, other: Direction) -> f64 {
        self.0.dot(other.0)
    }

    /// Quantize each component to `precision` decimal digits, capped at
    /// [`MAX_KEY_PRECISION`].
    pub fn key(self, precision: u32) -> DirectionKey {
        let scale = key_scale(precision);
        DirectionKey(
            (self.0.x * scale).round() as i64,
            (self.0.y * scale).round() as i64,
            (self.0.z * scale).round() as i64,
        )
    }

    /// The representative direction of this direction's key cell.
    ///
    /// Every direction with the same `key(precision)` snaps to the same
    /// direction.
    pub fn snapped(self, precision: u32) -> Self {
        let DirectionKey(x, y, z) = self.key(precision);
        let scale = key_scale(precision);
        Self::new(DVec3::new(x as f64, y as f64, z as f64) / scale).unwrap_or(self)
    }

    /// Two unit tangents `(u, v)` spanning the plane orthogonal to this direction.
    ///
    /// `u = normalize(Z × d)`, falling back to `X × d` near the Z poles;
    /// `v = d × u`. Together with `d` they form a right-handed basis.
    pub fn tangent_basis(self) -> (DVec3, DVec3) {
        let d = self.0;
        let mut u = DVec3::Z.cross(d);
        if u.length_squared() < 1e-12 {
            u = DVec3::X.cross(d);
        }
        let u = u.normalize();
        let v = d.cross(u);
        (u, v)
    }

    /// Move along a tangent by a small angular step and renormalize.
    pub fn offset(self, tangent: DVec3, step: f64) -> Self {
        Self::new(self.0 + tangent * step).unwrap_or(self)
    }
}

fn key_scale(precision: u32) -> f64 {
    10f64.powi(precision.min(MAX_KEY_PRECISION) as i32)
}

impl From<Direction> for DVec3 {
    fn from(d: Direction) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes() {
        let d = Direction::new(DVec3::new(3.0, 0.0, 4.0)).unwrap();
        assert!((d.get().length() - 1.0).abs() < 1e-12);
        assert!((d.get().x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert!(Direction::new(DVec3::ZERO).is_none());
        assert!(Direction::new(DVec3::new(f64::NAN, 1.0, 0.0)).is_none());
        assert!(Direction::new(DVec3::new(f64::INFINITY, 0.0, 0.0)).is_none());
        assert!(Direction::new(DVec3::splat(1e-12)).is_none());
    }

    #[test]
    fn test_tangent_basis_is_orthonormal() {
        let dirs = [
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
            DVec3::NEG_Z,
            DVec3::new(1.0, -2.0, 0.5),
            DVec3::new(1e-9, 0.0, 1.0),
        ];
        for v in dirs {
            let d = Direction::new(v).unwrap();
            let (u, w) = d.tangent_basis();
            assert!((u.length() - 1.0).abs() < 1e-9, "u not unit for {v:?}");
            assert!((w.length() - 1.0).abs() < 1e-9, "v not unit for {v:?}");
            assert!(u.dot(d.get()).abs() < 1e-9, "u not tangent for {v:?}");
            assert!(w.dot(d.get()).abs() < 1e-9, "v not tangent for {v:?}");
            assert!(u.dot(w).abs() < 1e-9, "u and v not orthogonal for {v:?}");
            assert!(
                (u.cross(w) - d.get()).length() < 1e-9,
                "basis not right-handed for {v:?}"
            );
        }
    }

    #[test]
    fn test_key_merges_nearby_directions() {
        let a = Direction::new(DVec3::new(1.0, 0.2, 0.3)).unwrap();
        let b = Direction::new(DVec3::new(1.0, 0.2, 0.3 + 1e-10)).unwrap();
        let c = Direction::new(DVec3::new(1.0, 0.25, 0.3)).unwrap();
        assert_eq!(a.key(6), b.key(6));
        assert_ne!(a.key(6), c.key(6));
    }

    #[test]
    fn test_oversized_precision_keeps_directions_apart() {
        let a = Direction::new(DVec3::new(1.0, 0.5, 0.5)).unwrap();
        let b = Direction::new(DVec3::new(0.5, 1.0, 0.7)).unwrap();
        for precision in [MAX_KEY_PRECISION, 19, 20, 40, u32::MAX] {
            assert_ne!(a.key(precision), b.key(precision), "precision {precision}");
        }
        assert_eq!(a.key(u32::MAX), a.key(MAX_KEY_PRECISION));
    }

    #[test]
    fn test_snapped_is_shared_by_the_whole_cell() {
        let a = Direction::new(DVec3::new(1.0, 0.5, 0.5)).unwrap();
        let b = Direction::new(a.get() + DVec3::new(1e-3, -1e-3, 0.0)).unwrap();
        assert_eq!(a.key(2), b.key(2));
        assert_eq!(a.snapped(2), b.snapped(2));
        assert!((a.snapped(2).get().length() - 1.0).abs() < 1e-12);
        assert!((a.snapped(6).get() - a.get()).length() < 1e-5);
    }

    #[test]
    fn test_from_spherical_poles() {
        let north = Direction::from_spherical(0.0, 1.234);
        assert!((north.get() - DVec3::Z).length() < 1e-12);
        let south = Direction::from_spherical(std::f64::consts::PI, 0.0);
        assert!((south.get() - DVec3::NEG_Z).length() < 1e-12);
    }
}
