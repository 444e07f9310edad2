//! Yaw-preserving alignment of an orientation to a surface "up".
//!
//! Bodies use the canonical frame of the camera: `+Y` is up and `-Z` is
//! forward. Yaw is measured in the tangent plane of `up`, counter-clockwise
//! seen from above, from a reference tangent derived from world `+X`.

use glam::{Mat3, Quat, Vec3};

pub const CANONICAL_UP: Vec3 = Vec3::Y;
pub const CANONICAL_FORWARD: Vec3 = Vec3::NEG_Z;

/// Tangent projections shorter than this (squared) are treated as degenerate.
const MIN_TANGENT_LENGTH_SQ: f32 = 1e-8;

/// Remove the component of `v` along the unit vector `normal`.
pub fn project_onto_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Zero-yaw forward direction in the tangent plane of `up`.
///
/// World `+X` projected onto the plane, or `+Z` when `up` is parallel to `X`.
pub fn yaw_reference(up: Vec3) -> Vec3 {
    let reference = project_onto_plane(Vec3::X, up);
    if reference.length_squared() > 1e-6 {
        reference.normalize()
    } else {
        project_onto_plane(Vec3::Z, up).normalize()
    }
}

/// Signed yaw of `forward` around `up`, or `None` if `forward` is (nearly)
/// parallel to `up`.
pub fn tangent_yaw(forward: Vec3, up: Vec3) -> Option<f32> {
    let tangent = project_onto_plane(forward, up);
    if !tangent.is_finite() || tangent.length_squared() < MIN_TANGENT_LENGTH_SQ {
        return None;
    }
    let tangent = tangent.normalize();
    let reference = yaw_reference(up);
    Some(
        reference
            .cross(tangent)
            .dot(up)
            .atan2(reference.dot(tangent)),
    )
}

/// Yaw of an orientation's forward vector around `up`.
pub fn extract_yaw(orientation: Quat, up: Vec3) -> Option<f32> {
    tangent_yaw(orientation * CANONICAL_FORWARD, up)
}

/// The zero-yaw orientation whose up axis is `up`.
pub fn surface_frame(up: Vec3) -> Quat {
    let forward = yaw_reference(up);
    let right = forward.cross(up);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

/// Rotate `orientation` so its up axis is `up`, keeping its yaw.
///
/// A forward vector parallel to `up` carries no yaw; the result then has
/// yaw 0. `up` must be unit length.
pub fn align_orientation(orientation: Quat, up: Vec3) -> Quat {
    let yaw = extract_yaw(orientation, up).unwrap_or(0.0);
    (Quat::from_axis_angle(up, yaw) * surface_frame(up)).normalize()
}

/// Heading change for one tick of steering. Positive input turns right.
pub fn steer_rotation(up: Vec3, input: f32, turn_rate: f32, dt: f32) -> Quat {
    Quat::from_axis_angle(up, -input.clamp(-1.0, 1.0) * turn_rate * dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_vec_near(a: Vec3, b: Vec3, tol: f32) {
        assert!((a - b).length() < tol, "expected {b:?}, got {a:?}");
    }

    #[test]
    fn test_surface_frame_maps_canonical_axes() {
        let up = Vec3::new(1.0, 1.0, 1.0).normalize();
        let q = surface_frame(up);
        assert_vec_near(q * CANONICAL_UP, up, 1e-5);
        assert_vec_near(q * CANONICAL_FORWARD, yaw_reference(up), 1e-5);
        assert!(extract_yaw(q, up).unwrap().abs() < 1e-5);
    }

    #[test]
    fn test_yaw_reference_handles_x_aligned_up() {
        assert_vec_near(yaw_reference(Vec3::X), Vec3::Z, 1e-6);
        assert_vec_near(yaw_reference(Vec3::NEG_X), Vec3::Z, 1e-6);
        assert_vec_near(yaw_reference(Vec3::Y), Vec3::X, 1e-6);
    }

    #[test]
    fn test_identity_on_north_pole_yaw() {
        // Identity faces -Z; the reference on +Y is +X, a quarter turn clockwise of -Z.
        let yaw = extract_yaw(Quat::IDENTITY, Vec3::Y).unwrap();
        assert!((yaw - FRAC_PI_2).abs() < 1e-5, "yaw {yaw}");
    }

    #[test]
    fn test_align_scenario_up_is_radial() {
        let aligned = align_orientation(Quat::IDENTITY, Vec3::X);
        assert_vec_near(aligned * CANONICAL_UP, Vec3::X, 1e-5);
        assert!((aligned.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_preserved_under_small_tilt() {
        let up_a = Vec3::new(0.3, 0.9, -0.2).normalize();
        let tilt_axis = up_a.any_orthonormal_vector();
        let up_b = Quat::from_axis_angle(tilt_axis, 5f32.to_radians()) * up_a;

        for yaw in [-2.5f32, -1.0, 0.0, 0.4, 1.7, 3.0] {
            let q = Quat::from_axis_angle(up_a, yaw) * surface_frame(up_a);
            let original = extract_yaw(q, up_a).unwrap();
            let realigned = align_orientation(q, up_b);
            let after = extract_yaw(realigned, up_b).unwrap();
            let mut diff = (after - extract_yaw(q, up_b).unwrap()).abs();
            if diff > PI {
                diff = 2.0 * PI - diff;
            }
            assert!(diff < 1e-3, "yaw {yaw}: drifted by {diff}");
            assert!((original - yaw).abs() < 1e-4, "yaw {yaw} read back as {original}");
            assert_vec_near(realigned * CANONICAL_UP, up_b, 1e-5);
        }
    }

    #[test]
    fn test_realign_is_idempotent() {
        let up = Vec3::new(-0.2, 0.4, 0.9).normalize();
        let q = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 0.7);
        let once = align_orientation(q, up);
        let twice = align_orientation(once, up);
        assert!(once.abs_diff_eq(twice, 1e-5) || once.abs_diff_eq(-twice, 1e-5));
    }

    #[test]
    fn test_forward_parallel_to_up_falls_back_to_zero_yaw() {
        // Forward (-Z) points straight along up = -Z.
        assert!(extract_yaw(Quat::IDENTITY, Vec3::NEG_Z).is_none());
        let aligned = align_orientation(Quat::IDENTITY, Vec3::NEG_Z);
        assert!(aligned.is_finite());
        assert_vec_near(aligned * CANONICAL_UP, Vec3::NEG_Z, 1e-5);
        assert!(extract_yaw(aligned, Vec3::NEG_Z).unwrap().abs() < 1e-5);
    }

    #[test]
    fn test_positive_steer_turns_right() {
        let up = Vec3::Y;
        let forward = Vec3::NEG_Z;
        let turned = steer_rotation(up, 1.0, FRAC_PI_2, 1.0) * forward;
        // Right of -Z with +Y up is +X.
        assert_vec_near(turned, Vec3::X, 1e-5);
    }

    #[test]
    fn test_steer_input_is_clamped() {
        let a = steer_rotation(Vec3::Y, 5.0, 1.0, 0.1);
        let b = steer_rotation(Vec3::Y, 1.0, 1.0, 0.1);
        assert!(a.abs_diff_eq(b, 1e-6));
    }
}
