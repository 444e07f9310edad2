//! Center-directed gravity applied per body each fixed tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PhysicsWorld;
use crate::body::SimBody;

/// Positions closer than this to the planet center have no usable "down".
const MIN_GRAVITY_DISTANCE: f32 = 1e-4;

/// Strength of the pull toward the planet center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Acceleration in m/s² toward the center, independent of altitude.
    pub strength: f32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self { strength: 20.0 }
    }
}

/// Applies `-normalize(position) * strength * mass` to every dynamic body.
///
/// Must run once per tick, after forces were reset and before
/// [`PhysicsWorld::step`].
#[derive(Debug, Default)]
pub struct SphericalGravity {
    config: GravityConfig,
    degenerate: u64,
}

impl SphericalGravity {
    pub fn new(config: GravityConfig) -> Self {
        Self {
            config,
            degenerate: 0,
        }
    }

    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    /// Number of bodies skipped so far because their position was unusable.
    pub fn degenerate_count(&self) -> u64 {
        self.degenerate
    }

    /// The gravity force for a body at `position` with `mass`, if one exists.
    pub fn force_at(&self, position: Vec3, mass: f32) -> Option<Vec3> {
        let length = position.length();
        if !length.is_finite() || length < MIN_GRAVITY_DISTANCE {
            return None;
        }
        let force = -(position / length) * self.config.strength * mass;
        force.is_finite().then_some(force)
    }

    /// Pull a single body toward the center. Returns the applied force.
    pub fn apply_to<B: SimBody + ?Sized>(&mut self, body: &mut B) -> Option<Vec3> {
        let position = body.position();
        match self.force_at(position, body.mass()) {
            Some(force) => {
                body.apply_force(force);
                Some(force)
            }
            None => {
                self.degenerate += 1;
                warn!(?position, "skipping gravity for body with degenerate position");
                None
            }
        }
    }

    /// Pull every dynamic body in `world`. Fixed and kinematic bodies are
    /// untouched. Returns how many bodies received a force.
    pub fn apply(&mut self, world: &mut PhysicsWorld) -> usize {
        let mut applied = 0;
        for (_, body) in world.rigid_body_set.iter_mut() {
            if !body.is_dynamic() {
                continue;
            }
            if self.apply_to(body).is_some() {
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::prelude::*;

    fn dynamic_ball(world: &mut PhysicsWorld, x: f32, y: f32, z: f32) -> RigidBodyHandle {
        world.add_body(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(x, y, z))
                .can_sleep(false)
                .build(),
            Some(ColliderBuilder::ball(0.5).mass(2.0).build()),
        )
    }

    #[test]
    fn test_force_points_at_center_and_scales_with_mass() {
        let gravity = SphericalGravity::new(GravityConfig { strength: 10.0 });
        let f = gravity.force_at(Vec3::new(0.0, 0.0, 500.0), 3.0).unwrap();
        assert!((f - Vec3::new(0.0, 0.0, -30.0)).length() < 1e-4, "force {f:?}");
    }

    #[test]
    fn test_degenerate_positions_have_no_force() {
        let gravity = SphericalGravity::default();
        assert!(gravity.force_at(Vec3::ZERO, 1.0).is_none());
        assert!(gravity.force_at(Vec3::splat(f32::NAN), 1.0).is_none());
        assert!(
            gravity
                .force_at(Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0)
                .is_none()
        );
    }

    #[test]
    fn test_bodies_fall_toward_center_from_any_side() {
        let mut world = PhysicsWorld::new();
        let mut gravity = SphericalGravity::new(GravityConfig { strength: 9.81 });
        let starts = [
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(0.0, -100.0, 0.0),
            Vec3::new(0.0, 60.0, -80.0),
        ];
        let handles: Vec<_> = starts
            .iter()
            .map(|p| dynamic_ball(&mut world, p.x, p.y, p.z))
            .collect();

        for _ in 0..30 {
            for (_, body) in world.rigid_body_set.iter_mut() {
                SimBody::reset_forces(body);
            }
            assert_eq!(gravity.apply(&mut world), 3);
            world.step();
        }

        for (handle, start) in handles.iter().zip(starts) {
            let pos = SimBody::position(&world.rigid_body_set[*handle]);
            assert!(
                pos.length() < start.length() - 0.5,
                "body starting at {start:?} should have fallen, now at {pos:?}"
            );
            let drift = pos.normalize().dot(start.normalize());
            assert!(drift > 0.9999, "body left its radial line: {drift}");
        }
    }

    #[test]
    fn test_fixed_bodies_are_skipped() {
        let mut world = PhysicsWorld::new();
        world.add_body(
            RigidBodyBuilder::fixed().build(),
            Some(ColliderBuilder::ball(10.0).build()),
        );
        dynamic_ball(&mut world, 0.0, 50.0, 0.0);
        let mut gravity = SphericalGravity::default();
        assert_eq!(gravity.apply(&mut world), 1);
        assert_eq!(gravity.degenerate_count(), 0);
    }

    #[test]
    fn test_body_at_center_is_skipped_and_counted() {
        let mut world = PhysicsWorld::new();
        let handle = dynamic_ball(&mut world, 0.0, 0.0, 0.0);
        let mut gravity = SphericalGravity::default();
        assert_eq!(gravity.apply(&mut world), 0);
        assert_eq!(gravity.degenerate_count(), 1);
        world.step();
        let pos = SimBody::position(&world.rigid_body_set[handle]);
        assert!(pos.is_finite(), "skipped body must stay finite: {pos:?}");
    }
}
