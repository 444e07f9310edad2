//! The slice of rigid-body state this crate reads and writes.
//!
//! Rapier may link a different glam version than the workspace, so values
//! cross the boundary component by component.

use glam::{Quat, Vec3};
use rapier3d::dynamics::RigidBody;
use rapier3d::math::Rotation;
use rapier3d::prelude::Vector;

/// Access to a rigid body owned by the external physics engine.
pub trait SimBody {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn orientation(&self) -> Quat;
    /// Overwrites the orientation. Implementations store it renormalized.
    fn set_orientation(&mut self, orientation: Quat);
    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
    fn mass(&self) -> f32;
    /// Adds a world-space force at the center of mass for the next step.
    fn apply_force(&mut self, force: Vec3);
    /// Clears forces accumulated from previous ticks.
    fn reset_forces(&mut self);
    /// Moves the body to `position` with no linear or angular velocity.
    fn place_at_rest(&mut self, position: Vec3);
}

impl SimBody for RigidBody {
    fn position(&self) -> Vec3 {
        let t = self.translation();
        Vec3::new(t.x, t.y, t.z)
    }

    fn velocity(&self) -> Vec3 {
        let v = self.linvel();
        Vec3::new(v.x, v.y, v.z)
    }

    fn orientation(&self) -> Quat {
        let r = self.rotation();
        Quat::from_xyzw(r.x, r.y, r.z, r.w)
    }

    fn set_orientation(&mut self, orientation: Quat) {
        let q = orientation.normalize();
        self.set_rotation(Rotation::from_xyzw(q.x, q.y, q.z, q.w), true);
    }

    fn angular_velocity(&self) -> Vec3 {
        let w = self.angvel();
        Vec3::new(w.x, w.y, w.z)
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        let w = angular_velocity;
        self.set_angvel(Vector::new(w.x, w.y, w.z), true);
    }

    fn mass(&self) -> f32 {
        RigidBody::mass(self)
    }

    fn apply_force(&mut self, force: Vec3) {
        self.add_force(Vector::new(force.x, force.y, force.z), true);
    }

    fn reset_forces(&mut self) {
        RigidBody::reset_forces(self, true);
    }

    fn place_at_rest(&mut self, position: Vec3) {
        self.set_translation(Vector::new(position.x, position.y, position.z), true);
        self.set_linvel(Vector::new(0.0, 0.0, 0.0), true);
        self.set_angvel(Vector::new(0.0, 0.0, 0.0), true);
    }
}
