//! Physics for surface riders: spherical gravity, terrain hover, and surface-aligned steering.
//!
//! Wraps the Rapier 3D physics engine behind a single [`PhysicsWorld`] that
//! owns all simulation state. World gravity is zero; every downward pull comes
//! from [`SphericalGravity`] so "down" always points at the planet center.

mod body;
mod gravity;
mod hover;
mod locomotion;
mod orientation;
mod simulation;

pub use body::SimBody;
pub use gravity::{GravityConfig, SphericalGravity};
pub use hover::{
    BELOW_TARGET_SPRING_MULTIPLIER, FALLING_DAMPING_MULTIPLIER, HoverConfig, HoverController,
    HoverForce,
};
pub use locomotion::{
    AlignTarget, BodyLocomotion, FrameLocomotion, LastGoodFrame, LocomotionConfig,
    LocomotionController,
};
pub use orientation::{
    CANONICAL_FORWARD, CANONICAL_UP, align_orientation, extract_yaw, project_onto_plane,
    steer_rotation, surface_frame, tangent_yaw, yaw_reference,
};
pub use simulation::{RiderConfig, RiderId, RiderTelemetry, SurfaceRider, SurfaceSimulation};

use rapier3d::prelude::*;

/// Fixed physics timestep in seconds (60 Hz).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Central physics simulation state owning all Rapier sets and pipelines.
pub struct PhysicsWorld {
    /// Uniform world gravity. Kept at zero; spherical gravity is applied per body.
    pub gravity: Vector,
    /// Timestep and solver configuration.
    pub integration_parameters: IntegrationParameters,
    /// The main simulation pipeline.
    pub physics_pipeline: PhysicsPipeline,
    /// Tracks sleeping/awake body islands.
    pub island_manager: IslandManager,
    /// Broad-phase collision detection.
    pub broad_phase: BroadPhaseBvh,
    /// Narrow-phase collision detection (contact manifolds).
    pub narrow_phase: NarrowPhase,
    /// All rigid bodies in the simulation.
    pub rigid_body_set: RigidBodySet,
    /// All colliders in the simulation.
    pub collider_set: ColliderSet,
    /// Impulse-based joints.
    pub impulse_joint_set: ImpulseJointSet,
    /// Multibody joints.
    pub multibody_joint_set: MultibodyJointSet,
    /// Continuous collision detection solver.
    pub ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Creates an empty world with zero uniform gravity and a [`FIXED_DT`] step.
    pub fn new() -> Self {
        let integration_parameters = IntegrationParameters {
            dt: FIXED_DT,
            ..Default::default()
        };

        Self {
            gravity: Vector::new(0.0, 0.0, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Advances the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// The fixed step size in seconds.
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Inserts a body, optionally with a collider attached to it.
    pub fn add_body(&mut self, body: RigidBody, collider: Option<Collider>) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        if let Some(collider) = collider {
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        }
        handle
    }

    /// Removes a body and its colliders. Returns `false` if the handle was stale.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
