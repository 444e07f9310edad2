//! Riders hovering over a planet, advanced one fixed tick at a time.

use std::sync::Arc;

use glam::Vec3;
use globe_terrain::{Direction, Terrain, TerrainProvider};
use rapier3d::prelude::*;
use tracing::{debug, info, warn};

use crate::body::SimBody;
use crate::gravity::{GravityConfig, SphericalGravity};
use crate::hover::{HoverConfig, HoverController};
use crate::locomotion::{AlignTarget, BodyLocomotion, LastGoodFrame, LocomotionConfig, LocomotionController};
use crate::orientation::{CANONICAL_FORWARD, CANONICAL_UP, extract_yaw, surface_frame};
use crate::PhysicsWorld;

/// Physical properties and controller tuning of one rider.
#[derive(Debug, Clone, PartialEq)]
pub struct RiderConfig {
    pub mass: f32,
    /// Radius of the rider's ball collider.
    pub radius: f32,
    pub hover: HoverConfig,
    pub locomotion: LocomotionConfig,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 1.0,
            hover: HoverConfig::default(),
            locomotion: LocomotionConfig::default(),
        }
    }
}

/// Index of a rider inside a [`SurfaceSimulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiderId(usize);

/// Per-rider measurements taken after each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiderTelemetry {
    /// Height above the terrain surface.
    pub altitude: f32,
    /// Target distance minus actual distance; positive when too low.
    pub hover_error: f32,
    pub speed: f32,
    pub yaw: Option<f32>,
    /// Angle in radians between the body's up axis and the surface up.
    pub alignment_error: f32,
}

/// A rigid body that hovers and steers over the terrain.
pub struct SurfaceRider {
    handle: RigidBodyHandle,
    steer_input: f32,
    hover: HoverController,
    locomotion: LocomotionConfig,
    last_good: LastGoodFrame,
    telemetry: RiderTelemetry,
    recoveries: u64,
}

impl SurfaceRider {
    pub fn handle(&self) -> RigidBodyHandle {
        self.handle
    }

    pub fn steer_input(&self) -> f32 {
        self.steer_input
    }

    pub fn telemetry(&self) -> &RiderTelemetry {
        &self.telemetry
    }

    pub fn hover(&self) -> &HoverController {
        &self.hover
    }

    pub fn last_good(&self) -> &LastGoodFrame {
        &self.last_good
    }

    /// Times the body was put back at its last good position.
    pub fn recoveries(&self) -> u64 {
        self.recoveries
    }
}

/// Put a body whose position or velocity went bad back at rest at its last
/// good position.
fn restore_if_corrupt(index: usize, rider: &mut SurfaceRider, body: &mut RigidBody) {
    let position = SimBody::position(&*body);
    let velocity = SimBody::velocity(&*body);
    if position.is_finite() && velocity.is_finite() && position.length_squared() > MIN_RADIUS_SQ {
        return;
    }
    warn!(
        rider = index,
        ?position,
        ?velocity,
        restored = ?rider.last_good.position,
        "rider state degenerate, restoring last good position"
    );
    body.place_at_rest(rider.last_good.position);
    rider.recoveries += 1;
}

/// Squared distance from the planet center below which a rider position is unusable.
const MIN_RADIUS_SQ: f32 = 1e-8;

/// Up axis a rider aligns to at `position`, or zero when there is none.
fn surface_up(terrain: &Terrain, position: Vec3, target: AlignTarget) -> Vec3 {
    match target {
        AlignTarget::Radial => position.normalize_or_zero(),
        AlignTarget::SurfaceNormal => match Direction::new(position.as_dvec3()) {
            Some(d) => terrain.surface_normal(d.get()).as_vec3(),
            None => Vec3::ZERO,
        },
    }
}

/// Angle between two unit vectors, accurate near zero.
fn angle_between(a: Vec3, b: Vec3) -> f32 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Owns the physics world, the planet and its riders.
pub struct SurfaceSimulation {
    physics: PhysicsWorld,
    terrain: Arc<Terrain>,
    gravity: SphericalGravity,
    planet: RigidBodyHandle,
    riders: Vec<Option<SurfaceRider>>,
    tick_count: u64,
}

impl SurfaceSimulation {
    pub fn new(terrain: Arc<Terrain>, gravity: GravityConfig) -> Self {
        let mut physics = PhysicsWorld::new();
        let planet = physics.add_body(RigidBodyBuilder::fixed().build(), None);
        info!(
            radius = terrain.radius(),
            procedural = terrain.is_procedural(),
            gravity = gravity.strength,
            "surface simulation created"
        );
        Self {
            physics,
            terrain,
            gravity: SphericalGravity::new(gravity),
            planet,
            riders: Vec::new(),
            tick_count: 0,
        }
    }

    /// Place a rider at hover height above the terrain along `direction`,
    /// aligned to the surface with zero yaw.
    pub fn spawn_rider(&mut self, direction: Vec3, config: &RiderConfig) -> Option<RiderId> {
        let Some(dir) = Direction::new(direction.as_dvec3()) else {
            warn!(?direction, "cannot spawn rider along a degenerate direction");
            return None;
        };
        let distance = self.terrain.height_at(Some(dir.get())) + f64::from(config.hover.hover_height);
        let position = (dir.get() * distance).as_vec3();
        let up = match surface_up(&self.terrain, position, config.locomotion.align_to) {
            up if up.length_squared() > 0.0 => up,
            _ => dir.get().as_vec3(),
        };
        let orientation = surface_frame(up);

        let mut body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y, position.z))
            .can_sleep(false)
            .build();
        body.set_orientation(orientation);
        let collider = ColliderBuilder::ball(config.radius).mass(config.mass).build();
        let handle = self.physics.add_body(body, Some(collider));

        let rider = SurfaceRider {
            handle,
            steer_input: 0.0,
            hover: HoverController::new(config.hover.clone(), Arc::clone(&self.terrain)),
            locomotion: config.locomotion.clone(),
            last_good: LastGoodFrame {
                position,
                up,
                forward: orientation * CANONICAL_FORWARD,
            },
            telemetry: RiderTelemetry::default(),
            recoveries: 0,
        };
        let id = match self.riders.iter().position(Option::is_none) {
            Some(free) => {
                self.riders[free] = Some(rider);
                RiderId(free)
            }
            None => {
                self.riders.push(Some(rider));
                RiderId(self.riders.len() - 1)
            }
        };
        info!(rider = id.0, ?position, "rider spawned");
        Some(id)
    }

    /// Remove a rider and its body. Returns `false` for unknown ids.
    ///
    /// The id is freed and may be handed to the next spawned rider.
    pub fn despawn_rider(&mut self, id: RiderId) -> bool {
        let Some(rider) = self.riders.get_mut(id.0).and_then(Option::take) else {
            return false;
        };
        let removed = self.physics.remove_body(rider.handle);
        info!(rider = id.0, "rider despawned");
        removed
    }

    /// Steering input applied on following ticks, clamped to `[-1, 1]`.
    pub fn set_steer(&mut self, id: RiderId, input: f32) -> bool {
        match self.rider_mut(id) {
            Some(rider) => {
                rider.steer_input = if input.is_finite() { input.clamp(-1.0, 1.0) } else { 0.0 };
                true
            }
            None => false,
        }
    }

    /// Advance by one fixed step.
    ///
    /// Per rider: restore a corrupt body to its last good position, clear
    /// forces, steer, align, thrust and hover. Then gravity for every
    /// dynamic body, the integrator step, and a final alignment at the new
    /// positions.
    pub fn tick(&mut self) {
        let dt = self.physics.dt();
        let Self {
            physics,
            terrain,
            gravity,
            riders,
            ..
        } = self;
        let terrain: &Terrain = terrain;

        for (index, rider) in riders.iter_mut().enumerate() {
            let Some(rider) = rider else {
                continue;
            };
            let Some(body) = physics.rigid_body_set.get_mut(rider.handle) else {
                continue;
            };
            restore_if_corrupt(index, rider, body);
            SimBody::reset_forces(&mut *body);
            let up = surface_up(terrain, SimBody::position(&*body), rider.locomotion.align_to);
            let mut loco = BodyLocomotion::new(&mut *body, &rider.locomotion, &mut rider.last_good);
            loco.steer(rider.steer_input, dt);
            loco.align_to_surface(up);
            loco.thrust(dt);
            rider.hover.apply(body);
        }

        gravity.apply(physics);
        physics.step();

        for (index, rider) in riders.iter_mut().enumerate() {
            let Some(rider) = rider else {
                continue;
            };
            let Some(body) = physics.rigid_body_set.get_mut(rider.handle) else {
                continue;
            };
            restore_if_corrupt(index, rider, body);
            let position = SimBody::position(&*body);
            let up = surface_up(terrain, position, rider.locomotion.align_to);
            BodyLocomotion::new(&mut *body, &rider.locomotion, &mut rider.last_good)
                .align_to_surface(up);
            rider.telemetry = measure(terrain, &rider.hover, &*body, rider.last_good.up);
        }

        self.tick_count += 1;
        if self.tick_count % 600 == 0 {
            debug!(
                tick = self.tick_count,
                riders = self.rider_count(),
                gravity_skipped = self.gravity.degenerate_count(),
                "simulation heartbeat"
            );
        }
    }

    pub fn rider(&self, id: RiderId) -> Option<&SurfaceRider> {
        self.riders.get(id.0).and_then(Option::as_ref)
    }

    fn rider_mut(&mut self, id: RiderId) -> Option<&mut SurfaceRider> {
        self.riders.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live riders with their ids.
    pub fn riders(&self) -> impl Iterator<Item = (RiderId, &SurfaceRider)> {
        self.riders
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (RiderId(i), r)))
    }

    pub fn rider_count(&self) -> usize {
        self.riders.iter().flatten().count()
    }

    /// The rider's rigid body.
    pub fn body(&self, id: RiderId) -> Option<&RigidBody> {
        let rider = self.rider(id)?;
        self.physics.rigid_body_set.get(rider.handle)
    }

    pub fn planet_body(&self) -> RigidBodyHandle {
        self.planet
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.terrain
    }

    pub fn gravity(&self) -> &SphericalGravity {
        &self.gravity
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

fn measure(terrain: &Terrain, hover: &HoverController, body: &RigidBody, up: Vec3) -> RiderTelemetry {
    let position = SimBody::position(body);
    let velocity = SimBody::velocity(body);
    let orientation = SimBody::orientation(body);
    let distance = position.length();
    let ground = terrain.height_at(Direction::new(position.as_dvec3()).map(|d| d.get())) as f32;
    let hover_error = hover
        .target_distance(position)
        .map_or(0.0, |target| target as f32 - distance);
    RiderTelemetry {
        altitude: distance - ground,
        hover_error,
        speed: velocity.length(),
        yaw: extract_yaw(orientation, up),
        alignment_error: angle_between(orientation * CANONICAL_UP, up),
    }
}
