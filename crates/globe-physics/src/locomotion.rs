//! Steering, surface alignment and thrust for entities moving over a planet.
//!
//! Two implementations share one contract: [`BodyLocomotion`] drives a rigid
//! body through its orientation quaternion, [`FrameLocomotion`] keeps an
//! explicit orthonormal frame for entities that are not simulated.

use glam::{Mat3, Quat, Vec3};
use globe_terrain::TerrainProvider;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::body::SimBody;
use crate::orientation::{
    CANONICAL_FORWARD, CANONICAL_UP, align_orientation, project_onto_plane, steer_rotation,
    surface_frame, tangent_yaw, yaw_reference,
};

const MIN_AXIS_LENGTH_SQ: f32 = 1e-8;

/// Which "up" a rider aligns to each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignTarget {
    /// Straight away from the planet center.
    #[default]
    Radial,
    /// The terrain normal below the rider.
    SurfaceNormal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Heading change at full steering input, in rad/s.
    pub turn_rate: f32,
    /// Speed thrust drives toward along the tangent forward, in m/s.
    pub cruise_speed: f32,
    /// How quickly tangent velocity tracks the cruise velocity, in 1/s.
    pub response: f32,
    pub align_to: AlignTarget,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            turn_rate: 2.5,
            cruise_speed: 12.0,
            response: 4.0,
            align_to: AlignTarget::Radial,
        }
    }
}

/// Last frame known to be numerically sound, used when the current one is not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastGoodFrame {
    pub position: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Default for LastGoodFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            up: CANONICAL_UP,
            forward: CANONICAL_FORWARD,
        }
    }
}

/// Normalized `v`, or `None` when it is too short or not finite.
fn unit(v: Vec3) -> Option<Vec3> {
    (v.is_finite() && v.length_squared() >= MIN_AXIS_LENGTH_SQ).then(|| v.normalize())
}

/// Shared contract of every way an entity moves over the surface.
///
/// Per tick the caller runs `steer`, `align_to_surface`, `thrust`, then
/// aligns again once the new position is known.
pub trait LocomotionController {
    /// Turn around the current up axis. `input` is clamped to `[-1, 1]`;
    /// positive turns right.
    fn steer(&mut self, input: f32, dt: f32);

    /// Tilt so the up axis matches `up`, keeping the heading.
    fn align_to_surface(&mut self, up: Vec3);

    /// Push forward along the tangent plane. Returns the applied force or
    /// displacement.
    fn thrust(&mut self, dt: f32) -> Vec3;

    fn forward(&self) -> Vec3;

    fn up(&self) -> Vec3;

    /// Heading in the tangent plane of the current up axis.
    fn yaw(&self) -> Option<f32> {
        tangent_yaw(self.forward(), self.up())
    }
}

/// Locomotion over a physics body, driven by forces and direct orientation writes.
pub struct BodyLocomotion<'a, B: SimBody + ?Sized> {
    body: &'a mut B,
    config: &'a LocomotionConfig,
    last_good: &'a mut LastGoodFrame,
}

impl<'a, B: SimBody + ?Sized> BodyLocomotion<'a, B> {
    pub fn new(body: &'a mut B, config: &'a LocomotionConfig, last_good: &'a mut LastGoodFrame) -> Self {
        Self {
            body,
            config,
            last_good,
        }
    }

    /// Radial up at the body's position, or the last good up.
    pub fn radial_up(&mut self) -> Vec3 {
        let position = self.body.position();
        match unit(position) {
            Some(up) => {
                self.last_good.position = position;
                up
            }
            None => {
                warn!(?position, "degenerate rider position, holding last good up");
                self.last_good.up
            }
        }
    }
}

impl<B: SimBody + ?Sized> LocomotionController for BodyLocomotion<'_, B> {
    fn steer(&mut self, input: f32, dt: f32) {
        let up = self.radial_up();
        let turned = steer_rotation(up, input, self.config.turn_rate, dt) * self.body.orientation();
        if turned.is_finite() {
            self.body.set_orientation(turned.normalize());
        }
    }

    fn align_to_surface(&mut self, up: Vec3) {
        let up = match unit(up) {
            Some(up) => up,
            None => {
                warn!(?up, "degenerate alignment target, holding last good up");
                self.last_good.up
            }
        };
        let current = self.body.orientation();
        let current = if current.is_finite() && current.length_squared() > 0.0 {
            current
        } else {
            let yaw = tangent_yaw(self.last_good.forward, up).unwrap_or(0.0);
            Quat::from_axis_angle(up, yaw) * surface_frame(up)
        };
        let aligned = align_orientation(current, up);
        self.body.set_orientation(aligned);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.last_good.up = up;
        self.last_good.forward = aligned * CANONICAL_FORWARD;
    }

    fn thrust(&mut self, _dt: f32) -> Vec3 {
        let up = self.radial_up();
        let tangent = unit(project_onto_plane(self.forward(), up))
            .or_else(|| unit(project_onto_plane(self.last_good.forward, up)))
            .unwrap_or_else(|| yaw_reference(up));
        let velocity = self.body.velocity();
        let tangential = project_onto_plane(velocity, up);
        let force = (tangent * self.config.cruise_speed - tangential)
            * self.config.response
            * self.body.mass();
        if !force.is_finite() {
            warn!(?velocity, "thrust force not finite, skipped");
            return Vec3::ZERO;
        }
        self.body.apply_force(force);
        force
    }

    fn forward(&self) -> Vec3 {
        self.body.orientation() * CANONICAL_FORWARD
    }

    fn up(&self) -> Vec3 {
        self.body.orientation() * CANONICAL_UP
    }
}

/// Locomotion for an entity that is moved kinematically over the terrain.
///
/// `direction`, `up` and `right` stay orthonormal with
/// `right = direction × up`.
#[derive(Debug, Clone)]
pub struct FrameLocomotion {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    config: LocomotionConfig,
}

impl FrameLocomotion {
    /// Frame at `position`, facing as close to `heading` as the tangent plane allows.
    pub fn new(position: Vec3, heading: Vec3, config: LocomotionConfig) -> Self {
        let up = unit(position).unwrap_or(CANONICAL_UP);
        let direction = unit(project_onto_plane(heading, up)).unwrap_or_else(|| yaw_reference(up));
        Self {
            position,
            direction,
            up,
            right: direction.cross(up),
            config,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// The equivalent body orientation in the canonical frame.
    pub fn orientation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right, self.up, -self.direction)).normalize()
    }

    /// Re-project `position` onto the terrain at `hover_height`.
    pub fn settle_on(&mut self, terrain: &impl TerrainProvider, hover_height: f32) {
        let Some(radial) = unit(self.position) else {
            warn!(position = ?self.position, "degenerate frame position, not settled");
            return;
        };
        let height = terrain.height_at(Some(radial.as_dvec3())) + f64::from(hover_height);
        let settled = radial * height as f32;
        if settled.is_finite() {
            self.position = settled;
        }
    }

    /// One full tick: steer, align, move, settle, and align at the new position.
    pub fn advance(
        &mut self,
        terrain: &impl TerrainProvider,
        hover_height: f32,
        input: f32,
        dt: f32,
    ) {
        self.steer(input, dt);
        self.align_to_surface(self.surface_up(terrain));
        self.thrust(dt);
        self.settle_on(terrain, hover_height);
        self.align_to_surface(self.surface_up(terrain));
    }

    fn surface_up(&self, terrain: &impl TerrainProvider) -> Vec3 {
        match self.config.align_to {
            AlignTarget::Radial => unit(self.position).unwrap_or(self.up),
            AlignTarget::SurfaceNormal => {
                unit(terrain.normal_at(self.position.as_dvec3()).as_vec3()).unwrap_or(self.up)
            }
        }
    }
}

impl LocomotionController for FrameLocomotion {
    fn steer(&mut self, input: f32, dt: f32) {
        let rotation = steer_rotation(self.up, input, self.config.turn_rate, dt);
        let Some(right) = unit((rotation * self.direction).cross(self.up)) else {
            return;
        };
        self.right = right;
        self.direction = self.up.cross(right).normalize();
    }

    fn align_to_surface(&mut self, up: Vec3) {
        let Some(up) = unit(up) else {
            warn!(?up, "degenerate alignment target, frame unchanged");
            return;
        };
        let right = unit(self.direction.cross(up))
            .unwrap_or_else(|| yaw_reference(up).cross(up));
        self.up = up;
        self.right = right;
        self.direction = up.cross(right).normalize();
    }

    fn thrust(&mut self, dt: f32) -> Vec3 {
        let displacement = self.direction * self.config.cruise_speed * dt;
        self.position += displacement;
        displacement
    }

    fn forward(&self) -> Vec3 {
        self.direction
    }

    fn up(&self) -> Vec3 {
        self.up
    }
}
