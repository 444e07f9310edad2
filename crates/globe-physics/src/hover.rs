//! Spring-damper hover that keeps a body at a fixed height above the terrain.

use std::sync::Arc;

use glam::{DVec3, Vec3};
use globe_terrain::{Terrain, TerrainProvider};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::body::SimBody;

/// Spring stiffness multiplier while the body is below its target height.
pub const BELOW_TARGET_SPRING_MULTIPLIER: f32 = 1.5;
/// Damping multiplier while the body is moving toward the planet.
pub const FALLING_DAMPING_MULTIPLIER: f32 = 2.0;

const MIN_HOVER_DISTANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Target distance above the terrain surface, in meters.
    pub hover_height: f32,
    /// Nominal spring stiffness (N per meter of error).
    pub spring: f32,
    /// Nominal damping coefficient (N per m/s of radial velocity).
    pub damping: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            hover_height: 20.0,
            spring: 50.0,
            damping: 5.0,
        }
    }
}

/// Forces computed for one body on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverForce {
    /// Restoring force along the radial direction.
    pub spring: Vec3,
    /// Resistive force opposing radial velocity.
    pub damping: Vec3,
    /// `target - distance`; positive when the body is below its target.
    pub error: f32,
}

impl HoverForce {
    pub fn total(&self) -> Vec3 {
        self.spring + self.damping
    }
}

/// Holds a body at `hover_height` above whatever terrain lies beneath it.
pub struct HoverController {
    config: HoverConfig,
    terrain: Arc<Terrain>,
    degenerate: u64,
}

impl HoverController {
    pub fn new(config: HoverConfig, terrain: Arc<Terrain>) -> Self {
        Self {
            config,
            terrain,
            degenerate: 0,
        }
    }

    pub fn config(&self) -> &HoverConfig {
        &self.config
    }

    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.terrain
    }

    /// Ticks on which the hover force was skipped.
    pub fn degenerate_count(&self) -> u64 {
        self.degenerate
    }

    /// Distance from the planet center the body should sit at, along `position`.
    pub fn target_distance(&self, position: Vec3) -> Option<f64> {
        let p = position.as_dvec3();
        let dist = p.length();
        if !dist.is_finite() || dist < MIN_HOVER_DISTANCE {
            return None;
        }
        let target = self.terrain.height_at(Some(p / dist)) + f64::from(self.config.hover_height);
        target.is_finite().then_some(target)
    }

    /// Hover forces for a body with the given kinematic state.
    ///
    /// Returns `None` if the position is at the center or any intermediate is NaN.
    pub fn compute(&self, position: Vec3, velocity: Vec3) -> Option<HoverForce> {
        let p = position.as_dvec3();
        let dist = p.length();
        if !dist.is_finite() || dist < MIN_HOVER_DISTANCE {
            return None;
        }
        let direction: DVec3 = p / dist;
        let target = self.terrain.height_at(Some(direction)) + f64::from(self.config.hover_height);
        let error = (target - dist) as f32;

        let stiffness = if error > 0.0 {
            self.config.spring * BELOW_TARGET_SPRING_MULTIPLIER
        } else {
            self.config.spring
        };
        let direction = direction.as_vec3();
        let spring = direction * error * stiffness;

        let radial_velocity = velocity.dot(direction);
        let coefficient = if radial_velocity < 0.0 {
            self.config.damping * FALLING_DAMPING_MULTIPLIER
        } else {
            self.config.damping
        };
        let damping = -direction * radial_velocity * coefficient;

        let force = HoverForce {
            spring,
            damping,
            error,
        };
        (error.is_finite() && spring.is_finite() && damping.is_finite()).then_some(force)
    }

    /// Compute and apply this tick's hover force. A skipped body gets no force.
    pub fn apply<B: SimBody + ?Sized>(&mut self, body: &mut B) -> Option<HoverForce> {
        let position = body.position();
        let velocity = body.velocity();
        match self.compute(position, velocity) {
            Some(force) => {
                body.apply_force(force.total());
                Some(force)
            }
            None => {
                self.degenerate += 1;
                warn!(?position, ?velocity, "hover force skipped for degenerate state");
                None
            }
        }
    }
}
