//! The terrain capability consumed by physics controllers and mesh builders.

use glam::DVec3;

use crate::direction::Direction;
use crate::planet::ProceduralPlanet;

/// Queries any planet surface must answer.
///
/// Implementations are chosen at composition time (see [`Terrain`]) and
/// injected into the controllers that need them.
pub trait TerrainProvider {
    /// Base radius of the planet's ideal sphere.
    fn radius(&self) -> f64;

    /// Signed elevation above the base radius along `direction`.
    fn sample_elevation(&self, direction: DVec3) -> f64;

    /// Outward unit surface normal along `direction`.
    ///
    /// A degenerate `direction` yields `+Y`.
    fn surface_normal(&self, direction: DVec3) -> DVec3;

    /// Point on the terrain surface: `d * (radius + elevation(d))`.
    ///
    /// A degenerate `direction` yields the planet center.
    fn surface_point(&self, direction: DVec3) -> DVec3 {
        match Direction::new(direction) {
            Some(d) => d.get() * (self.radius() + self.sample_elevation(d.get())),
            None => DVec3::ZERO,
        }
    }

    /// Distance from the center to the surface along `direction`, or the base
    /// radius when no direction is given.
    fn height_at(&self, direction: Option<DVec3>) -> f64 {
        match direction {
            Some(d) => self.radius() + self.sample_elevation(d),
            None => self.radius(),
        }
    }

    /// Surface normal below a world-space `position`.
    fn normal_at(&self, position: DVec3) -> DVec3 {
        self.surface_normal(position)
    }
}

/// Terrain variants available to a game session.
pub enum Terrain {
    /// Ideal sphere: zero elevation everywhere, normals are radial.
    BasicSphere { radius: f64 },
    /// Noise, ridges, valleys and craters.
    Procedural(ProceduralPlanet),
}

impl Terrain {
    pub fn is_procedural(&self) -> bool {
        matches!(self, Terrain::Procedural(_))
    }
}

impl TerrainProvider for Terrain {
    fn radius(&self) -> f64 {
        match self {
            Terrain::BasicSphere { radius } => *radius,
            Terrain::Procedural(planet) => planet.radius(),
        }
    }

    fn sample_elevation(&self, direction: DVec3) -> f64 {
        match self {
            Terrain::BasicSphere { .. } => 0.0,
            Terrain::Procedural(planet) => planet.sample_elevation(direction),
        }
    }

    fn surface_normal(&self, direction: DVec3) -> DVec3 {
        let Some(d) = Direction::new(direction) else {
            return DVec3::Y;
        };
        match self {
            Terrain::BasicSphere { .. } => d.get(),
            Terrain::Procedural(planet) => planet.surface_normal(d),
        }
    }
}
