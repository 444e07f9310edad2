//! A headless run: one planet, a few riders, scripted steering, telemetry.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Quat, Vec3};
use globe_config::Config;
use globe_physics::{RiderId, RiderTelemetry, SurfaceSimulation};
use globe_terrain::{ProceduralPlanet, Terrain, TerrainError};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to build terrain: {0}")]
    Terrain(#[from] TerrainError),

    #[error("spawn direction {0:?} has no usable length")]
    DegenerateSpawn([f32; 3]),
}

/// Worst-case figures over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub riders: usize,
    pub max_hover_error: f32,
    pub max_alignment_error: f32,
    pub mean_speed: f32,
}

pub struct Session {
    sim: SurfaceSimulation,
    riders: Vec<RiderId>,
    steer_amplitude: f32,
    steer_period_s: f32,
    telemetry_interval_s: f64,
    next_report_s: f64,
    summary: RunSummary,
    speed_sum: f64,
}

/// Pick the terrain variant the config asks for.
pub fn build_terrain(config: &Config) -> Result<Terrain, TerrainError> {
    if config.simulation.flat {
        config.terrain.validate()?;
        Ok(Terrain::BasicSphere {
            radius: config.terrain.base_radius,
        })
    } else {
        Ok(Terrain::Procedural(ProceduralPlanet::new(
            config.terrain.clone(),
        )?))
    }
}

/// Spawn directions for `count` riders, fanned along a great circle
/// through `first`.
fn spawn_directions(first: Vec3, count: u32) -> Vec<Vec3> {
    let axis = first.any_orthonormal_vector();
    let spacing = TAU / count.max(1) as f32 * 0.5;
    (0..count)
        .map(|i| Quat::from_axis_angle(axis, spacing * i as f32) * first)
        .collect()
}

impl Session {
    pub fn build(config: &Config) -> Result<Self, SessionError> {
        let terrain = Arc::new(build_terrain(config)?);
        let mut sim = SurfaceSimulation::new(terrain, config.gravity.clone());

        let [x, y, z] = config.simulation.spawn_direction;
        let first = Vec3::new(x, y, z)
            .try_normalize()
            .ok_or(SessionError::DegenerateSpawn([x, y, z]))?;
        let rider = config.rider();
        let mut riders = Vec::new();
        for direction in spawn_directions(first, config.simulation.riders) {
            let id = sim
                .spawn_rider(direction, &rider)
                .ok_or(SessionError::DegenerateSpawn(direction.to_array()))?;
            riders.push(id);
        }
        info!(
            riders = riders.len(),
            flat = config.simulation.flat,
            seed = config.terrain.seed,
            "session ready"
        );

        Ok(Self {
            sim,
            summary: RunSummary {
                riders: riders.len(),
                ..RunSummary::default()
            },
            riders,
            steer_amplitude: config.simulation.steer_amplitude.clamp(0.0, 1.0),
            steer_period_s: config.simulation.steer_period_s,
            telemetry_interval_s: config.debug.telemetry_interval_s,
            next_report_s: 0.0,
            speed_sum: 0.0,
        })
    }

    /// Scripted steering for rider `index` at `sim_time`: a sine sweep with
    /// per-rider phase offsets.
    pub fn steering_at(&self, index: usize, sim_time: f64) -> f32 {
        if self.steer_period_s <= 0.0 || !self.steer_period_s.is_finite() {
            return 0.0;
        }
        let phase = index as f32 * 1.3;
        self.steer_amplitude * (TAU * sim_time as f32 / self.steer_period_s + phase).sin()
    }

    /// One fixed step of the simulation at `sim_time`.
    pub fn update(&mut self, sim_time: f64) {
        for index in 0..self.riders.len() {
            let input = self.steering_at(index, sim_time);
            self.sim.set_steer(self.riders[index], input);
        }
        self.sim.tick();

        for id in &self.riders {
            if let Some(rider) = self.sim.rider(*id) {
                let t = rider.telemetry();
                self.summary.max_hover_error = self.summary.max_hover_error.max(t.hover_error.abs());
                self.summary.max_alignment_error =
                    self.summary.max_alignment_error.max(t.alignment_error);
                self.speed_sum += f64::from(t.speed);
            }
        }
        self.summary.ticks = self.sim.tick_count();
    }

    /// Log rider telemetry if the reporting interval has elapsed.
    pub fn report(&mut self, sim_time: f64, alpha: f64) {
        if sim_time < self.next_report_s {
            return;
        }
        self.next_report_s = sim_time + self.telemetry_interval_s.max(0.0);
        for (index, telemetry) in self.telemetry().into_iter().enumerate() {
            info!(
                rider = index,
                sim_time = format_args!("{sim_time:.2}"),
                altitude = telemetry.altitude,
                hover_error = telemetry.hover_error,
                speed = telemetry.speed,
                yaw = telemetry.yaw.unwrap_or(f32::NAN),
                alignment_error = telemetry.alignment_error,
                "telemetry"
            );
        }
        debug!(alpha, cache = self.elevation_cache_len(), "frame");
    }

    pub fn telemetry(&self) -> Vec<RiderTelemetry> {
        self.riders
            .iter()
            .filter_map(|id| self.sim.rider(*id).map(|r| *r.telemetry()))
            .collect()
    }

    fn elevation_cache_len(&self) -> usize {
        match self.sim.terrain().as_ref() {
            Terrain::Procedural(planet) => planet.sampler().cache_len(),
            Terrain::BasicSphere { .. } => 0,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let samples = self.summary.ticks as f64 * self.riders.len() as f64;
        RunSummary {
            mean_speed: if samples > 0.0 {
                (self.speed_sum / samples) as f32
            } else {
                0.0
            },
            ..self.summary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_loop::{FIXED_DT, GameLoop};

    fn flat_config() -> Config {
        let mut config = Config::default();
        config.simulation.flat = true;
        config
    }

    #[test]
    fn test_flat_config_builds_basic_sphere() {
        let terrain = build_terrain(&flat_config()).unwrap();
        assert!(!terrain.is_procedural());
        let terrain = build_terrain(&Config::default()).unwrap();
        assert!(terrain.is_procedural());
    }

    #[test]
    fn test_invalid_radius_fails_for_both_variants() {
        let mut config = flat_config();
        config.terrain.base_radius = 0.0;
        assert!(build_terrain(&config).is_err());
        config.simulation.flat = false;
        assert!(build_terrain(&config).is_err());
    }

    #[test]
    fn test_spawn_directions_are_distinct_unit_vectors() {
        let dirs = spawn_directions(Vec3::Y, 4);
        assert_eq!(dirs.len(), 4);
        assert!((dirs[0] - Vec3::Y).length() < 1e-6);
        for (i, a) in dirs.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-5);
            for b in &dirs[i + 1..] {
                assert!(a.dot(*b) < 0.9, "riders spawn on top of each other");
            }
        }
    }

    #[test]
    fn test_zero_spawn_direction_is_an_error() {
        let mut config = flat_config();
        config.simulation.spawn_direction = [0.0; 3];
        assert!(matches!(
            Session::build(&config),
            Err(SessionError::DegenerateSpawn(_))
        ));
    }

    #[test]
    fn test_steering_is_bounded_sine() {
        let mut config = flat_config();
        config.simulation.steer_amplitude = 0.5;
        config.simulation.steer_period_s = 4.0;
        let session = Session::build(&config).unwrap();
        assert!(session.steering_at(0, 0.0).abs() < 1e-6);
        assert!((session.steering_at(0, 1.0) - 0.5).abs() < 1e-5);
        for i in 0..200 {
            assert!(session.steering_at(1, i as f64 * 0.05).abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_headless_run_stays_stable() {
        let mut config = flat_config();
        config.simulation.riders = 3;
        let mut session = Session::build(&config).unwrap();
        let mut game_loop = GameLoop::new();
        while game_loop.total_sim_time() < 5.0 {
            let mut alpha = 0.0;
            game_loop.advance(FIXED_DT, |_, t| session.update(t), |a| alpha = a);
            session.report(game_loop.total_sim_time(), alpha);
        }
        let summary = session.summary();
        assert_eq!(summary.riders, 3);
        assert_eq!(summary.ticks, game_loop.update_count());
        assert!(summary.max_alignment_error < 1e-3, "{summary:?}");
        assert!(summary.max_hover_error < 2.0, "{summary:?}");
        assert!(summary.mean_speed > 5.0, "{summary:?}");
        for t in session.telemetry() {
            assert!((t.altitude - config.hover.hover_height).abs() < 1.0, "{t:?}");
        }
    }

    #[test]
    fn test_procedural_run_fills_elevation_cache() {
        let mut config = Config::default();
        config.terrain.seed = 11;
        let mut session = Session::build(&config).unwrap();
        for tick in 0..120 {
            session.update(tick as f64 * FIXED_DT);
        }
        assert!(session.elevation_cache_len() > 0);
        assert!(session.summary().max_alignment_error < 1e-3);
    }
}
