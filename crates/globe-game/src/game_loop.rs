//! Fixed-timestep loop decoupling simulation steps from frame delivery.
//!
//! Simulation always advances in steps of [`FIXED_DT`]; whatever frame time is
//! left over carries to the next frame and is exposed as an interpolation alpha.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz, matching the physics world.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Frame times above this are clamped so a stall cannot trigger a burst of
/// catch-up steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator state of the fixed-timestep loop.
pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Run one frame using the wall-clock time since the previous call.
    pub fn tick(&mut self, update_fn: impl FnMut(f64, f64), render_fn: impl FnMut(f64)) {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.advance(frame_time, update_fn, render_fn);
    }

    /// Run one frame of `frame_time` seconds.
    ///
    /// - `update_fn(fixed_dt, total_sim_time)` runs zero or more times.
    /// - `render_fn(alpha)` runs exactly once with alpha in `[0.0, 1.0)`.
    pub fn advance(
        &mut self,
        frame_time: f64,
        mut update_fn: impl FnMut(f64, f64),
        mut render_fn: impl FnMut(f64),
    ) {
        let mut frame_time = if frame_time.is_finite() {
            frame_time.max(0.0)
        } else {
            0.0
        };
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
        }

        render_fn(self.alpha());
        self.frame_count += 1;
    }

    /// Fraction of a step carried over to the next frame.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Simulated seconds, always a whole number of steps.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_matches_physics_world() {
        assert!(
            (FIXED_DT - f64::from(globe_physics::FIXED_DT)).abs() < 1e-7,
            "loop and physics steps differ"
        );
    }

    #[test]
    fn test_accumulator_single_step() {
        let mut loop_ = GameLoop::new();
        let mut updates = 0u32;
        loop_.advance(FIXED_DT, |_, _| updates += 1, |_| {});
        assert_eq!(updates, 1);
        assert!(loop_.alpha().abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_multiple_steps() {
        let mut loop_ = GameLoop::new();
        let mut sim_times = Vec::new();
        loop_.advance(3.0 * FIXED_DT + 1e-9, |_, t| sim_times.push(t), |_| {});
        assert_eq!(sim_times.len(), 3);
        assert!((sim_times[2] - 2.0 * FIXED_DT).abs() < 1e-12);
        assert!((loop_.total_sim_time() - 3.0 * FIXED_DT).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_alpha() {
        let mut loop_ = GameLoop::new();
        let mut updates = 0u32;
        let mut alpha_received = -1.0;
        loop_.advance(0.25 * FIXED_DT, |_, _| updates += 1, |a| alpha_received = a);
        assert_eq!(updates, 0);
        assert!(
            (alpha_received - 0.25).abs() < 1e-10,
            "alpha should be ~0.25, got {alpha_received}"
        );
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut loop_ = GameLoop::new();
        let mut updates = 0u32;
        loop_.advance(1.0, |_, _| updates += 1, |_| {});
        let max_updates = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(
            updates <= max_updates && updates > 0,
            "Expected 1..={max_updates} updates, got {updates}"
        );
    }

    #[test]
    fn test_bad_frame_times_run_no_steps() {
        let mut loop_ = GameLoop::new();
        let mut updates = 0u32;
        for ft in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            loop_.advance(ft, |_, _| updates += 1, |_| {});
        }
        assert_eq!(updates, 0);
        assert_eq!(loop_.frame_count(), 4);
    }

    #[test]
    fn test_uneven_frames_sum_to_whole_steps() {
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018];
        let mut loop_ = GameLoop::new();
        for &ft in &frame_times {
            loop_.advance(ft, |dt, _| assert_eq!(dt, FIXED_DT), |a| assert!((0.0..1.0).contains(&a)));
        }
        let expected = loop_.update_count() as f64 * FIXED_DT;
        assert!((loop_.total_sim_time() - expected).abs() < 1e-10);
        let elapsed: f64 = frame_times.iter().sum();
        assert!((elapsed - loop_.total_sim_time() - loop_.alpha() * FIXED_DT).abs() < 1e-9);
        assert_eq!(loop_.frame_count(), frame_times.len() as u64);
    }

    #[test]
    fn test_game_loop_default() {
        let loop_ = GameLoop::default();
        assert_eq!(loop_.frame_count(), 0);
        assert_eq!(loop_.update_count(), 0);
        assert_eq!(loop_.total_sim_time(), 0.0);
    }
}
