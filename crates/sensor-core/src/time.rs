//! Fixed-timestep clock for the sensor simulation
//!
//! Frame deltas are accumulated and drained in whole physics steps so the
//! contact counters always see the same step size.

use serde::{Deserialize, Serialize};

/// Errors raised by a bad clock configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("invalid {name}: {value} (must be finite and positive)")]
    NotPositive { name: &'static str, value: f32 },

    #[error("invalid time scale: {0} (must be finite and not negative)")]
    InvalidTimeScale(f32),
}

/// Configuration for simulation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep for physics (in seconds)
    pub fixed_timestep: f32,
    /// Maximum frame delta to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

impl ClockConfig {
    /// Reject step sizes the accumulator could never drain.
    pub fn validate(&self) -> Result<(), ClockError> {
        for (name, value) in [
            ("fixed timestep", self.fixed_timestep),
            ("max delta time", self.max_delta_time),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ClockError::NotPositive { name, value });
            }
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ClockError::InvalidTimeScale(self.time_scale));
        }
        Ok(())
    }
}

/// Simulation time tracking
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Configuration
    pub config: ClockConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Number of frames fed to the clock
    pub frame_count: u64,
    /// Number of fixed steps handed out so far
    pub step_count: u64,
    accumulator: f32,
}

impl SimClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Feed a raw frame delta and return how many fixed steps to run now.
    ///
    /// An invalid configuration yields no steps at all.
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        self.frame_count += 1;
        if self.config.validate().is_err() {
            return 0;
        }

        let delta = raw_delta.clamp(0.0, self.config.max_delta_time) * self.config.time_scale;
        self.total_time += delta as f64;
        self.accumulator += delta;

        let step = self.config.fixed_timestep;
        let steps = (self.accumulator / step).floor() as u32;
        self.accumulator = (self.accumulator - steps as f32 * step).max(0.0);
        self.step_count += steps as u64;
        steps
    }
}
