//! Simulation settings with persistence
//!
//! Settings are read from the path given on the command line, or from
//! `~/.config/sensor-test/settings.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::ensure;
use glam::Vec3;
use sensor_core::ClockConfig;
use sensor_graph::GridConfig;
use sensor_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub grid: GridConfig,
    pub physics: PhysicsConfig,
    pub clock: ClockConfig,
    pub simulation: SimulationSettings,
}

impl SimSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sensor-test"))
    }

    /// Get the default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path`, or from the default location when `None`.
    /// Falls back to defaults if the file is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let Some(path) = Self::settings_path() else {
                    warn!("Could not determine config directory");
                    return Self::default();
                };
                path
            }
        };

        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(settings) => match settings.validate() {
                    Ok(()) => {
                        info!("Loaded settings from {:?}", path);
                        settings
                    }
                    Err(e) => {
                        warn!("Invalid settings in {:?}: {}, using defaults", path, e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check every section for values the simulation cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.grid.validate()?;
        self.clock.validate()?;
        ensure!(
            self.physics.gravity.is_finite(),
            "invalid gravity: {} (must be finite)",
            self.physics.gravity
        );
        self.simulation.validate()
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// How the demo drives the sensor grid
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of frames to simulate
    pub frames: u32,
    /// Raw frame delta fed to the clock (seconds)
    pub frame_delta: f32,
    /// Balls dropped over the grid at start
    pub ball_count: u32,
    pub ball_radius: f32,
    /// Height above the grid origin the balls are dropped from
    pub drop_height: f32,
    /// Largest horizontal speed given to a ball
    pub max_speed: f32,
    /// Seconds a ball lives before it is removed
    pub ball_lifetime: f32,
    /// Log the occupied set every this many physics steps (0 = never)
    pub report_interval: u64,
    /// Seed for ball placement
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_delta: 1.0 / 60.0,
            ball_count: 12,
            ball_radius: 0.4,
            drop_height: 6.0,
            max_speed: 2.0,
            ball_lifetime: 6.0,
            report_interval: 60,
            seed: 42,
        }
    }
}

impl SimulationSettings {
    pub fn drop_offset(&self) -> Vec3 {
        Vec3::Y * self.drop_height
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.ball_radius.is_finite() && self.ball_radius > 0.0,
            "invalid ball radius: {} (must be finite and positive)",
            self.ball_radius
        );
        for (name, value) in [
            ("frame delta", self.frame_delta),
            ("max speed", self.max_speed),
            ("ball lifetime", self.ball_lifetime),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "invalid {}: {} (must be finite and not negative)",
                name,
                value
            );
        }
        ensure!(
            self.drop_height.is_finite(),
            "invalid drop height: {} (must be finite)",
            self.drop_height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings = SimSettings::from_toml(
            r#"
            [grid]
            columns = 4
            rows = 3

            [simulation]
            ball_count = 2
            "#,
        )
        .unwrap();
        assert_eq!(settings.grid.columns, 4);
        assert_eq!(settings.grid.rows, 3);
        assert_eq!(settings.grid.cell_size, GridConfig::default().cell_size);
        assert_eq!(settings.simulation.ball_count, 2);
        assert_eq!(settings.simulation.frames, 600);
        assert_eq!(settings.physics.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn vectors_parse_as_arrays() {
        let settings = SimSettings::from_toml(
            r#"
            [grid]
            origin = [1.0, 2.0, 3.0]
            "#,
        )
        .unwrap();
        assert_eq!(settings.grid.origin, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("sensor-test-{}", std::process::id()))
            .join("settings.toml");
        let mut settings = SimSettings::default();
        settings.grid.columns = 5;
        settings.simulation.seed = 7;
        settings.save(&path).unwrap();

        let loaded = SimSettings::load(Some(&path));
        assert_eq!(loaded.grid.columns, 5);
        assert_eq!(loaded.simulation.seed, 7);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimSettings::default().validate().is_ok());
    }

    #[test]
    fn non_finite_simulation_values_are_rejected() {
        let mut settings = SimSettings::default();
        settings.simulation.max_speed = f32::INFINITY;
        assert!(settings.validate().is_err());

        let mut settings = SimSettings::default();
        settings.simulation.ball_radius = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = SimSettings::default();
        settings.simulation.ball_lifetime = f32::NAN;
        assert!(settings.validate().is_err());

        let mut settings = SimSettings::default();
        settings.clock.fixed_timestep = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir()
            .join(format!("sensor-test-invalid-{}", std::process::id()))
            .join("settings.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[simulation]\nmax_speed = inf\nseed = 9\n").unwrap();

        let loaded = SimSettings::load(Some(&path));
        assert_eq!(loaded.simulation.max_speed, SimulationSettings::default().max_speed);
        assert_eq!(loaded.simulation.seed, 42);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let loaded = SimSettings::load(Some(Path::new("/definitely/not/here.toml")));
        assert_eq!(loaded.grid.columns, GridConfig::default().columns);
    }
}
