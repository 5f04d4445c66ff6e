//! Sensor generators
//!
//! A generator decides where sensors go. It only describes them; the manager
//! hands each one to the registry, which gives it a collider and an id.

use glam::Vec3;
use sensor_core::GridCoord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SensorError;
use crate::sensor::GraphSensor;

/// Factory for a batch of graph sensors.
pub trait GraphSensorGenerator {
    fn create_sensors(&mut self) -> Result<Vec<GraphSensor>, SensorError>;
}

/// Layout of a rectangular sensor grid on the XZ plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    /// Edge length of one grid cell
    pub cell_size: f32,
    /// Minimum corner of cell (0, 0); sensors sit on `origin.y`
    pub origin: Vec3,
    /// Height of each sensor box
    pub sensor_height: f32,
    /// Space left between neighbouring sensors so they never overlap
    pub gap: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            cell_size: 2.0,
            origin: Vec3::new(-8.0, 0.0, -8.0),
            sensor_height: 1.0,
            gap: 0.1,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), SensorError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(SensorError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        for (name, value) in [
            ("cell size", self.cell_size),
            ("sensor height", self.sensor_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SensorError::InvalidDimension { name, value });
            }
        }
        if !self.gap.is_finite() || self.gap < 0.0 || self.gap >= self.cell_size {
            return Err(SensorError::InvalidDimension {
                name: "gap",
                value: self.gap,
            });
        }
        Ok(())
    }

    /// Half extents of one sensor box
    pub fn sensor_half_extents(&self) -> Vec3 {
        let half_width = (self.cell_size - self.gap) * 0.5;
        Vec3::new(half_width, self.sensor_height * 0.5, half_width)
    }

    /// Grid cell under a world-space point, if any
    pub fn cell_at(&self, point: Vec3) -> Option<GridCoord> {
        GridCoord::from_world(point, self.origin, self.cell_size, self.columns, self.rows)
    }
}

/// One sensor per grid cell, generated row by row.
#[derive(Debug, Clone, Default)]
pub struct GridSensorGenerator {
    config: GridConfig,
}

impl GridSensorGenerator {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }
}

impl GraphSensorGenerator for GridSensorGenerator {
    fn create_sensors(&mut self) -> Result<Vec<GraphSensor>, SensorError> {
        self.config.validate()?;

        let half_extents = self.config.sensor_half_extents();
        let sensors: Vec<_> = (0..self.config.rows)
            .flat_map(|row| (0..self.config.columns).map(move |column| GridCoord::new(column, row)))
            .map(|node| {
                let center = node.cell_center(self.config.origin, self.config.cell_size)
                    + Vec3::Y * half_extents.y;
                GraphSensor::new(node, center, half_extents)
            })
            .collect();

        debug!(
            columns = self.config.columns,
            rows = self.config.rows,
            "generated {} grid sensors",
            sensors.len()
        );
        Ok(sensors)
    }
}
