//! Core types used throughout SensorTest

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Column/row address of a node in a sensor graph laid out on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub column: u32,
    pub row: u32,
}

impl GridCoord {
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Center of this cell in world space.
    ///
    /// `origin` is the minimum corner of cell (0, 0); `y` is taken from `origin`.
    pub fn cell_center(&self, origin: Vec3, cell_size: f32) -> Vec3 {
        Vec3::new(
            origin.x + (self.column as f32 + 0.5) * cell_size,
            origin.y,
            origin.z + (self.row as f32 + 0.5) * cell_size,
        )
    }

    /// Cell containing a world-space point, if it lies inside a `columns x rows` grid.
    pub fn from_world(
        point: Vec3,
        origin: Vec3,
        cell_size: f32,
        columns: u32,
        rows: u32,
    ) -> Option<Self> {
        if !(cell_size > 0.0) {
            return None;
        }
        let local = Vec2::new(point.x - origin.x, point.z - origin.z) / cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (column, row) = (local.x.floor() as u32, local.y.floor() as u32);
        (column < columns && row < rows).then_some(Self { column, row })
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}
