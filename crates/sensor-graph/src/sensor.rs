use glam::Vec3;
use sensor_core::GridCoord;
use sensor_physics::ColliderHandle;

/// A box sensor sitting on one node of the sensor graph.
///
/// `occupy_count` is the number of contacts currently open against the
/// sensor: every begin bumps it, every end drops it. The physics step settles
/// the count before the manager looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSensor {
    pub node: GridCoord,
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Set once the sensor has a collider in the physics world.
    pub collider: Option<ColliderHandle>,
    occupy_count: u32,
}

impl GraphSensor {
    pub fn new(node: GridCoord, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            node,
            center,
            half_extents,
            collider: None,
            occupy_count: 0,
        }
    }

    pub fn occupy_count(&self) -> u32 {
        self.occupy_count
    }

    pub fn is_occupied(&self) -> bool {
        self.occupy_count != 0
    }

    pub fn begin_contact(&mut self) {
        self.occupy_count = self.occupy_count.saturating_add(1);
    }

    /// Returns `false` if there was no open contact to end.
    pub fn end_contact(&mut self) -> bool {
        match self.occupy_count.checked_sub(1) {
            Some(count) => {
                self.occupy_count = count;
                true
            }
            None => false,
        }
    }

    /// Whether a world-space point lies inside the sensor box.
    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.cmple(self.half_extents).all()
    }
}
