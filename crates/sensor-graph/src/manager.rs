use std::collections::BTreeSet;

use sensor_ecs::EntityId;
use tracing::{debug, info};

use crate::error::SensorError;
use crate::generator::GraphSensorGenerator;
use crate::registry::EntityRegistry;
use crate::sensor::GraphSensor;

/// Ordered set of sensor ids.
pub type SensorSet = BTreeSet<EntityId>;

/// What an occupancy update did to a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyChange {
    /// Was free, now has something in it
    Entered,
    /// Was occupied, now free
    Left,
    /// Same state as before
    Unchanged,
}

/// Container and manager for graph sensors.
///
/// It creates sensors through a generator and loads them into an
/// [`EntityRegistry`]. It only holds ids: the registry destroys the sensors
/// when they are deregistered.
#[derive(Debug, Default)]
pub struct GraphSensorManager {
    sensors: Vec<EntityId>,
    occupied: SensorSet,
}

impl GraphSensorManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean slate.
    pub fn init<R: EntityRegistry>(&mut self, registry: &mut R) {
        self.reset(registry);
    }

    /// Forget occupancy and deregister every sensor this manager created.
    pub fn reset<R: EntityRegistry>(&mut self, registry: &mut R) {
        self.occupied.clear();
        let count = self.sensors.len();
        for id in self.sensors.drain(..) {
            registry.deregister_entity(id);
        }
        if count > 0 {
            info!("destroyed {} graph sensors", count);
        }
    }

    pub fn shutdown<R: EntityRegistry>(&mut self, registry: &mut R) {
        self.reset(registry);
    }

    /// Have the generator build its sensors and register each one.
    ///
    /// Returns the ids of the sensors created by this call. On a registration
    /// failure the sensors registered so far stay owned by the manager.
    pub fn create_sensors<G, R>(
        &mut self,
        generator: &mut G,
        registry: &mut R,
    ) -> Result<&[EntityId], SensorError>
    where
        G: GraphSensorGenerator + ?Sized,
        R: EntityRegistry,
    {
        let sensors = generator.create_sensors()?;
        let first = self.sensors.len();
        self.sensors.reserve(sensors.len());
        for sensor in sensors {
            let id = registry.register_entity(sensor)?;
            self.sensors.push(id);
        }
        info!("created {} graph sensors", self.sensors.len() - first);
        Ok(&self.sensors[first..])
    }

    /// Fold a sensor's settled contact count into the occupied set.
    ///
    /// Called once per sensor after all of a step's begin/end contacts have
    /// been applied to its counter.
    pub fn update_graph_sensor_state(&mut self, id: EntityId, sensor: &GraphSensor) -> OccupancyChange {
        let tracked = self.occupied.contains(&id);
        match (tracked, sensor.is_occupied()) {
            (false, true) => {
                self.occupied.insert(id);
                debug!(entity = %id, node = %sensor.node, "sensor occupied");
                OccupancyChange::Entered
            }
            (true, false) => {
                self.occupied.remove(&id);
                debug!(entity = %id, node = %sensor.node, "sensor vacated");
                OccupancyChange::Left
            }
            _ => OccupancyChange::Unchanged,
        }
    }

    /// Sensors whose last observed contact count was nonzero.
    pub fn occupied_sensors(&self) -> &SensorSet {
        &self.occupied
    }

    pub fn is_occupied(&self, id: EntityId) -> bool {
        self.occupied.contains(&id)
    }

    /// Every sensor this manager created, in creation order.
    pub fn sensors(&self) -> &[EntityId] {
        &self.sensors
    }
}
