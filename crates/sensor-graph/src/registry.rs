use std::collections::HashMap;

use sensor_ecs::{EntityId, EntityManager};
use sensor_physics::{ColliderHandle, ContactEvent, PhysicsConfig, PhysicsWorld};
use tracing::{debug, warn};

use crate::error::SensorError;
use crate::sensor::GraphSensor;

/// Owner of sensor lifetimes.
///
/// The manager only keeps the ids it gets back; whoever implements this trait
/// is responsible for tearing the underlying objects down on deregistration.
pub trait EntityRegistry {
    fn register_entity(&mut self, sensor: GraphSensor) -> Result<EntityId, SensorError>;

    /// Returns `false` if the id was unknown or already deregistered.
    fn deregister_entity(&mut self, id: EntityId) -> bool;
}

/// Entities plus the physics world they live in.
///
/// Registering a sensor gives it a collider and an entity; deregistering
/// removes both.
pub struct SensorScene {
    entities: EntityManager,
    physics: PhysicsWorld,
    by_collider: HashMap<ColliderHandle, EntityId>,
}

impl SensorScene {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            entities: EntityManager::new(),
            physics: PhysicsWorld::with_config(config),
            by_collider: HashMap::new(),
        }
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Advance physics one step and return the contacts it raised.
    pub fn step(&mut self) -> Vec<ContactEvent> {
        self.physics.step()
    }

    pub fn sensor(&self, id: EntityId) -> Option<&GraphSensor> {
        self.entities.component::<GraphSensor>(id)
    }

    pub fn sensor_mut(&mut self, id: EntityId) -> Option<&mut GraphSensor> {
        self.entities.component_mut::<GraphSensor>(id)
    }

    /// The sensor entity owning a collider, if the collider belongs to a sensor.
    pub fn sensor_for_collider(&self, collider: ColliderHandle) -> Option<EntityId> {
        self.by_collider.get(&collider).copied()
    }

    /// Every registered sensor.
    pub fn sensors(&self) -> impl Iterator<Item = (EntityId, &GraphSensor)> + '_ {
        self.entities.iter::<GraphSensor>()
    }

    pub fn sensor_count(&self) -> usize {
        self.entities.count::<GraphSensor>()
    }
}

impl Default for SensorScene {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl EntityRegistry for SensorScene {
    fn register_entity(&mut self, mut sensor: GraphSensor) -> Result<EntityId, SensorError> {
        let collider = self.physics.add_sensor(sensor.center, sensor.half_extents);
        sensor.collider = Some(collider);

        let id = self.entities.register_entity();
        let node = sensor.node;
        if let Err(err) = self.entities.insert_component(id, sensor) {
            self.physics.remove_collider(collider);
            return Err(err.into());
        }
        self.by_collider.insert(collider, id);
        debug!(entity = %id, %node, "registered graph sensor");
        Ok(id)
    }

    fn deregister_entity(&mut self, id: EntityId) -> bool {
        let collider = self.sensor(id).and_then(|sensor| sensor.collider);
        if !self.entities.deregister_entity(id) {
            warn!(entity = %id, "deregistering unknown entity");
            return false;
        }
        if let Some(collider) = collider {
            self.by_collider.remove(&collider);
            self.physics.remove_collider(collider);
        }
        true
    }
}
