//! Sensor ECS - entity registry for SensorTest
//!
//! Entities are generational ids; components live in per-type sparse sets.
//! Registering hands out an id, deregistering destroys the entity and every
//! component attached to it.

mod entity;
mod manager;
mod storage;

pub use entity::EntityId;
pub use manager::{Component, EntityError, EntityManager};
