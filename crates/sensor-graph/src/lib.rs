//! Sensor Graph - graph sensor occupancy tracking
//!
//! Graph sensors are physics sensors placed on the nodes of a navigation
//! graph. A generator creates them, the [`GraphSensorManager`] registers them
//! with an [`EntityRegistry`] and keeps the set of sensors that currently have
//! something inside them. The [`SensorContactListener`] turns a step's worth
//! of contact events into counter updates and occupancy transitions.

mod contact;
mod error;
mod generator;
mod manager;
mod registry;
mod sensor;

pub use contact::SensorContactListener;
pub use error::SensorError;
pub use generator::{GraphSensorGenerator, GridConfig, GridSensorGenerator};
pub use manager::{GraphSensorManager, OccupancyChange, SensorSet};
pub use registry::{EntityRegistry, SensorScene};
pub use sensor::GraphSensor;
