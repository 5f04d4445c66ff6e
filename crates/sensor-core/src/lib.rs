//! Sensor Core - Core types and utilities shared by the SensorTest crates
//!
//! This crate provides:
//! - Mathematical primitives (re-exported from glam)
//! - Grid coordinates used to address graph sensor nodes
//! - A fixed-timestep simulation clock

pub mod time;
pub mod types;

pub use glam::{Vec2, Vec3};
pub use time::{ClockConfig, ClockError, SimClock};
pub use types::GridCoord;
