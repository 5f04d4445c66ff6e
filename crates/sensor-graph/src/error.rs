use sensor_ecs::EntityError;

/// Errors that can occur while building or registering graph sensors.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("sensor grid must have at least one column and one row (got {columns}x{rows})")]
    EmptyGrid { columns: u32, rows: u32 },

    #[error("invalid {name}: {value} (must be finite and positive)")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("failed to register sensor: {0}")]
    Registration(#[from] EntityError),
}
