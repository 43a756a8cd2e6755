//! Error types for the orbital integrator.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// A construction constant was zero, negative or not finite
    #[error("invalid configuration: {field} must be positive and finite, got {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    /// An initial vector component was not finite
    #[error("invalid configuration: {field} must be finite, got {value}")]
    NonFiniteInitial { field: &'static str, value: f64 },

    #[error("invalid configuration: {0}")]
    Scenario(String),

    /// The body sits on the central mass, so 1/distance³ is undefined
    #[error("numerical singularity: {body} is coincident with the central mass")]
    Singularity { body: String },

    #[error("numerical blow-up: distance of {body} became {distance}")]
    NonFinite { body: String, distance: f64 },

    /// One or more bodies stopped stepping during a tick
    #[error("tick {tick}: halted bodies {bodies:?}")]
    Halted { tick: u64, bodies: Vec<usize> },

    #[error("recordings cannot be compared: {0}")]
    ShapeMismatch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
