//! Fixed-step integration of bodies orbiting a fixed central mass.
//!
//! Each [`Body`] evolves independently under the two-body approximation.
//! A [`Simulation`] owns the bodies and the shared [`Constants`] and
//! advances all of them one tick at a time.

pub mod body;
pub mod config;
pub mod error;
pub mod experiment;
pub mod lyapunov;
pub mod orbit_generator;
pub mod presets;
pub mod scheme;
pub mod system;

pub use body::Body;
pub use config::{BodyConfig, ScenarioConfig};
pub use error::{Result, SimError};
pub use experiment::{calculate_trajectory_deviance, export_experiment, export_positions, Recording};
pub use lyapunov::{perturb_init_conditions, LyapunovCalculator};
pub use scheme::{Constants, Phase, Scheme};
pub use system::Simulation;
