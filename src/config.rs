//! Scenario files.
//!
//! A scenario is a JSON document describing the constant table, the
//! integration scheme and the bodies to simulate:
//!
//! ```json
//! {
//!   "g": 6.6742e-11,
//!   "h": 205.0,
//!   "scheme": "symplectic",
//!   "ticks": 37089,
//!   "parallel": false,
//!   "bodies": [
//!     {
//!       "name": "Mercury",
//!       "period": 7603200.0,
//!       "mass": 0.33018e24,
//!       "central_mass": 2e30,
//!       "velocity": [0.0, 47930.0],
//!       "position": [58e9, 0.0]
//!     },
//!     { "preset": "Earth" }
//!   ]
//! }
//! ```
//!
//! A body entry either spells out its constants or names one of the
//! planets in [`crate::presets::PLANETS`] or the Moon. Unknown keys are
//! rejected, including constants given next to a `preset`. A per-body
//! `scheme` overrides the scenario-wide one.

use crate::body::Body;
use crate::error::{Result, SimError};
use crate::presets;
use crate::scheme::{Constants, Scheme, DEFAULT_H, G};
use crate::system::Simulation;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_g() -> f64 {
    G
}

fn default_h() -> f64 {
    DEFAULT_H
}

fn default_ticks() -> usize {
    10_000
}

/// Body taken from [`crate::presets`] by name
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PresetBody {
    pub preset: String,
    pub scheme: Option<Scheme>,
}

/// Body with every constant spelled out
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExplicitBody {
    pub name: Option<String>,
    pub period: f64,
    pub mass: f64,
    pub central_mass: f64,
    pub velocity: [f64; 2],
    pub position: [f64; 2],
    pub scheme: Option<Scheme>,
}

/// An entry with a `preset` key is a preset body and may only carry a
/// `scheme` besides; anything else must be a complete explicit body.
#[derive(Deserialize, Debug, Clone)]
#[serde(try_from = "serde_json::Value")]
pub enum BodyConfig {
    Preset(PresetBody),
    Explicit(ExplicitBody),
}

impl TryFrom<serde_json::Value> for BodyConfig {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        if value.get("preset").is_some() {
            Ok(BodyConfig::Preset(serde_json::from_value(value)?))
        } else {
            Ok(BodyConfig::Explicit(serde_json::from_value(value)?))
        }
    }
}

impl BodyConfig {
    fn build(&self, default_scheme: Scheme) -> Result<Body> {
        match self {
            BodyConfig::Preset(p) => {
                Ok(presets::lookup(&p.preset)?.with_scheme(p.scheme.unwrap_or(default_scheme)))
            }
            BodyConfig::Explicit(e) => {
                let body = Body::new(
                    e.period,
                    e.mass,
                    e.central_mass,
                    e.velocity[0],
                    e.velocity[1],
                    e.position[0],
                    e.position[1],
                )?
                .with_scheme(e.scheme.unwrap_or(default_scheme));
                Ok(match &e.name {
                    Some(n) => body.named(n.as_str()),
                    None => body,
                })
            }
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default = "default_g")]
    pub g: f64,
    #[serde(default = "default_h")]
    pub h: f64,
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default = "default_ticks")]
    pub ticks: usize,
    #[serde(default)]
    pub parallel: bool,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate every body and the constant table before any stepping
    pub fn build(&self) -> Result<Simulation> {
        if self.bodies.is_empty() {
            return Err(SimError::Scenario("scenario has no bodies".to_string()));
        }
        let bodies = self
            .bodies
            .iter()
            .map(|b| b.build(self.scheme))
            .collect::<Result<Vec<_>>>()?;
        Ok(Simulation::new(bodies, Constants::new(self.g, self.h))?.with_parallel(self.parallel))
    }
}
