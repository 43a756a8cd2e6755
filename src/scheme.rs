// src/scheme.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gravitational constant used by the reference solar system
pub const G: f64 = 6.6742e-11;

/// Default fixed timestep in seconds
pub const DEFAULT_H: f64 = 205.0;

/// Read-only constant table shared by every body of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub g: f64,
    pub h: f64,
}

impl Constants {
    pub fn new(g: f64, h: f64) -> Self {
        Self { g, h }
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self { g: G, h: DEFAULT_H }
    }
}

/// One of the two sub-updates applied within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Position,
    Velocity,
}

/// Fixed-step integration scheme.
///
/// `SemiImplicit` damps both position and velocity by `(1 - k)` with
/// `k = h² M G / (2 r³)`, moves the position first and then updates the
/// velocity against the new position while reusing the distance measured
/// before the move. `Euler` kicks the velocity with the old position and
/// then drifts the position with the new velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scheme {
    #[default]
    #[serde(rename = "symplectic", alias = "semi_implicit")]
    SemiImplicit,

    #[serde(rename = "euler")]
    Euler,
}

impl Scheme {
    /// Order in which the two phases run after the distance refresh
    pub fn phase_order(self) -> [Phase; 2] {
        match self {
            Scheme::SemiImplicit => [Phase::Position, Phase::Velocity],
            Scheme::Euler => [Phase::Velocity, Phase::Position],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::SemiImplicit => "SemiImplicit",
            Scheme::Euler => "Euler",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
