// src/body.rs

use crate::error::{Result, SimError};
use crate::scheme::{Constants, Phase, Scheme};
use nalgebra::Vector2;
use std::fmt;

/// A point mass orbiting a fixed central mass at the origin.
#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    period: f64,
    mass: f64,
    central_mass: f64,
    initial_velocity: Vector2<f64>,
    initial_position: Vector2<f64>,
    scheme: Scheme,

    velocity: Vector2<f64>,
    position: Vector2<f64>,
    distance: f64,
}

fn positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidConfig { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NonFiniteInitial { field, value })
    }
}

impl Body {
    pub fn new(
        period: f64,
        mass: f64,
        central_mass: f64,
        velocity_x0: f64,
        velocity_y0: f64,
        position_x0: f64,
        position_y0: f64,
    ) -> Result<Self> {
        let initial_velocity = Vector2::new(
            finite("velocity_x0", velocity_x0)?,
            finite("velocity_y0", velocity_y0)?,
        );
        let initial_position = Vector2::new(
            finite("position_x0", position_x0)?,
            finite("position_y0", position_y0)?,
        );
        Ok(Body {
            name: String::new(),
            period: positive("period", period)?,
            mass: positive("mass", mass)?,
            central_mass: positive("central_mass", central_mass)?,
            initial_velocity,
            initial_position,
            scheme: Scheme::default(),
            velocity: initial_velocity,
            position: initial_position,
            distance: initial_position.norm(),
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.scheme = scheme;
    }

    /// distance = |position|, the only place distance is written
    pub fn refresh_distance(&mut self) {
        self.distance = self.position.norm();
    }

    /// Velocity phase. Reads the stored distance, which may predate the
    /// latest position phase.
    pub fn step_velocity(&mut self, constants: &Constants) -> Result<()> {
        let pull = self.pull(constants)?;
        let h = constants.h;
        self.velocity = match self.scheme {
            Scheme::SemiImplicit => {
                let k = h * h * pull / 2.0;
                self.velocity * (1.0 - k) - h * pull * self.position
            }
            Scheme::Euler => self.velocity - h * pull * self.position,
        };
        Ok(())
    }

    /// Position phase. Reads the stored distance and the current velocity.
    pub fn step_position(&mut self, constants: &Constants) -> Result<()> {
        let pull = self.pull(constants)?;
        let h = constants.h;
        self.position = match self.scheme {
            Scheme::SemiImplicit => {
                let k = h * h * pull / 2.0;
                self.position * (1.0 - k) + h * self.velocity
            }
            Scheme::Euler => self.position + h * self.velocity,
        };
        Ok(())
    }

    /// Refresh the distance once, then run both phases in scheme order.
    /// The distance is checked before either phase so a failed step
    /// leaves the state untouched.
    pub fn step(&mut self, constants: &Constants) -> Result<()> {
        self.refresh_distance();
        self.pull(constants)?;
        for phase in self.scheme.phase_order() {
            match phase {
                Phase::Position => self.step_position(constants)?,
                Phase::Velocity => self.step_velocity(constants)?,
            }
        }
        Ok(())
    }

    // M G / r³ from the stored distance
    fn pull(&self, constants: &Constants) -> Result<f64> {
        if self.distance == 0.0 {
            return Err(SimError::Singularity {
                body: self.label().to_string(),
            });
        }
        if !self.distance.is_finite() {
            return Err(SimError::NonFinite {
                body: self.label().to_string(),
                distance: self.distance,
            });
        }
        Ok(self.central_mass * constants.g / self.distance.powi(3))
    }

    /// Restore the initial kinematic state
    pub fn reset(&mut self) {
        self.velocity = self.initial_velocity;
        self.position = self.initial_position;
        self.distance = self.initial_position.norm();
    }

    /// Specific orbital energy v²/2 - GM/r, evaluated at the current position
    pub fn specific_energy(&self, g: f64) -> f64 {
        0.5 * self.velocity.norm_squared() - g * self.central_mass / self.position.norm()
    }

    pub fn position(&self) -> (f64, f64) {
        (self.position.x, self.position.y)
    }

    pub fn position_vec(&self) -> Vector2<f64> {
        self.position
    }

    pub fn velocity(&self) -> (f64, f64) {
        (self.velocity.x, self.velocity.y)
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn initial_position(&self) -> (f64, f64) {
        (self.initial_position.x, self.initial_position.y)
    }

    pub fn initial_velocity(&self) -> (f64, f64) {
        (self.initial_velocity.x, self.initial_velocity.y)
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn central_mass(&self) -> f64 {
        self.central_mass
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "unnamed body"
        } else {
            &self.name
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(m={:.2e}, p=[{:.2e}, {:.2e}], v=[{:.2e}, {:.2e}], r={:.2e})",
            self.label(),
            self.mass,
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
            self.distance
        )
    }
}
