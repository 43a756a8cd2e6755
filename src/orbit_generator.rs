// src/orbit_generator.rs

use crate::body::Body;
use crate::error::{Result, SimError};
use nalgebra::Vector2;
use rand::Rng;
use rand_distr::Uniform;
use std::f64::consts::PI;

/// Keplerian period of an orbit with semi-major axis `a`
pub fn orbital_period(a: f64, central_mass: f64, g: f64) -> f64 {
    2.0 * PI * (a.powi(3) / (g * central_mass)).sqrt()
}

/// Body on a circular orbit of radius `radius`, starting at (r, 0) and
/// moving counter-clockwise at √(GM/r).
pub fn circular_orbit(mass: f64, central_mass: f64, radius: f64, g: f64) -> Result<Body> {
    let speed = (g * central_mass / radius).sqrt();
    let period = orbital_period(radius, central_mass, g);
    Body::new(period, mass, central_mass, 0.0, speed, radius, 0.0)
}

/// Velocity for a bound orbit using the vis-viva equation.
/// The starting point is taken as periapsis.
fn generate_orbital_velocity<R: Rng>(
    rng: &mut R,
    position: Vector2<f64>,
    central_mass: f64,
    g: f64,
) -> (Vector2<f64>, f64) {
    let r = position.norm();
    let a = r / (1.0 - rng.random::<f64>());
    let speed = (g * central_mass * (2.0 / r - 1.0 / a)).sqrt();

    // counter-clockwise tangent
    let tangent = Vector2::new(-position.y, position.x).normalize();
    (speed * tangent, a)
}

/// Random bound orbits with periapsis distances in `radius_range`.
pub fn generate_random_orbits<R: Rng>(
    rng: &mut R,
    n_bodies: usize,
    central_mass: f64,
    radius_range: (f64, f64),
    g: f64,
) -> Result<Vec<Body>> {
    let (r_min, r_max) = radius_range;
    if !(r_min > 0.0 && r_max > r_min) {
        return Err(SimError::Scenario(format!(
            "radius range must satisfy 0 < min < max, got ({r_min}, {r_max})"
        )));
    }
    let radii = Uniform::new(r_min, r_max).map_err(|e| SimError::Scenario(e.to_string()))?;
    let angles = Uniform::new(0.0, 2.0 * PI).map_err(|e| SimError::Scenario(e.to_string()))?;

    (0..n_bodies)
        .map(|i| {
            let r = rng.sample(&radii);
            let theta = rng.sample(&angles);
            let position = Vector2::new(r * theta.cos(), r * theta.sin());
            let (velocity, a) = generate_orbital_velocity(rng, position, central_mass, g);
            let mass = rng.random_range(1e21..1e25);
            Ok(Body::new(
                orbital_period(a, central_mass, g),
                mass,
                central_mass,
                velocity.x,
                velocity.y,
                position.x,
                position.y,
            )?
            .named(format!("body-{i}")))
        })
        .collect()
}
