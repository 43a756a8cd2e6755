// src/presets.rs
//
// Mean orbital radii (m), masses (kg) and sidereal periods (s) of the
// planets around a 2e30 kg sun.

use crate::body::Body;
use crate::error::{Result, SimError};
use std::f64::consts::PI;

pub const SUN_MASS: f64 = 2e30;

/// (name, mass, orbital radius, period)
pub const PLANETS: [(&str, f64, f64, f64); 8] = [
    ("Mercury", 0.33018e24, 58e9, 7_603_200.0),
    ("Venus", 4.8685e24, 108e9, 19_440_000.0),
    ("Earth", 5.9736e24, 150e9, 31_558_464.0),
    ("Mars", 0.64185e24, 228e9, 59_356_800.0),
    ("Jupiter", 1898.6e24, 778e9, 375_535_440.0),
    ("Saturn", 568.46e24, 1425e9, 930_949_200.0),
    ("Uranus", 86.831e24, 2880e9, 2_650_838_400.0),
    ("Neptune", 102.43e24, 4500e9, 5_207_004_000.0),
];

pub const EARTH_MASS: f64 = 5.9736e24;
pub const MOON_MASS: f64 = 5.9736e22;
pub const EARTH_MOON_DISTANCE: f64 = 384e6;
pub const MOON_PERIOD: f64 = 2_358_720.0;

/// Body starting at (r, 0) moving along +y at the mean orbital speed 2πr/T
pub fn planet(name: &str, mass: f64, central_mass: f64, radius: f64, period: f64) -> Result<Body> {
    let speed = 2.0 * PI * radius / period;
    Ok(Body::new(period, mass, central_mass, 0.0, speed, radius, 0.0)?.named(name))
}

/// The inner six planets, Mercury through Saturn.
pub fn solar_system() -> Result<Vec<Body>> {
    PLANETS[..6]
        .iter()
        .map(|&(name, mass, radius, period)| planet(name, mass, SUN_MASS, radius, period))
        .collect()
}

/// All eight planets.
pub fn full_solar_system() -> Result<Vec<Body>> {
    PLANETS
        .iter()
        .map(|&(name, mass, radius, period)| planet(name, mass, SUN_MASS, radius, period))
        .collect()
}

/// The Moon around a fixed Earth
pub fn moon() -> Result<Body> {
    planet("Moon", MOON_MASS, EARTH_MASS, EARTH_MOON_DISTANCE, MOON_PERIOD)
}

pub fn find(name: &str) -> Option<(&'static str, f64, f64, f64)> {
    PLANETS
        .iter()
        .copied()
        .find(|(n, ..)| n.eq_ignore_ascii_case(name))
}

/// Build a named preset body: any planet around the sun, or the Moon
/// around a fixed Earth.
pub fn lookup(name: &str) -> Result<Body> {
    if name.eq_ignore_ascii_case("moon") {
        return moon();
    }
    let (name, mass, radius, period) = find(name)
        .ok_or_else(|| SimError::Scenario(format!("unknown preset body `{name}`")))?;
    planet(name, mass, SUN_MASS, radius, period)
}
