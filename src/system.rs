use crate::body::Body;
use crate::error::{Result, SimError};
use crate::scheme::{Constants, Scheme};
use log::{debug, warn};
use rayon::prelude::*;

/// Fixed set of independent bodies advanced together, one tick at a time.
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    constants: Constants,
    tick: u64,
    halted: Vec<bool>,
    parallel: bool,
}

impl Simulation {
    pub fn new(bodies: Vec<Body>, constants: Constants) -> Result<Self> {
        for (field, value) in [("g", constants.g), ("h", constants.h)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig { field, value });
            }
        }
        debug!(
            "simulation with {} bodies, h = {} s, G = {:e}",
            bodies.len(),
            constants.h,
            constants.g
        );
        let halted = vec![false; bodies.len()];
        Ok(Self {
            bodies,
            constants,
            tick: 0,
            halted,
            parallel: false,
        })
    }

    /// Step bodies on the rayon pool instead of sequentially
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Fresh simulation over `bodies` sharing this one's constants and
    /// execution mode
    pub fn with_bodies(&self, bodies: Vec<Body>) -> Result<Self> {
        Ok(Simulation::new(bodies, self.constants)?.with_parallel(self.parallel))
    }

    /// Use the same scheme for every body
    pub fn set_scheme(&mut self, scheme: Scheme) {
        for body in &mut self.bodies {
            body.set_scheme(scheme);
        }
    }

    /// Advance every live body by one tick.
    ///
    /// Each body runs refresh, then its two phases, to completion before
    /// this returns, so positions read afterwards are all from the same
    /// tick. A body whose distance is singular is halted and skipped on
    /// later ticks; the others still complete the tick.
    pub fn advance(&mut self) -> Result<()> {
        let constants = self.constants;
        let failures: Vec<(usize, SimError)> = if self.parallel {
            self.bodies
                .par_iter_mut()
                .zip(self.halted.par_iter())
                .enumerate()
                .filter(|(_, (_, halted))| !**halted)
                .filter_map(|(i, (body, _))| body.step(&constants).err().map(|e| (i, e)))
                .collect()
        } else {
            self.bodies
                .iter_mut()
                .zip(self.halted.iter())
                .enumerate()
                .filter(|(_, (_, halted))| !**halted)
                .filter_map(|(i, (body, _))| body.step(&constants).err().map(|e| (i, e)))
                .collect()
        };
        self.tick += 1;

        if failures.is_empty() {
            return Ok(());
        }
        let mut halted = Vec::with_capacity(failures.len());
        for (i, err) in failures {
            warn!("tick {}: halting body {}: {}", self.tick, i, err);
            self.halted[i] = true;
            halted.push(i);
        }
        Err(SimError::Halted {
            tick: self.tick,
            bodies: halted,
        })
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.bodies.iter().map(Body::position).collect()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn constants(&self) -> Constants {
        self.constants
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * self.constants.h
    }

    pub fn is_halted(&self, index: usize) -> bool {
        self.halted.get(index).copied().unwrap_or(false)
    }

    pub fn live_bodies(&self) -> usize {
        self.halted.iter().filter(|h| !**h).count()
    }

    /// Put every body back to its initial state and clear halts
    pub fn reset(&mut self) {
        for body in &mut self.bodies {
            body.reset();
        }
        self.halted.iter_mut().for_each(|h| *h = false);
        self.tick = 0;
    }
}
