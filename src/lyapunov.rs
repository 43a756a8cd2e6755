use crate::body::Body;
use crate::error::{Result, SimError};
use crate::experiment::Recording;
use rand::Rng;
use rand_distr::Uniform;

/// Copy of `bodies` with each initial position component shifted by a
/// uniform offset in [-position_threshold, position_threshold] (m) and each
/// velocity component by one in [-velocity_threshold, velocity_threshold] (m/s).
pub fn perturb_init_conditions<R: Rng>(
    rng: &mut R,
    bodies: &[Body],
    position_threshold: f64,
    velocity_threshold: f64,
) -> Result<Vec<Body>> {
    let pos_range = Uniform::new_inclusive(-position_threshold, position_threshold)
        .map_err(|e| SimError::Scenario(e.to_string()))?;
    let vel_range = Uniform::new_inclusive(-velocity_threshold, velocity_threshold)
        .map_err(|e| SimError::Scenario(e.to_string()))?;
    bodies
        .iter()
        .map(|b| {
            let (vx, vy) = b.initial_velocity();
            let (x, y) = b.initial_position();
            Ok(Body::new(
                b.period(),
                b.mass(),
                b.central_mass(),
                vx + rng.sample(&vel_range),
                vy + rng.sample(&vel_range),
                x + rng.sample(&pos_range),
                y + rng.sample(&pos_range),
            )?
            .named(b.name())
            .with_scheme(b.scheme()))
        })
        .collect()
}

/// Compares a reference run with a run from perturbed initial conditions.
pub struct LyapunovCalculator<'a> {
    run1: &'a Recording,
    run2: &'a Recording,
}

impl<'a> LyapunovCalculator<'a> {
    pub fn new(run1: &'a Recording, run2: &'a Recording) -> Result<Self> {
        if run1.h != run2.h {
            return Err(SimError::ShapeMismatch(format!(
                "step sizes differ: {} vs {}",
                run1.h, run2.h
            )));
        }
        if run1.len() != run2.len() || run1.positions.len() != run2.positions.len() {
            return Err(SimError::ShapeMismatch(
                "runs must record the same bodies for the same ticks".to_string(),
            ));
        }
        Ok(Self { run1, run2 })
    }

    /// Mean separation of matching bodies at each tick
    pub fn compute_separation(&self) -> Vec<f64> {
        let num_bodies = self.run1.positions.len();
        (0..self.run1.len())
            .map(|step| {
                let total: f64 = (0..num_bodies)
                    .map(|i| (self.run1.positions[i][step] - self.run2.positions[i][step]).norm())
                    .sum();
                total / num_bodies as f64
            })
            .collect()
    }

    pub fn calculate_lyapunov_exponent(&self) -> Result<f64> {
        let separations = self.compute_separation();
        if separations.len() < 2 {
            return Err(SimError::ShapeMismatch("need at least two ticks".to_string()));
        }
        let initial_sep = separations[0];
        if !(initial_sep > 0.0) {
            return Err(SimError::ShapeMismatch(
                "initial separation must be greater than zero".to_string(),
            ));
        }

        let num_steps = separations.len();
        let total_time = num_steps as f64 * self.run1.h;
        let sum: f64 = separations
            .iter()
            .skip(1)
            .map(|&sep| (sep / initial_sep).ln())
            .sum();
        Ok(sum / total_time / (num_steps - 1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::run;
    use crate::orbit_generator::circular_orbit;
    use crate::scheme::{Constants, Scheme};
    use crate::system::Simulation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn perturbation_stays_within_threshold() {
        let mut rng = StdRng::seed_from_u64(3);
        let bodies = vec![circular_orbit(1.0, 1.0, 1.0, 1.0).unwrap().named("a")];
        let moved = perturb_init_conditions(&mut rng, &bodies, 1e-3, 0.0).unwrap();
        let (x, y) = moved[0].initial_position();
        assert!((x - 1.0).abs() <= 1e-3 && y.abs() <= 1e-3);
        assert_eq!(moved[0].initial_velocity(), bodies[0].initial_velocity());
        assert_eq!(moved[0].name(), "a");

        let kicked = perturb_init_conditions(&mut rng, &bodies, 0.0, 1e-2).unwrap();
        let (vx, vy) = kicked[0].initial_velocity();
        assert_eq!(kicked[0].initial_position(), (1.0, 0.0));
        assert!(vx.abs() <= 1e-2 && (vy - 1.0).abs() <= 1e-2);
    }

    #[test]
    fn exponent_is_finite_for_nearby_runs() {
        let c = Constants::new(1.0, 0.01);
        let base = vec![circular_orbit(1.0, 1.0, 1.0, 1.0)
            .unwrap()
            .with_scheme(Scheme::Euler)];
        let mut rng = StdRng::seed_from_u64(11);
        let moved = perturb_init_conditions(&mut rng, &base, 1e-4, 1e-4).unwrap();

        let r1 = run(&mut Simulation::new(base, c).unwrap(), 500, false).unwrap();
        let r2 = run(&mut Simulation::new(moved, c).unwrap(), 500, false).unwrap();
        let lambda = LyapunovCalculator::new(&r1, &r2)
            .unwrap()
            .calculate_lyapunov_exponent()
            .unwrap();
        assert!(lambda.is_finite());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let bodies = vec![circular_orbit(1.0, 1.0, 1.0, 1.0).unwrap()];
        assert!(matches!(
            perturb_init_conditions(&mut rng, &bodies, -1.0, 0.0),
            Err(SimError::Scenario(_))
        ));
    }

    #[test]
    fn identical_runs_have_no_initial_separation() {
        let c = Constants::new(1.0, 0.01);
        let base = vec![circular_orbit(1.0, 1.0, 1.0, 1.0).unwrap()];
        let r1 = run(&mut Simulation::new(base.clone(), c).unwrap(), 10, false).unwrap();
        let r2 = run(&mut Simulation::new(base, c).unwrap(), 10, false).unwrap();
        let calc = LyapunovCalculator::new(&r1, &r2).unwrap();
        assert!(calc.calculate_lyapunov_exponent().is_err());
    }
}
