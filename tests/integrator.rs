use orrery::experiment::run;
use orrery::orbit_generator::circular_orbit;
use orrery::presets::{self, SUN_MASS};
use orrery::scheme::G;
use orrery::{Body, Constants, Scheme, SimError, Simulation};
use std::f64::consts::PI;

const MERCURY_RADIUS: f64 = 58e9;
const MERCURY_MASS: f64 = 0.33018e24;

/// Mercury on an exactly circular orbit
fn circular_mercury(scheme: Scheme) -> Body {
    circular_orbit(MERCURY_MASS, SUN_MASS, MERCURY_RADIUS, G)
        .unwrap()
        .named("Mercury")
        .with_scheme(scheme)
}

fn relative_error(actual: f64, expected: f64) -> f64 {
    ((actual - expected) / expected).abs()
}

// ==================================================================================
// Single body
// ==================================================================================

#[test]
fn body_at_origin_never_moves() {
    let still = Body::new(1.0, 1.0, SUN_MASS, 0.0, 0.0, 0.0, 0.0).unwrap();
    let mut sim = Simulation::new(vec![still], Constants::default()).unwrap();

    assert!(matches!(sim.advance(), Err(SimError::Halted { .. })));
    for _ in 0..1000 {
        sim.advance().unwrap();
    }
    assert_eq!(sim.positions(), vec![(0.0, 0.0)]);
    assert_eq!(sim.bodies()[0].velocity(), (0.0, 0.0));
}

#[test]
fn zero_distance_is_reported_on_first_phase_call() {
    let c = Constants::default();
    for scheme in [Scheme::SemiImplicit, Scheme::Euler] {
        let mut b = Body::new(1.0, 1.0, SUN_MASS, 10.0, 0.0, 0.0, 0.0)
            .unwrap()
            .with_scheme(scheme);
        b.refresh_distance();
        assert!(matches!(b.step_velocity(&c), Err(SimError::Singularity { .. })));
        assert!(matches!(b.step_position(&c), Err(SimError::Singularity { .. })));
        let (x, y) = b.position();
        let (vx, vy) = b.velocity();
        assert!(!x.is_nan() && !y.is_nan() && !vx.is_nan() && !vy.is_nan());
    }
}

#[test]
fn mercury_single_step_matches_closed_form() {
    let h = 205.0;
    let period = 7_603_200.0;
    let v0 = 2.0 * PI * MERCURY_RADIUS / period;
    let mut b = Body::new(period, MERCURY_MASS, SUN_MASS, 0.0, v0, MERCURY_RADIUS, 0.0)
        .unwrap()
        .with_scheme(Scheme::SemiImplicit);
    b.step(&Constants::new(6.6742e-11, h)).unwrap();

    let gm = SUN_MASS * 6.6742e-11;
    let d3 = MERCURY_RADIUS.powi(3);
    let k = h * h * gm / (2.0 * d3);
    let x = MERCURY_RADIUS * (1.0 - k);
    let y = h * v0;
    let vx = -h * gm * x / d3;
    let vy = v0 * (1.0 - k) - h * gm * y / d3;

    let (bx, by) = b.position();
    let (bvx, bvy) = b.velocity();
    assert!(relative_error(bx, x) < 1e-6);
    assert!(relative_error(by, y) < 1e-6);
    assert!(relative_error(bvx, vx) < 1e-6);
    assert!(relative_error(bvy, vy) < 1e-6);
}

#[test]
fn stale_distance_changes_the_trajectory() {
    let c = Constants::default();
    let mut stepped = circular_mercury(Scheme::SemiImplicit);
    let mut manual = stepped.clone();
    let mut refreshed = stepped.clone();

    for _ in 0..1000 {
        stepped.step(&c).unwrap();

        manual.refresh_distance();
        manual.step_position(&c).unwrap();
        manual.step_velocity(&c).unwrap();

        refreshed.refresh_distance();
        refreshed.step_position(&c).unwrap();
        refreshed.refresh_distance();
        refreshed.step_velocity(&c).unwrap();
    }

    // step() is exactly refresh -> position -> velocity
    assert_eq!(stepped.position(), manual.position());
    assert_eq!(stepped.velocity(), manual.velocity());

    let (x1, y1) = stepped.position();
    let (x2, y2) = refreshed.position();
    let separation = (x1 - x2).hypot(y1 - y2);
    assert!(separation > 1e-3, "separation only {separation} m");
}

// ==================================================================================
// Orbit quality
// ==================================================================================

#[test]
fn circular_orbit_radius_holds_for_one_period() {
    let c = Constants::default();
    for scheme in [Scheme::SemiImplicit, Scheme::Euler] {
        let body = circular_mercury(scheme);
        let ticks = (body.period() / c.h).ceil() as usize;
        let mut sim = Simulation::new(vec![body], c).unwrap();
        let rec = run(&mut sim, ticks, false).unwrap();
        let (lo, hi) = rec.radial_drift(0);
        assert!(lo > -0.01 && hi < 0.01, "{scheme}: drift [{lo}, {hi}]");
    }
}

#[test]
fn schemes_differ_over_many_periods() {
    let c = Constants::new(G, 2000.0);
    let ticks = 10 * (circular_mercury(Scheme::Euler).period() / c.h).ceil() as usize;

    let mut a = Simulation::new(vec![circular_mercury(Scheme::SemiImplicit)], c).unwrap();
    let mut b = Simulation::new(vec![circular_mercury(Scheme::Euler)], c).unwrap();
    let rec_a = run(&mut a, ticks, false).unwrap();
    let rec_b = run(&mut b, ticks, false).unwrap();

    // velocity-first Euler keeps the radius bounded
    let (b_lo, b_hi) = rec_b.radial_drift(0);
    assert!(b_lo > -0.01 && b_hi < 0.01);

    // the damped position-first scheme spirals inward
    let a_final = rec_a.final_radial_drift(0);
    assert!(a_final < -0.1, "final drift {a_final}");
    assert!(a_final.abs() > b_lo.abs().max(b_hi.abs()));
}

// ==================================================================================
// Driver
// ==================================================================================

#[test]
fn identical_runs_are_bit_identical() {
    let build = |parallel| {
        Simulation::new(presets::solar_system().unwrap(), Constants::default())
            .unwrap()
            .with_parallel(parallel)
    };
    let mut first = build(false);
    let mut second = build(false);
    let mut third = build(true);
    for _ in 0..5000 {
        first.advance().unwrap();
        second.advance().unwrap();
        third.advance().unwrap();
    }
    assert_eq!(first.positions(), second.positions());
    assert_eq!(first.positions(), third.positions());
}

#[test]
fn positions_after_advance_reflect_a_full_step() {
    let c = Constants::default();
    let bodies = presets::solar_system().unwrap();
    let mut by_hand = bodies.clone();
    let mut sim = Simulation::new(bodies, c).unwrap();

    for _ in 0..3 {
        sim.advance().unwrap();
        for b in &mut by_hand {
            b.refresh_distance();
            b.step_position(&c).unwrap();
            b.step_velocity(&c).unwrap();
        }
        let expected: Vec<_> = by_hand.iter().map(Body::position).collect();
        assert_eq!(sim.positions(), expected);
    }
    assert_eq!(sim.tick(), 3);
}

#[test]
fn global_scheme_switch_applies_to_every_body() {
    let mut sim = Simulation::new(presets::solar_system().unwrap(), Constants::default()).unwrap();
    sim.set_scheme(Scheme::Euler);
    assert!(sim.bodies().iter().all(|b| b.scheme() == Scheme::Euler));

    let mut by_hand = presets::solar_system().unwrap();
    sim.advance().unwrap();
    let c = sim.constants();
    for b in &mut by_hand {
        b.set_scheme(Scheme::Euler);
        b.refresh_distance();
        b.step_velocity(&c).unwrap();
        b.step_position(&c).unwrap();
    }
    let expected: Vec<_> = by_hand.iter().map(Body::position).collect();
    assert_eq!(sim.positions(), expected);
}

#[test]
fn bundled_scenario_builds() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join("inner_planets.json");
    let cfg = orrery::ScenarioConfig::from_path(&path).unwrap();
    let sim = cfg.build().unwrap();
    assert_eq!(sim.bodies().len(), 4);
    assert_eq!(sim.bodies()[3].scheme(), Scheme::Euler);
    assert_eq!(cfg.ticks, 37090);
}
