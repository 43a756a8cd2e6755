use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use orrery::experiment::{self, calculate_trajectory_deviance, export_experiment, export_positions};
use orrery::{presets, Constants, LyapunovCalculator, ScenarioConfig, Scheme, Simulation};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SchemeArg {
    Symplectic,
    Euler,
}

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Symplectic => Scheme::SemiImplicit,
            SchemeArg::Euler => Scheme::Euler,
        }
    }
}

/// Headless orbit integrator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON scenario; the inner solar system is used when omitted
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Number of ticks, overriding the scenario
    #[arg(short = 'n', long)]
    ticks: Option<usize>,

    /// Scheme for every body, overriding the scenario
    #[arg(short, long, value_enum)]
    scheme: Option<SchemeArg>,

    /// Step bodies in parallel
    #[arg(long)]
    parallel: bool,

    /// Output directory for CSV exports
    #[arg(short, long, default_value = "experiment_data")]
    out: PathBuf,

    /// Also run the other scheme and report the trajectory deviance
    #[arg(long)]
    compare: bool,

    /// Rerun with initial positions perturbed by up to this many metres
    /// and estimate the divergence exponent
    #[arg(long)]
    perturb_position: Option<f64>,

    /// Velocity perturbation in m/s for the divergence rerun
    #[arg(long)]
    perturb_velocity: Option<f64>,

    /// Simulate all eight planets instead of Mercury through Saturn
    /// when no scenario is given
    #[arg(long)]
    full: bool,

    #[arg(long, default_value = "")]
    notes: String,
}

fn build_simulation(args: &Args) -> Result<(Simulation, usize)> {
    let (mut sim, ticks) = match &args.file {
        Some(path) => {
            let cfg = ScenarioConfig::from_path(path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?;
            (cfg.build()?, cfg.ticks)
        }
        None => {
            // one Mercury year
            let ticks = (presets::PLANETS[0].3 / Constants::default().h).ceil() as usize;
            let bodies = if args.full {
                presets::full_solar_system()?
            } else {
                presets::solar_system()?
            };
            (Simulation::new(bodies, Constants::default())?, ticks)
        }
    };
    if let Some(scheme) = args.scheme {
        sim.set_scheme(scheme.into());
    }
    if args.parallel {
        sim = sim.with_parallel(true);
    }
    Ok((sim, args.ticks.unwrap_or(ticks)))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (mut sim, ticks) = build_simulation(&args)?;
    let reference = sim.clone();
    let recording = experiment::run(&mut sim, ticks, true)?;

    for (i, name) in recording.names.iter().enumerate() {
        let (lo, hi) = recording.radial_drift(i);
        info!(
            "{name}: radial drift [{lo:+.3e}, {hi:+.3e}], max energy drift {:.3e}",
            recording.max_energy_drift(i)
        );
        if let Some(tick) = recording.halted_at[i] {
            info!("{name}: halted at tick {tick}");
        }
    }

    let label = recording.scheme.first().cloned().unwrap_or_default();
    export_positions(&recording, &sim, &args.out, &label)
        .with_context(|| format!("failed to export positions to {}", args.out.display()))?;

    if args.compare {
        let mut other = reference.clone();
        let other_scheme = match reference.bodies().first().map(|b| b.scheme()) {
            Some(Scheme::Euler) => Scheme::SemiImplicit,
            _ => Scheme::Euler,
        };
        other.set_scheme(other_scheme);
        let other_rec = experiment::run(&mut other, ticks, true)?;
        let deviance = calculate_trajectory_deviance(&recording, &other_rec)?;
        if let Some(last) = deviance.last() {
            info!("RMS deviance {} vs {}: {:.3e} m after {} ticks", label, other_scheme, last, ticks);
        }
        export_positions(&other_rec, &other, &args.out, other_scheme.name())?;
    }

    let mut lyapunov = 0.0;
    if args.perturb_position.is_some() || args.perturb_velocity.is_some() {
        let mut rng = rand::rng();
        let moved = orrery::perturb_init_conditions(
            &mut rng,
            reference.bodies(),
            args.perturb_position.unwrap_or(0.0),
            args.perturb_velocity.unwrap_or(0.0),
        )?;
        let mut perturbed = reference.with_bodies(moved)?;
        let perturbed_rec = experiment::run(&mut perturbed, ticks, true)?;
        lyapunov = LyapunovCalculator::new(&recording, &perturbed_rec)?.calculate_lyapunov_exponent()?;
        info!("divergence exponent: {lyapunov:.3e} 1/s");
    }

    export_experiment(
        &recording,
        &sim,
        lyapunov,
        &args.notes,
        &args.out.join("experiment.csv"),
    )
    .context("failed to append experiment record")?;

    Ok(())
}
