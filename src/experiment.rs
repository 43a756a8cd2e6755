use crate::error::{Result, SimError};
use crate::system::Simulation;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::izip;
use log::info;
use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;
use std::time::Instant;

pub const ENERGY_THRESHOLDS: [f64; 10] = [1e-4, 1e-3, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0];

/// Per-tick history of a run.
#[derive(Debug, Clone)]
pub struct Recording {
    pub names: Vec<String>,
    pub scheme: Vec<String>,
    pub h: f64,
    pub num_steps: usize,
    pub initial_positions: Vec<Vector2<f64>>,
    /// positions[body][tick]
    pub positions: Vec<Vec<Vector2<f64>>>,
    /// specific orbital energy, energy[body][tick]
    pub energy: Vec<Vec<f64>>,
    pub initial_energy: Vec<f64>,
    pub energy_thresholds: Vec<f64>,
    /// first fraction of the run at which the relative energy drift of
    /// each body crossed each threshold
    pub idx_energy_exceeded: Vec<HashMap<OrderedFloat<f64>, Option<f64>>>,
    /// tick at which a body was halted
    pub halted_at: Vec<Option<u64>>,
    pub execution_duration: f64,
}

impl Recording {
    fn new(sim: &Simulation, num_steps: usize) -> Self {
        let g = sim.constants().g;
        let bodies = sim.bodies();
        let n = bodies.len();
        let energy_thresholds = ENERGY_THRESHOLDS.to_vec();
        let thresholds: HashMap<OrderedFloat<f64>, Option<f64>> = energy_thresholds
            .iter()
            .map(|&t| (OrderedFloat(t), None))
            .collect();
        Self {
            names: bodies.iter().map(|b| b.label().to_string()).collect(),
            scheme: bodies.iter().map(|b| b.scheme().to_string()).collect(),
            h: sim.constants().h,
            num_steps,
            initial_positions: bodies.iter().map(|b| b.position_vec()).collect(),
            positions: vec![Vec::with_capacity(num_steps); n],
            energy: vec![Vec::with_capacity(num_steps); n],
            initial_energy: bodies.iter().map(|b| b.specific_energy(g)).collect(),
            energy_thresholds,
            idx_energy_exceeded: vec![thresholds; n],
            halted_at: vec![None; n],
            execution_duration: 0.0,
        }
    }

    fn record_state(&mut self, sim: &Simulation, step: usize) {
        let g = sim.constants().g;
        for (i, body) in sim.bodies().iter().enumerate() {
            self.positions[i].push(body.position_vec());
            let current = body.specific_energy(g);
            self.energy[i].push(current);
            if sim.is_halted(i) {
                continue;
            }
            let drift = relative_drift(self.initial_energy[i], current);
            for &t in &self.energy_thresholds {
                if let Some(val) = self.idx_energy_exceeded[i].get_mut(&OrderedFloat(t)) {
                    if val.is_none() && drift > t {
                        *val = Some(step as f64 / self.num_steps as f64);
                    }
                }
            }
        }
    }

    /// Number of recorded ticks
    pub fn len(&self) -> usize {
        self.positions.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest relative energy drift seen by a body over the run
    pub fn max_energy_drift(&self, body: usize) -> f64 {
        let e0 = self.initial_energy[body];
        self.energy[body]
            .iter()
            .map(|&e| relative_drift(e0, e))
            .fold(0.0, f64::max)
    }

    /// (min, max) of r/r0 - 1 over the run
    pub fn radial_drift(&self, body: usize) -> (f64, f64) {
        let r0 = self.initial_positions[body].norm();
        self.positions[body]
            .iter()
            .map(|p| p.norm() / r0 - 1.0)
            .fold((0.0_f64, 0.0_f64), |(lo, hi), d| (lo.min(d), hi.max(d)))
    }

    /// r/r0 - 1 at the last recorded tick
    pub fn final_radial_drift(&self, body: usize) -> f64 {
        let r0 = self.initial_positions[body].norm();
        self.positions[body]
            .last()
            .map_or(0.0, |p| p.norm() / r0 - 1.0)
    }
}

fn relative_drift(initial: f64, current: f64) -> f64 {
    if initial == 0.0 {
        current.abs()
    } else {
        ((current - initial) / initial).abs()
    }
}

/// Advance `sim` by `num_steps` ticks, recording every tick.
pub fn run(sim: &mut Simulation, num_steps: usize, show_progress: bool) -> Result<Recording> {
    let start = Instant::now();
    let mut recording = Recording::new(sim, num_steps);

    let pb = if show_progress {
        ProgressBar::new(num_steps as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    for step in 0..num_steps {
        match sim.advance() {
            Ok(()) => {}
            Err(SimError::Halted { tick, bodies }) => {
                for i in bodies {
                    recording.halted_at[i] = Some(tick);
                }
            }
            Err(e) => return Err(e),
        }
        recording.record_state(sim, step);
        if step % 100 == 0 {
            pb.set_position(step as u64);
        }
    }
    pb.finish_with_message("Simulation complete");

    recording.execution_duration = start.elapsed().as_secs_f64();
    info!(
        "{} ticks of {} bodies in {:.3} s",
        num_steps,
        recording.names.len(),
        recording.execution_duration
    );
    Ok(recording)
}

#[derive(Serialize)]
struct ExperimentRecord {
    date: String,
    bodies: String,
    masses: String,
    initial_velocities: String,
    initial_positions: String,
    scheme: String,
    n_steps: usize,
    step_size: f64,
    max_energy_drift: f64,
    execution_duration: f64,
    energy_thresholds: String,
    lyapunov: f64,
    notes: String,
}

/// Append a one-line summary of the run to `file_path`, writing the
/// header only when the file is new.
pub fn export_experiment(
    recording: &Recording,
    sim: &Simulation,
    lyapunov_exp: f64,
    notes: &str,
    file_path: &Path,
) -> Result<()> {
    let bodies = sim.bodies();
    let max_drift = (0..recording.names.len())
        .map(|i| recording.max_energy_drift(i))
        .fold(0.0, f64::max);

    let thresholds: Vec<Vec<(f64, Option<f64>)>> = recording
        .idx_energy_exceeded
        .iter()
        .map(|per_body| {
            let mut v: Vec<(f64, Option<f64>)> =
                per_body.iter().map(|(k, v)| (k.into_inner(), *v)).collect();
            v.sort_by(|a, b| a.0.total_cmp(&b.0));
            v
        })
        .collect();

    let record = ExperimentRecord {
        date: Utc::now().to_rfc3339(),
        bodies: format!("{:?}", recording.names),
        masses: format!("{:?}", bodies.iter().map(|b| b.mass()).collect::<Vec<_>>()),
        initial_velocities: format!(
            "{:?}",
            bodies.iter().map(|b| b.initial_velocity()).collect::<Vec<_>>()
        ),
        initial_positions: format!(
            "{:?}",
            bodies.iter().map(|b| b.initial_position()).collect::<Vec<_>>()
        ),
        scheme: recording.scheme.join("/"),
        n_steps: recording.num_steps,
        step_size: recording.h,
        max_energy_drift: max_drift,
        execution_duration: recording.execution_duration,
        energy_thresholds: serde_json::to_string(&thresholds)?,
        lyapunov: lyapunov_exp,
        notes: notes.to_string(),
    };

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_exists = file_path.exists();
    let file = OpenOptions::new().append(true).create(true).open(file_path)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

/// Write `<label>_positions.csv` and `<label>_metadata.csv` into `dir`.
pub fn export_positions(recording: &Recording, sim: &Simulation, dir: &Path, label: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut wtr_meta = csv::Writer::from_path(dir.join(format!("{label}_metadata.csv")))?;
    wtr_meta.write_record(["body_id", "name", "mass", "central_mass", "period", "scheme"])?;
    for (i, body) in sim.bodies().iter().enumerate() {
        wtr_meta.write_record(&[
            i.to_string(),
            body.label().to_string(),
            body.mass().to_string(),
            body.central_mass().to_string(),
            body.period().to_string(),
            body.scheme().to_string(),
        ])?;
    }
    wtr_meta.flush()?;

    let mut wtr_pos = csv::Writer::from_path(dir.join(format!("{label}_positions.csv")))?;
    wtr_pos.write_record(["body_id", "tick", "x", "y"])?;
    for (i, positions) in recording.positions.iter().enumerate() {
        for (tick, pos) in positions.iter().enumerate() {
            wtr_pos.write_record(&[
                i.to_string(),
                (tick + 1).to_string(),
                pos.x.to_string(),
                pos.y.to_string(),
            ])?;
        }
    }
    wtr_pos.flush()?;

    Ok(())
}

/// RMS distance between matching bodies of two runs, per tick.
pub fn calculate_trajectory_deviance(run1: &Recording, run2: &Recording) -> Result<Vec<f64>> {
    let num_bodies = run1.positions.len();
    if num_bodies != run2.positions.len() || num_bodies == 0 {
        return Err(SimError::ShapeMismatch(format!(
            "{} vs {} bodies",
            num_bodies,
            run2.positions.len()
        )));
    }
    let num_steps = run1.len();
    if run1.positions.iter().chain(&run2.positions).any(|p| p.len() != num_steps) {
        return Err(SimError::ShapeMismatch("tick counts differ".to_string()));
    }

    Ok((0..num_steps)
        .map(|step| {
            let sum_sq_diff: f64 = izip!(&run1.positions, &run2.positions)
                .map(|(p1, p2)| (p1[step] - p2[step]).norm_squared())
                .sum();
            (sum_sq_diff / num_bodies as f64).sqrt()
        })
        .collect())
}
