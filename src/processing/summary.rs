use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::errors::{max_abs_error, max_row_sum_residual, rms_error_series};
use crate::discretization::neighbors::NeighborTable;
use crate::numerics::transient::WaveSolution;
use crate::physics::WaveModel;

/// Outcome of one theta run.
#[derive(Clone, Debug)]
pub struct RunRecord {
    pub theta: f64,
    pub dt: f64,
    pub levels: usize,
    pub final_rms: f64,
    pub peak_rms: f64,
    pub max_abs_error: f64,
    /// Failure message when the run did not complete.
    pub failure: Option<String>,
}

pub struct RunSummary {
    pub label: String,

    // Cloud info
    pub num_nodes: usize,
    pub num_interior: usize,
    pub domain_extent: ((f64, f64), (f64, f64)),

    // Stencil info
    pub min_stencil: usize,
    pub max_stencil: usize,
    pub mean_stencil: f64,

    // Operator info
    pub nnz: usize,
    pub max_row_sum: f64,

    pub wave_speed: f64,
    pub runs: Vec<RunRecord>,
}

impl RunSummary {
    pub fn from_model<M: WaveModel + ?Sized>(
        label: impl Into<String>,
        model: &M,
        neighbors: &NeighborTable,
    ) -> Self {
        let cloud = model.cloud();
        let (lo, hi) = cloud.bounds();
        let (min_stencil, max_stencil, mean_stencil) = interior_stencil_stats(model, neighbors);

        Self {
            label: label.into(),
            num_nodes: cloud.len(),
            num_interior: cloud.num_interior(),
            domain_extent: ((lo.x, hi.x), (lo.y, hi.y)),
            min_stencil,
            max_stencil,
            mean_stencil,
            nnz: model.operator().nnz(),
            max_row_sum: max_row_sum_residual(model.operator(), cloud),
            wave_speed: model.wave_speed(),
            runs: Vec::new(),
        }
    }

    pub fn add_run(&mut self, solution: &WaveSolution) {
        let rms = rms_error_series(&solution.approximate, &solution.exact);
        self.runs.push(RunRecord {
            theta: solution.theta,
            dt: solution.dt,
            levels: solution.num_levels(),
            final_rms: rms.last().copied().unwrap_or(0.0),
            peak_rms: rms.iter().copied().fold(0.0, f64::max),
            max_abs_error: max_abs_error(&solution.approximate, &solution.exact),
            failure: None,
        });
    }

    pub fn add_failure(&mut self, theta: f64, dt: f64, error: impl ToString) {
        self.runs.push(RunRecord {
            theta,
            dt,
            levels: 0,
            final_rms: f64::NAN,
            peak_rms: f64::NAN,
            max_abs_error: f64::NAN,
            failure: Some(error.to_string()),
        });
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "GFDM WAVE SUMMARY: {}", self.label)?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "CLOUD")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Number of nodes:     {}", self.num_nodes)?;
        writeln!(file, "Interior nodes:      {}", self.num_interior)?;
        writeln!(
            file,
            "Domain extent:       [{:.4}, {:.4}] x [{:.4}, {:.4}]",
            self.domain_extent.0 .0,
            self.domain_extent.0 .1,
            self.domain_extent.1 .0,
            self.domain_extent.1 .1
        )?;
        writeln!(file)?;

        writeln!(file, "STENCILS (interior)")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Min neighbors:       {}", self.min_stencil)?;
        writeln!(file, "Max neighbors:       {}", self.max_stencil)?;
        writeln!(file, "Mean neighbors:      {:.2}", self.mean_stencil)?;
        writeln!(file)?;

        writeln!(file, "OPERATOR")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Non-zeros:           {}", self.nnz)?;
        writeln!(file, "Max |row sum|:       {:.6e}", self.max_row_sum)?;
        writeln!(file, "Wave speed:          {}", self.wave_speed)?;
        writeln!(file)?;

        if !self.runs.is_empty() {
            writeln!(file, "RUNS")?;
            writeln!(file, "{}", "-".repeat(60))?;
            writeln!(
                file,
                "{:>6} | {:>10} | {:>11} | {:>11} | {:>11}",
                "theta", "dt", "final rms", "peak rms", "max |err|"
            )?;
            for run in &self.runs {
                match &run.failure {
                    None => writeln!(
                        file,
                        "{:>6.2} | {:>10.3e} | {:>11.4e} | {:>11.4e} | {:>11.4e}",
                        run.theta, run.dt, run.final_rms, run.peak_rms, run.max_abs_error
                    )?,
                    Some(msg) => writeln!(
                        file,
                        "{:>6.2} | {:>10.3e} | FAILED: {}",
                        run.theta, run.dt, msg
                    )?,
                }
            }
            writeln!(file)?;
        }

        writeln!(file, "{}", "=".repeat(60))?;
        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SUMMARY: {}", self.label);
        println!("{}", "=".repeat(60));
        println!(
            "Cloud:         {} nodes ({} interior)",
            self.num_nodes, self.num_interior
        );
        println!(
            "Stencils:      {}..{} neighbors, max |row sum| {:.3e}",
            self.min_stencil, self.max_stencil, self.max_row_sum
        );
        for run in &self.runs {
            match &run.failure {
                None => println!(
                    "theta = {:.2}:  final rms {:.3e}, max |err| {:.3e}",
                    run.theta, run.final_rms, run.max_abs_error
                ),
                Some(msg) => println!("theta = {:.2}:  failed ({msg})", run.theta),
            }
        }
        println!("{}\n", "=".repeat(60));
    }
}

fn interior_stencil_stats<M: WaveModel + ?Sized>(
    model: &M,
    neighbors: &NeighborTable,
) -> (usize, usize, f64) {
    let sizes: Vec<usize> = model
        .cloud()
        .interior_indices()
        .map(|i| neighbors.row(i).len())
        .collect();
    if sizes.is_empty() {
        return neighbors.stencil_stats();
    }
    let min = sizes.iter().copied().min().unwrap_or(0);
    let max = sizes.iter().copied().max().unwrap_or(0);
    let mean = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
    (min, max, mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::regular_lattice;
    use crate::discretization::neighbors::{NeighborConfig, Topology};
    use crate::numerics::transient::TransientSolver;
    use crate::physics::conditions::WaveParams;
    use crate::physics::operator::DifferentialOperator;
    use crate::physics::profiles::standing_wave;
    use crate::physics::wave::GfdmWaveModel;

    #[test]
    fn summary_records_runs_and_failures() {
        let model = GfdmWaveModel::build(
            regular_lattice([1.0, 1.0], 5, 5).unwrap(),
            Topology::Cloud(NeighborConfig::default()),
            &DifferentialOperator::laplacian(),
            standing_wave(),
            WaveParams::default(),
        )
        .unwrap();
        let mut summary = RunSummary::from_model("lattice", &model, model.neighbors());
        assert_eq!(summary.num_interior, 9);
        assert_eq!((summary.min_stencil, summary.max_stencil), (8, 8));
        assert!(summary.max_row_sum < 1e-10);

        let sol = TransientSolver::default()
            .with_step_count(20)
            .with_theta(0.5)
            .solve(&model)
            .unwrap();
        summary.add_run(&sol);
        summary.add_failure(1.0, 0.05, "diverged");
        assert_eq!(summary.runs.len(), 2);
        assert_eq!(summary.runs[0].levels, 21);
        assert!(summary.runs[0].final_rms.is_finite());

        let path = std::env::temp_dir().join("gfdm_wave_summary_test.txt");
        summary.write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("FAILED: diverged"));
        std::fs::remove_file(&path).ok();
    }
}
