use std::error::Error;
use std::fs;

use gfdm_wave::discretization::generator::{jittered_lattice, lattice_triangulation};
use gfdm_wave::discretization::neighbors::{NeighborConfig, Topology};
use gfdm_wave::numerics::timing;
use gfdm_wave::numerics::transient::TransientSolver;
use gfdm_wave::physics::conditions::{Selector, WaveParams};
use gfdm_wave::physics::operator::DifferentialOperator;
use gfdm_wave::physics::profiles::selectable;
use gfdm_wave::physics::wave::GfdmWaveModel;
use gfdm_wave::physics::WaveModel;
use gfdm_wave::processing::csv_writer;
use gfdm_wave::processing::errors::rms_error_series;
use gfdm_wave::processing::summary::RunSummary;
use glam::DVec2;
use tracing_subscriber::EnvFilter;

const OUTPUT_DIR: &str = "output/main";
const LATTICE: usize = 21;
const THETAS: [f64; 5] = [1.0, 0.75, 0.5, 0.25, 0.0];

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    fs::create_dir_all(OUTPUT_DIR)?;

    let cloud = jittered_lattice([1.0, 1.0], LATTICE, LATTICE, 0.2, 42)?;
    let triangulation = lattice_triangulation(LATTICE, LATTICE)?;
    let params = WaveParams::default()
        .with_wave_speed(1.0)
        .with_selector(Selector::STANDING)
        .with_reference(DVec2::new(0.7, 0.7));
    let solver = TransientSolver::default().with_step_count(300);

    let modes = [
        ("triangulation", Topology::Triangulation(&triangulation)),
        ("cloud", Topology::Cloud(NeighborConfig::default())),
    ];

    for (label, topology) in modes {
        timing::reset_timing();
        let model = GfdmWaveModel::build(
            cloud.clone(),
            topology,
            &DifferentialOperator::laplacian(),
            selectable(0.001),
            params,
        )?;
        let mut summary = RunSummary::from_model(label, &model, model.neighbors());

        for theta in THETAS {
            let run = solver.with_theta(theta);
            match run.solve(&model) {
                Ok(solution) => {
                    let rms = rms_error_series(&solution.approximate, &solution.exact);
                    let tag = format!("{label}_theta{:03}", (theta * 100.0).round() as u32);
                    csv_writer::write_error_series(
                        format!("{OUTPUT_DIR}/{tag}_rms.csv"),
                        &solution.times,
                        &rms,
                    )?;
                    csv_writer::write_snapshot(
                        format!("{OUTPUT_DIR}/{tag}_final.csv"),
                        model.cloud(),
                        &solution,
                        solution.num_levels() - 1,
                    )?;
                    summary.add_run(&solution);
                }
                Err(e) => {
                    tracing::error!(theta, error = %e, "run failed");
                    summary.add_failure(theta, run.dt(), e);
                }
            }
        }

        let path = format!("{OUTPUT_DIR}/{label}_summary.txt");
        summary.write_to_file(&path)?;
        summary.print_to_console();
        println!("Summary saved to {path}");
    }

    Ok(())
}
