use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::solver::FactoredSystem;
use super::timing::{finalize_and_print, record_step};
use super::Tolerances;
use crate::error::{ConfigurationError, GfdmError, NumericalError};
use crate::physics::WaveModel;

/// Three-level theta scheme for `u_tt = c² L u`.
///
/// `theta = 1` is fully explicit, `theta = 0` fully implicit.
#[derive(Clone, Copy, Debug)]
pub struct TransientSolver {
    pub step_count: usize,
    pub theta: f64,
    pub t_end: f64,
    pub tolerances: Tolerances,
}

impl Default for TransientSolver {
    fn default() -> Self {
        Self {
            step_count: 1000,
            theta: 0.75,
            t_end: 1.0,
            tolerances: Tolerances::default(),
        }
    }
}

/// Approximate and reference fields, one column per time level.
#[derive(Clone, Debug)]
pub struct WaveSolution {
    pub approximate: DMatrix<f64>,
    pub exact: DMatrix<f64>,
    pub times: Vec<f64>,
    pub dt: f64,
    pub theta: f64,
}

impl WaveSolution {
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.times.len()
    }
}

impl TransientSolver {
    pub fn with_step_count(mut self, step_count: usize) -> Self {
        self.step_count = step_count;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_t_end(mut self, t_end: f64) -> Self {
        self.t_end = t_end;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.t_end / self.step_count as f64
    }

    /// `t_k = k·Δt` for `k = 0..=T`.
    pub fn time_levels(&self) -> Vec<f64> {
        let dt = self.dt();
        (0..=self.step_count).map(|k| k as f64 * dt).collect()
    }

    pub fn validate<M: WaveModel + ?Sized>(&self, model: &M) -> Result<(), ConfigurationError> {
        self.tolerances.validate()?;
        if !(0.0..=1.0).contains(&self.theta) {
            return Err(ConfigurationError::ThetaOutOfRange(self.theta));
        }
        if self.step_count == 0 {
            return Err(ConfigurationError::ZeroSteps);
        }
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(ConfigurationError::InvalidFinalTime(self.t_end));
        }
        let c = model.wave_speed();
        if !(c.is_finite() && c > 0.0) {
            return Err(ConfigurationError::InvalidWaveSpeed(c));
        }
        if model.operator().dim() != model.num_nodes() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "operator",
                expected: model.num_nodes(),
                found: model.operator().dim(),
            });
        }
        Ok(())
    }

    pub fn solve<M: WaveModel + ?Sized>(&self, model: &M) -> Result<WaveSolution, GfdmError> {
        self.solve_with_callback(model, |_, _, _| {})
    }

    /// Integrate and hand every finished level `(k, t_k, u_k)` to `callback`.
    ///
    /// Timing records accumulate across assembly and solves; callers reset
    /// them with [`reset_timing`](super::timing::reset_timing) before building the model.
    pub fn solve_with_callback<M, F>(
        &self,
        model: &M,
        mut callback: F,
    ) -> Result<WaveSolution, GfdmError>
    where
        M: WaveModel + ?Sized,
        F: FnMut(usize, f64, &DVector<f64>),
    {
        self.validate(model)?;
        let start = Instant::now();

        let n = model.num_nodes();
        let steps = self.step_count;
        let theta = self.theta;
        let c = model.wave_speed();
        let dt = self.dt();
        let times = self.time_levels();
        let lap = model.operator();
        let a = c * c * dt * dt;

        tracing::info!(nodes = n, steps, theta, dt, wave_speed = c, "starting wave integration");

        let singular = |step: usize| NumericalError::SingularSystem {
            step,
            theta,
            dt,
            wave_speed: c,
        };
        let check = |step: usize, u: &DVector<f64>| -> Result<(), NumericalError> {
            if u.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(NumericalError::NonFinite {
                    step,
                    time: times[step],
                    theta,
                })
            }
        };

        let mut approximate = DMatrix::zeros(n, steps + 1);

        let mut u_prev = model.initial_condition();
        check(0, &u_prev)?;
        approximate.set_column(0, &u_prev);
        callback(0, times[0], &u_prev);

        // Taylor seed, blended with the same theta as the recurrence.
        let velocity = model.initial_velocity();
        let lu0 = lap.apply(&u_prev);
        let mut rhs = &u_prev + &velocity * dt + &lu0 * (0.5 * theta * a);
        let mut u_curr = if theta < 1.0 {
            let seed = FactoredSystem::factor(
                lap.shifted_identity(-0.5 * (1.0 - theta) * a),
                self.tolerances.min_pivot_ratio,
            )
            .ok_or_else(|| singular(1))?;
            model.apply_boundary_conditions(times[1], &mut rhs);
            seed.solve(&rhs).ok_or_else(|| singular(1))?
        } else {
            rhs
        };
        model.apply_boundary_conditions(times[1], &mut u_curr);
        check(1, &u_curr)?;
        approximate.set_column(1, &u_curr);
        callback(1, times[1], &u_curr);

        let system = if theta < 1.0 && steps > 1 {
            Some(
                FactoredSystem::factor(
                    lap.shifted_identity(-(1.0 - theta) * a),
                    self.tolerances.min_pivot_ratio,
                )
                .ok_or_else(|| singular(2))?,
            )
        } else {
            None
        };

        for k in 2..=steps {
            let t_next = times[k];
            let u_next = record_step(|| -> Result<DVector<f64>, NumericalError> {
                let mut rhs = &u_curr * 2.0 - &u_prev;
                if theta > 0.0 {
                    rhs += lap.apply(&u_curr) * (theta * a);
                }
                let mut next = match &system {
                    Some(system) => {
                        model.apply_boundary_conditions(t_next, &mut rhs);
                        system.solve(&rhs).ok_or_else(|| singular(k))?
                    }
                    None => rhs,
                };
                model.apply_boundary_conditions(t_next, &mut next);
                Ok(next)
            })?;
            check(k, &u_next)?;
            approximate.set_column(k, &u_next);
            callback(k, t_next, &u_next);

            u_prev = std::mem::replace(&mut u_curr, u_next);

            if k % 100 == 0 {
                tracing::debug!(step = k, t = t_next, "advanced");
            }
        }

        let exact = exact_solution(model, &times);
        finalize_and_print(start.elapsed());
        tracing::info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            theta,
            "wave integration finished"
        );

        Ok(WaveSolution {
            approximate,
            exact,
            times,
            dt,
            theta,
        })
    }
}

/// Reference field `f(x, y, t_k)` for every level, evaluated in parallel.
pub fn exact_solution<M: WaveModel + ?Sized>(model: &M, times: &[f64]) -> DMatrix<f64> {
    let columns: Vec<DVector<f64>> = times.par_iter().map(|&t| model.exact_field(t)).collect();
    if columns.is_empty() {
        return DMatrix::zeros(model.num_nodes(), 0);
    }
    DMatrix::from_columns(&columns)
}
