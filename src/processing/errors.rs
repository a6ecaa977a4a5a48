use nalgebra::DMatrix;

use crate::discretization::cloud::Cloud;
use crate::numerics::sparse::GlobalOperator;

/// Root-mean-square difference per time level, `sqrt(Σ (ap − ex)² / N)`.
pub fn rms_error_series(approximate: &DMatrix<f64>, exact: &DMatrix<f64>) -> Vec<f64> {
    let n = approximate.nrows().max(1) as f64;
    approximate
        .column_iter()
        .zip(exact.column_iter())
        .map(|(ap, ex)| ((ap - ex).norm_squared() / n).sqrt())
        .collect()
}

pub fn max_abs_error(approximate: &DMatrix<f64>, exact: &DMatrix<f64>) -> f64 {
    approximate
        .iter()
        .zip(exact.iter())
        .map(|(a, e)| (a - e).abs())
        .fold(0.0, f64::max)
}

/// Largest `|Σ_j L_ij|` over interior rows. Zero for an exact constant annihilator.
pub fn max_row_sum_residual(operator: &GlobalOperator, cloud: &Cloud) -> f64 {
    cloud
        .interior_indices()
        .map(|i| operator.row_sum(i).abs())
        .fold(0.0, f64::max)
}
