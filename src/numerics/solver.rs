use nalgebra::{DMatrix, DVector, Dyn, LU};

use super::timing::record_factorization;

/// Dense LU factorization computed once and reused for every right-hand side.
///
/// The system is stored as a full `N × N` matrix, so memory grows as `N²` and
/// the factorization as `N³`. That suits clouds of up to a few thousand
/// nodes; larger clouds need a sparse factorization of the same matrix.
pub struct FactoredSystem {
    lu: LU<f64, Dyn, Dyn>,
    pivot_ratio: f64,
}

impl FactoredSystem {
    /// Factor `matrix`. Returns `None` when the smallest pivot of `U` is
    /// below `min_pivot_ratio` times the largest.
    pub fn factor(matrix: DMatrix<f64>, min_pivot_ratio: f64) -> Option<Self> {
        let n = matrix.nrows();
        let lu = record_factorization(|| matrix.lu());

        let u = lu.u();
        let (min_pivot, max_pivot) = (0..n).fold((f64::INFINITY, 0.0_f64), |(lo, hi), i| {
            let p = u[(i, i)].abs();
            (lo.min(p), hi.max(p))
        });
        let pivot_ratio = if n == 0 { 1.0 } else { min_pivot / max_pivot };

        tracing::debug!(n, pivot_ratio, "factored system matrix");
        if !pivot_ratio.is_finite() || pivot_ratio < min_pivot_ratio {
            return None;
        }
        Some(Self { lu, pivot_ratio })
    }

    #[inline]
    pub fn pivot_ratio(&self) -> f64 {
        self.pivot_ratio
    }

    pub fn solve(&self, rhs: &DVector<f64>) -> Option<DVector<f64>> {
        self.lu.solve(rhs)
    }
}
