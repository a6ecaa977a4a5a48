use nalgebra::{DMatrix, DVector};
use sprs::{CsMat, TriMat};

/// Assembled N×N operator in CSR form.
///
/// Row `i` carries the central weight on the diagonal and the neighbor weights
/// off the diagonal. Boundary rows hold no entries.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalOperator {
    matrix: CsMat<f64>,
}

impl GlobalOperator {
    /// Collect `(row, col, value)` triplets into CSR. Repeated entries are summed.
    pub fn from_triplets(n: usize, triplets: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let triplets = triplets.into_iter();
        let mut tri = TriMat::with_capacity((n, n), triplets.size_hint().0);
        for (i, j, v) in triplets {
            tri.add_triplet(i, j, v);
        }
        Self {
            matrix: tri.to_csr(),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    #[inline]
    pub fn matrix(&self) -> &CsMat<f64> {
        &self.matrix
    }

    /// Stored entries of row `i`, ordered by column.
    pub fn row(&self, i: usize) -> Vec<(usize, f64)> {
        self.matrix
            .outer_view(i)
            .map(|row| row.iter().map(|(j, &v)| (j, v)).collect())
            .unwrap_or_default()
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.matrix
            .outer_view(i)
            .map(|row| row.iter().map(|(_, &v)| v).sum())
            .unwrap_or(0.0)
    }

    pub fn row_is_empty(&self, i: usize) -> bool {
        self.matrix.outer_view(i).map_or(true, |row| row.nnz() == 0)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix.get(i, j).copied().unwrap_or(0.0)
    }

    /// `L · u`
    pub fn apply(&self, u: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(self.dim());
        for (i, row) in self.matrix.outer_iterator().enumerate() {
            out[i] = row.iter().map(|(j, &v)| v * u[j]).sum();
        }
        out
    }

    /// `I + scale · L` as a dense matrix.
    pub fn shifted_identity(&self, scale: f64) -> DMatrix<f64> {
        let mut out = DMatrix::identity(self.dim(), self.dim());
        for (i, row) in self.matrix.outer_iterator().enumerate() {
            for (j, &v) in row.iter() {
                out[(i, j)] += scale * v;
            }
        }
        out
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.dim(), self.dim());
        for (i, row) in self.matrix.outer_iterator().enumerate() {
            for (j, &v) in row.iter() {
                out[(i, j)] = v;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalOperator {
        GlobalOperator::from_triplets(
            3,
            vec![(0, 0, -2.0), (0, 2, 1.0), (0, 1, 1.0), (2, 1, 4.0), (2, 1, 1.0)],
        )
    }

    #[test]
    fn triplets_are_sorted_and_summed() {
        let op = sample();
        assert_eq!(op.dim(), 3);
        assert_eq!(op.nnz(), 4);
        assert_eq!(op.row(0), vec![(0, -2.0), (1, 1.0), (2, 1.0)]);
        assert_eq!(op.get(2, 1), 5.0);
        assert!(op.row_is_empty(1));
        assert_eq!(op.row_sum(0), 0.0);
    }

    #[test]
    fn apply_matches_the_dense_product() {
        let op = sample();
        let u = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(op.apply(&u), op.to_dense() * &u);
        let shifted = op.shifted_identity(-0.5);
        assert_eq!(shifted[(1, 1)], 1.0);
        assert_eq!(shifted[(0, 0)], 2.0);
        assert_eq!(shifted[(2, 1)], -2.5);
    }
}
