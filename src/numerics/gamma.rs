//! Local least-squares weights ("Gamma" coefficients) and their assembly
//! into the global operator.
//!
//! For an interior node `i` with neighbors `j₁..j_k`, the second-order Taylor
//! expansion `u_j − u_i ≈ dx·ux + dy·uy + dx²·uxx/2 + dx·dy·uxy + dy²·uyy/2`
//! is fitted in the least-squares sense through the pseudo-inverse of the
//! k×5 design matrix. Contracting the fitted derivatives with the operator
//! coefficients gives one weight per neighbor; the central weight makes the
//! row annihilate constants.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::sparse::GlobalOperator;
use super::timing::record_assembly;
use super::Tolerances;
use crate::discretization::cloud::Cloud;
use crate::discretization::neighbors::{NeighborTable, MIN_STENCIL};
use crate::error::{ConfigurationError, GfdmError, NumericalError};
use crate::physics::operator::DifferentialOperator;

/// Weights of a single node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stencil {
    pub node: usize,
    pub neighbors: Vec<usize>,
    pub weights: Vec<f64>,
    pub central: f64,
    /// Numerical rank of the design matrix, `MIN_STENCIL` when well posed.
    pub rank: usize,
}

impl Stencil {
    fn empty(node: usize) -> Self {
        Self {
            node,
            neighbors: Vec::new(),
            weights: Vec::new(),
            central: 0.0,
            rank: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// Rows `[dx, dy, dx², dx·dy, dy²]`, one per neighbor.
fn design_matrix(cloud: &Cloud, node: usize, neighbors: &[usize]) -> DMatrix<f64> {
    let origin = cloud.position(node);
    DMatrix::from_fn(neighbors.len(), MIN_STENCIL, |r, col| {
        let d = cloud.position(neighbors[r]) - origin;
        match col {
            0 => d.x,
            1 => d.y,
            2 => d.x * d.x,
            3 => d.x * d.y,
            _ => d.y * d.y,
        }
    })
}

/// Compute the weights of `node`. Boundary nodes get an empty stencil.
pub fn local_stencil(
    cloud: &Cloud,
    neighbors: &NeighborTable,
    operator: &DifferentialOperator,
    node: usize,
    tolerances: &Tolerances,
) -> Result<Stencil, NumericalError> {
    if cloud.node(node).is_boundary() {
        return Ok(Stencil::empty(node));
    }

    let row = neighbors.row(node);
    if row.is_empty() {
        return Err(NumericalError::PseudoInverse {
            node,
            reason: "stencil has no neighbors".into(),
        });
    }

    let a = design_matrix(cloud, node, row);
    let svd = a
        .try_svd(true, true, f64::EPSILON, tolerances.svd_max_iterations)
        .ok_or_else(|| NumericalError::PseudoInverse {
            node,
            reason: format!(
                "SVD did not converge within {} iterations",
                tolerances.svd_max_iterations
            ),
        })?;

    let sigma_max = svd.singular_values.max();
    let cutoff = tolerances.pinv_rcond * sigma_max;
    let rank = svd.rank(cutoff);
    if rank < MIN_STENCIL {
        tracing::warn!(node, rank, neighbors = row.len(), "rank-deficient stencil");
    }

    let pinv = svd
        .pseudo_inverse(cutoff)
        .map_err(|reason| NumericalError::PseudoInverse {
            node,
            reason: reason.to_string(),
        })?;

    let rhs = DVector::from_row_slice(&operator.taylor_vector());
    let weights = pinv.transpose() * rhs;
    let central = -weights.sum();

    Ok(Stencil {
        node,
        neighbors: row.to_vec(),
        weights: weights.as_slice().to_vec(),
        central,
        rank,
    })
}

/// Assemble the global operator with default tolerances.
pub fn assemble(
    cloud: &Cloud,
    neighbors: &NeighborTable,
    operator: &DifferentialOperator,
) -> Result<GlobalOperator, GfdmError> {
    assemble_with(cloud, neighbors, operator, &Tolerances::default())
}

pub fn assemble_with(
    cloud: &Cloud,
    neighbors: &NeighborTable,
    operator: &DifferentialOperator,
    tolerances: &Tolerances,
) -> Result<GlobalOperator, GfdmError> {
    tolerances.validate()?;
    let n = cloud.len();
    if neighbors.len() != n {
        return Err(ConfigurationError::DimensionMismatch {
            what: "neighbor table",
            expected: n,
            found: neighbors.len(),
        }
        .into());
    }

    record_assembly(|| -> Result<GlobalOperator, GfdmError> {
        let stencils = (0..n)
            .into_par_iter()
            .map(|i| local_stencil(cloud, neighbors, operator, i, tolerances))
            .collect::<Result<Vec<_>, _>>()?;

        let nnz: usize = stencils
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.neighbors.len() + 1)
            .sum();
        let triplets = stencils.iter().filter(|s| !s.is_empty()).flat_map(|s| {
            std::iter::once((s.node, s.node, s.central)).chain(
                s.neighbors
                    .iter()
                    .zip(&s.weights)
                    .map(move |(&j, &w)| (s.node, j, w)),
            )
        });

        let global = GlobalOperator::from_triplets(n, triplets);
        tracing::debug!(
            nodes = n,
            interior = cloud.num_interior(),
            nnz,
            "assembled operator"
        );
        Ok(global)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::cloud::Node;
    use crate::discretization::generator::{lattice_triangulation, regular_lattice};
    use crate::discretization::neighbors::SENTINEL;
    use crate::discretization::neighbors::Topology;
    use approx::assert_relative_eq;

    #[test]
    fn lattice_ring_reproduces_the_least_squares_laplacian() {
        let h = 0.5;
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let table = NeighborTable::from_cloud(&cloud, 8).unwrap();
        let s = local_stencil(
            &cloud,
            &table,
            &DifferentialOperator::laplacian(),
            4,
            &Tolerances::default(),
        )
        .unwrap();

        assert_eq!(s.rank, 5);
        for (&j, &w) in s.neighbors.iter().zip(&s.weights) {
            let expected = if [1, 3, 5, 7].contains(&j) { 0.2 } else { 0.4 };
            assert_relative_eq!(w * h * h, expected, epsilon = 1e-12);
        }
        assert_relative_eq!(s.central * h * h, -2.4, epsilon = 1e-12);
    }

    #[test]
    fn constant_field_is_annihilated_at_the_centre() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let tri = lattice_triangulation(3, 3).unwrap();
        let table = NeighborTable::resolve(&cloud, Topology::Triangulation(&tri)).unwrap();
        let op = assemble(&cloud, &table, &DifferentialOperator::laplacian()).unwrap();
        let ones = DVector::from_element(cloud.len(), 1.0);
        assert!(op.apply(&ones)[4].abs() < 1e-12);
        for b in cloud.boundary_indices() {
            assert!(op.row_is_empty(b));
        }
        assert_eq!(op.nnz(), 7);
    }

    #[test]
    fn mismatched_table_is_rejected() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let other = regular_lattice([1.0, 1.0], 4, 4).unwrap();
        let table = NeighborTable::from_cloud(&other, 8).unwrap();
        let err = assemble(&cloud, &table, &DifferentialOperator::laplacian()).unwrap_err();
        assert!(matches!(
            err,
            GfdmError::Configuration(ConfigurationError::DimensionMismatch { expected: 9, found: 16, .. })
        ));
    }

    #[test]
    fn collinear_stencil_falls_back_to_the_pseudo_inverse() {
        let mut nodes = vec![Node::interior(0.0, 0.0)];
        for x in [-3.0, -2.0, -1.0, 1.0, 2.0, 3.0] {
            nodes.push(Node::boundary(x, 0.0));
        }
        let cloud = Cloud::new(nodes).unwrap();
        let mut padded = vec![vec![SENTINEL; 6]; cloud.len()];
        padded[0] = (1..=6).collect();
        let table = NeighborTable::from_padded(&padded, &cloud).unwrap();

        let s = local_stencil(
            &cloud,
            &table,
            &DifferentialOperator::laplacian(),
            0,
            &Tolerances::default(),
        )
        .unwrap();
        assert_eq!(s.rank, 2);
        assert!(s.rank < MIN_STENCIL);
        assert!(s.weights.iter().all(|w| w.is_finite()));
        assert!(s.central.is_finite());

        // Along the line the fit still sees u = x², whose Laplacian is 2.
        let moments = s.neighbors.iter().zip(&s.weights).fold([0.0; 2], |acc, (&j, &w)| {
            let dx = cloud.position(j).x;
            [acc[0] + w * dx, acc[1] + w * dx * dx]
        });
        assert_relative_eq!(moments[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(moments[1], 2.0, epsilon = 1e-10);

        let op = assemble(&cloud, &table, &DifferentialOperator::laplacian()).unwrap();
        assert!(op.row_sum(0).abs() < 1e-10);
        assert_relative_eq!(op.get(0, 0), s.central, epsilon = 1e-14);
    }

    #[test]
    fn negative_pseudo_inverse_cutoff_is_rejected() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let table = NeighborTable::from_cloud(&cloud, 8).unwrap();
        let tolerances = Tolerances::default().with_pinv_rcond(-1.0);
        let err = assemble_with(&cloud, &table, &DifferentialOperator::laplacian(), &tolerances)
            .unwrap_err();
        assert_eq!(
            err,
            GfdmError::Configuration(ConfigurationError::InvalidPinvRcond(-1.0))
        );
    }
}
