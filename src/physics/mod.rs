pub mod conditions;
pub mod operator;
pub mod profiles;
pub mod wave;

use crate::discretization::cloud::Cloud;
use crate::numerics::sparse::GlobalOperator;
use nalgebra::DVector;

/// Defines the contract for a wave problem `u_tt = c² L u` on a cloud.
pub trait WaveModel: Sync {
    fn cloud(&self) -> &Cloud;

    /// Assembled spatial operator `L`.
    fn operator(&self) -> &GlobalOperator;

    fn wave_speed(&self) -> f64;

    /// Boundary, initial and reference value `f` at a node.
    fn value(&self, node: usize, t: f64) -> f64;

    /// Time derivative `g` at a node.
    fn velocity(&self, node: usize, t: f64) -> f64;

    fn num_nodes(&self) -> usize {
        self.cloud().len()
    }

    /// `f` evaluated at every node.
    fn exact_field(&self, t: f64) -> DVector<f64> {
        DVector::from_fn(self.num_nodes(), |i, _| self.value(i, t))
    }

    fn initial_condition(&self) -> DVector<f64> {
        self.exact_field(0.0)
    }

    fn initial_velocity(&self) -> DVector<f64> {
        DVector::from_fn(self.num_nodes(), |i, _| self.velocity(i, 0.0))
    }

    /// Overwrite boundary entries of `u` with their values at time `t`.
    fn apply_boundary_conditions(&self, t: f64, u: &mut DVector<f64>) {
        for i in self.cloud().boundary_indices() {
            u[i] = self.value(i, t);
        }
    }
}
