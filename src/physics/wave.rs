use super::conditions::{WaveConditions, WaveParams};
use super::operator::DifferentialOperator;
use super::WaveModel;
use crate::discretization::cloud::Cloud;
use crate::discretization::neighbors::{NeighborTable, Topology};
use crate::error::{ConfigurationError, GfdmError};
use crate::numerics::gamma::assemble_with;
use crate::numerics::sparse::GlobalOperator;
use crate::numerics::Tolerances;

/// Cloud, stencils, assembled operator and conditions of one wave problem.
#[derive(Clone, Debug)]
pub struct GfdmWaveModel {
    cloud: Cloud,
    neighbors: NeighborTable,
    operator: GlobalOperator,
    conditions: WaveConditions,
    params: WaveParams,
}

impl GfdmWaveModel {
    /// Resolve neighbors and assemble `operator` with default tolerances.
    pub fn build(
        cloud: Cloud,
        topology: Topology<'_>,
        operator: &DifferentialOperator,
        conditions: WaveConditions,
        params: WaveParams,
    ) -> Result<Self, GfdmError> {
        Self::build_with(
            cloud,
            topology,
            operator,
            conditions,
            params,
            &Tolerances::default(),
        )
    }

    pub fn build_with(
        cloud: Cloud,
        topology: Topology<'_>,
        operator: &DifferentialOperator,
        conditions: WaveConditions,
        params: WaveParams,
        tolerances: &Tolerances,
    ) -> Result<Self, GfdmError> {
        let neighbors = NeighborTable::resolve(&cloud, topology)?;
        let assembled = assemble_with(&cloud, &neighbors, operator, tolerances)?;
        tracing::info!(
            nodes = cloud.len(),
            interior = cloud.num_interior(),
            nnz = assembled.nnz(),
            "wave model ready"
        );
        Ok(Self {
            cloud,
            neighbors,
            operator: assembled,
            conditions,
            params,
        })
    }

    /// Wrap an operator assembled elsewhere.
    pub fn from_parts(
        cloud: Cloud,
        neighbors: NeighborTable,
        operator: GlobalOperator,
        conditions: WaveConditions,
        params: WaveParams,
    ) -> Result<Self, GfdmError> {
        if operator.dim() != cloud.len() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "operator",
                expected: cloud.len(),
                found: operator.dim(),
            }
            .into());
        }
        neighbors.check_stencils(&cloud)?;
        Ok(Self {
            cloud,
            neighbors,
            operator,
            conditions,
            params,
        })
    }

    /// Same cloud and operator under different wave parameters.
    pub fn with_params(mut self, params: WaveParams) -> Self {
        self.params = params;
        self
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn conditions(&self) -> &WaveConditions {
        &self.conditions
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }
}

impl WaveModel for GfdmWaveModel {
    fn cloud(&self) -> &Cloud {
        &self.cloud
    }

    fn operator(&self) -> &GlobalOperator {
        &self.operator
    }

    fn wave_speed(&self) -> f64 {
        self.params.wave_speed
    }

    fn value(&self, node: usize, t: f64) -> f64 {
        self.conditions
            .value_at(self.cloud.position(node), t, &self.params)
    }

    fn velocity(&self, node: usize, t: f64) -> f64 {
        self.conditions
            .velocity_at(self.cloud.position(node), t, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::regular_lattice;
    use crate::discretization::neighbors::NeighborConfig;
    use crate::physics::profiles::standing_wave;
    use nalgebra::DVector;

    #[test]
    fn boundary_conditions_touch_only_boundary_entries() {
        let cloud = regular_lattice([1.0, 1.0], 4, 4).unwrap();
        let model = GfdmWaveModel::build(
            cloud,
            Topology::Cloud(NeighborConfig::default()),
            &DifferentialOperator::laplacian(),
            WaveConditions::at_rest(7.0),
            WaveParams::default(),
        )
        .unwrap();

        let mut u = DVector::from_element(16, -1.0);
        model.apply_boundary_conditions(0.3, &mut u);
        for (i, node) in model.cloud().nodes().iter().enumerate() {
            let want = if node.is_boundary() { 7.0 } else { -1.0 };
            assert_eq!(u[i], want);
        }
        assert_eq!(model.initial_velocity(), DVector::zeros(16));
    }

    #[test]
    fn parts_must_agree_in_size() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let table = NeighborTable::from_cloud(&cloud, 8).unwrap();
        let operator = GlobalOperator::from_triplets(4, Vec::new());
        let err = GfdmWaveModel::from_parts(
            cloud,
            table,
            operator,
            standing_wave(),
            WaveParams::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GfdmError::Configuration(ConfigurationError::DimensionMismatch { what: "operator", .. })
        ));
    }
}
