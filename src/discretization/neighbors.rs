use super::cloud::{Cloud, Triangulation};
use crate::error::{ConfigurationError, GfdmError, InputError};
use kdtree::distance::squared_euclidean;
use kdtree::KdTree;

/// Unknowns of the second-order Taylor fit: `dx, dy, dx², dx·dy, dy²`.
pub const MIN_STENCIL: usize = 5;

/// Padding value used by [`NeighborTable::to_padded`].
pub const SENTINEL: i64 = -1;

/// How the stencil of each node is found.
#[derive(Clone, Copy, Debug)]
pub enum Topology<'a> {
    /// Nodes sharing a triangle are neighbors.
    Triangulation(&'a Triangulation),
    /// The `stencil_size` nearest nodes are neighbors.
    Cloud(NeighborConfig),
}

#[derive(Clone, Copy, Debug)]
pub struct NeighborConfig {
    pub stencil_size: usize,
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self { stencil_size: 8 }
    }
}

impl NeighborConfig {
    pub fn with_stencil_size(mut self, stencil_size: usize) -> Self {
        self.stencil_size = stencil_size;
        self
    }
}

/// Ordered neighbor lists, one per node.
///
/// Rows are variable length; `width` is the nominal row width used when the
/// table is exported in sentinel-padded form.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborTable {
    width: usize,
    rows: Vec<Vec<usize>>,
}

impl NeighborTable {
    /// Resolve the neighbor table for `cloud` and check that every interior
    /// node can support a full second-order stencil.
    pub fn resolve(cloud: &Cloud, topology: Topology<'_>) -> Result<Self, GfdmError> {
        let table = match topology {
            Topology::Triangulation(tri) => Self::from_triangulation(cloud, tri)?,
            Topology::Cloud(config) => Self::from_cloud(cloud, config.stencil_size)?,
        };
        table.check_stencils(cloud)?;
        Ok(table)
    }

    /// Neighbors are the other vertices of every triangle containing the node,
    /// in first-seen order over the triangle list.
    pub fn from_triangulation(
        cloud: &Cloud,
        triangulation: &Triangulation,
    ) -> Result<Self, ConfigurationError> {
        let n = cloud.len();
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (t, tri) in triangulation.triangles().iter().enumerate() {
            for &v in tri {
                if v >= n {
                    return Err(ConfigurationError::TriangleIndexOutOfRange {
                        triangle: t,
                        index: v as i64,
                        node_count: n,
                    });
                }
            }
            for (k, &v) in tri.iter().enumerate() {
                for (l, &w) in tri.iter().enumerate() {
                    if k != l && !rows[v].contains(&w) {
                        rows[v].push(w);
                    }
                }
            }
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        tracing::debug!(nodes = n, width, "resolved neighbors from triangulation");
        Ok(Self { width, rows })
    }

    /// Neighbors are the `stencil_size` nearest nodes, ties broken by index.
    pub fn from_cloud(cloud: &Cloud, stencil_size: usize) -> Result<Self, GfdmError> {
        if stencil_size < MIN_STENCIL {
            return Err(ConfigurationError::StencilTooSmall {
                requested: stencil_size,
                minimum: MIN_STENCIL,
            }
            .into());
        }

        let n = cloud.len();
        let points: Vec<[f64; 2]> = cloud.positions().map(|p| p.to_array()).collect();
        let mut tree = KdTree::new(2);
        for (i, p) in points.iter().enumerate() {
            tree.add(*p, i)
                .map_err(|_| InputError::NonFiniteCoordinate { node: i })?;
        }

        let take = stencil_size.min(n.saturating_sub(1));
        let mut rows = Vec::with_capacity(n);
        for (i, p) in points.iter().enumerate() {
            if take == 0 {
                rows.push(Vec::new());
                continue;
            }
            // The query includes the node itself, so ask for one extra.
            let nearest = tree
                .nearest(p, take + 1, &squared_euclidean)
                .map_err(|_| InputError::NonFiniteCoordinate { node: i })?;
            let cutoff = nearest.iter().map(|(d, _)| *d).fold(0.0, f64::max);

            // Everything at the cutoff distance competes for the last slots,
            // so gather all of it before breaking ties by index.
            let radius = cutoff * (1.0 + 1e-12) + f64::MIN_POSITIVE;
            let mut candidates: Vec<(f64, usize)> = tree
                .within(p, radius, &squared_euclidean)
                .map_err(|_| InputError::NonFiniteCoordinate { node: i })?
                .into_iter()
                .filter(|&(_, &j)| j != i)
                .map(|(d, &j)| (d, j))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            rows.push(candidates.into_iter().take(take).map(|(_, j)| j).collect());
        }

        tracing::debug!(nodes = n, stencil_size, "resolved neighbors from cloud");
        Ok(Self {
            width: stencil_size,
            rows,
        })
    }

    /// Accept an externally supplied, sentinel-padded table.
    pub fn from_padded(padded: &[Vec<i64>], cloud: &Cloud) -> Result<Self, GfdmError> {
        let n = cloud.len();
        if padded.len() != n {
            return Err(InputError::ShapeMismatch {
                what: "neighbor table rows",
                expected: n,
                found: padded.len(),
            }
            .into());
        }

        let width = padded.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows = Vec::with_capacity(n);
        for (i, raw) in padded.iter().enumerate() {
            if raw.len() != width {
                return Err(InputError::ShapeMismatch {
                    what: "neighbor table row width",
                    expected: width,
                    found: raw.len(),
                }
                .into());
            }
            let count = raw.iter().take_while(|&&v| v != SENTINEL).count();
            if raw[count..].iter().any(|&v| v != SENTINEL) {
                return Err(malformed(i, "sentinel entries must only pad the end of a row"));
            }
            let mut row = Vec::with_capacity(count);
            for &v in &raw[..count] {
                if v < 0 || v as usize >= n {
                    return Err(malformed(i, format!("index {v} is out of range")));
                }
                let j = v as usize;
                if j == i {
                    return Err(malformed(i, "a node cannot be its own neighbor"));
                }
                if row.contains(&j) {
                    return Err(malformed(i, format!("neighbor {j} is listed twice")));
                }
                row.push(j);
            }
            rows.push(row);
        }

        let table = Self { width, rows };
        table.check_stencils(cloud)?;
        Ok(table)
    }

    /// Interior nodes need at least [`MIN_STENCIL`] neighbors.
    pub fn check_stencils(&self, cloud: &Cloud) -> Result<(), ConfigurationError> {
        if self.rows.len() != cloud.len() {
            return Err(ConfigurationError::DimensionMismatch {
                what: "neighbor table",
                expected: cloud.len(),
                found: self.rows.len(),
            });
        }
        for node in cloud.interior_indices() {
            let found = self.rows[node].len();
            if found < MIN_STENCIL {
                return Err(ConfigurationError::InsufficientNeighbors {
                    node,
                    found,
                    required: MIN_STENCIL,
                });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn row(&self, node: usize) -> &[usize] {
        &self.rows[node]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Fixed-width rows padded with [`SENTINEL`].
    pub fn to_padded(&self) -> Vec<Vec<i64>> {
        self.rows
            .iter()
            .map(|row| {
                let mut out: Vec<i64> = row.iter().map(|&j| j as i64).collect();
                out.resize(self.width.max(row.len()), SENTINEL);
                out
            })
            .collect()
    }

    /// `(min, max, mean)` row length.
    pub fn stencil_stats(&self) -> (usize, usize, f64) {
        let min = self.rows.iter().map(Vec::len).min().unwrap_or(0);
        let max = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let total: usize = self.rows.iter().map(Vec::len).sum();
        (min, max, total as f64 / self.rows.len().max(1) as f64)
    }
}

fn malformed(node: usize, reason: impl Into<String>) -> GfdmError {
    ConfigurationError::MalformedNeighborRow {
        node,
        reason: reason.into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::{lattice_triangulation, regular_lattice};

    #[test]
    fn triangulation_neighbors_follow_first_seen_order() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let tri = lattice_triangulation(3, 3).unwrap();
        let table = NeighborTable::resolve(&cloud, Topology::Triangulation(&tri)).unwrap();
        assert_eq!(table.row(4), &[0, 1, 3, 5, 7, 8]);
        assert!(table.iter().enumerate().all(|(i, row)| !row.contains(&i)));
    }

    #[test]
    fn cloud_neighbors_are_the_nearest_ring() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let table = NeighborTable::from_cloud(&cloud, 8).unwrap();
        assert_eq!(table.row(4), &[1, 3, 5, 7, 0, 2, 6, 8]);
    }

    #[test]
    fn ties_are_broken_by_index() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        // The diagonal ring is cut after its lowest index.
        let table = NeighborTable::from_cloud(&cloud, 5).unwrap();
        assert_eq!(table.row(4), &[1, 3, 5, 7, 0]);
    }

    #[test]
    fn padded_rows_round_trip_through_the_sentinel() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let tri = lattice_triangulation(3, 3).unwrap();
        let table = NeighborTable::resolve(&cloud, Topology::Triangulation(&tri)).unwrap();
        let padded = table.to_padded();
        assert!(padded.iter().all(|r| r.len() == table.width()));
        assert_eq!(padded[0].last(), Some(&SENTINEL));
        assert_eq!(NeighborTable::from_padded(&padded, &cloud).unwrap(), table);
    }

    #[test]
    fn too_few_neighbors_names_the_node() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let mut padded = vec![vec![SENTINEL; 4]; 9];
        padded[4] = vec![1, 3, 5, 7];
        let err = NeighborTable::from_padded(&padded, &cloud).unwrap_err();
        assert_eq!(
            err,
            GfdmError::Configuration(ConfigurationError::InsufficientNeighbors {
                node: 4,
                found: 4,
                required: MIN_STENCIL,
            })
        );
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let mut padded = vec![vec![SENTINEL; 6]; 9];
        padded[4] = vec![0, 1, 2, 4, 5, 6];
        assert!(matches!(
            NeighborTable::from_padded(&padded, &cloud),
            Err(GfdmError::Configuration(ConfigurationError::MalformedNeighborRow { node: 4, .. }))
        ));
        padded[4] = vec![0, SENTINEL, 2, 3, 5, 6];
        assert!(NeighborTable::from_padded(&padded, &cloud).is_err());
    }

    #[test]
    fn small_stencils_are_a_configuration_error() {
        let cloud = regular_lattice([1.0, 1.0], 3, 3).unwrap();
        let err = NeighborTable::resolve(
            &cloud,
            Topology::Cloud(NeighborConfig::default().with_stencil_size(4)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GfdmError::Configuration(ConfigurationError::StencilTooSmall { requested: 4, .. })
        ));
    }
}
