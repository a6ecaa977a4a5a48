use crate::error::{ConfigurationError, InputError};
use glam::DVec2;

/// Role of a node in the solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Evolved by the operator.
    Interior,
    /// Value injected from the boundary condition at every time level.
    Boundary,
}

impl NodeKind {
    /// Interpret a numeric flag (`0` interior, `1` boundary).
    pub fn from_flag(node: usize, flag: f64) -> Result<Self, InputError> {
        if flag == 0.0 {
            Ok(NodeKind::Interior)
        } else if flag == 1.0 {
            Ok(NodeKind::Boundary)
        } else {
            Err(InputError::InvalidBoundaryFlag { node, flag })
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            NodeKind::Interior => 0,
            NodeKind::Boundary => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub position: DVec2,
    pub kind: NodeKind,
}

impl Node {
    pub fn interior(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            kind: NodeKind::Interior,
        }
    }

    pub fn boundary(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            kind: NodeKind::Boundary,
        }
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.kind == NodeKind::Boundary
    }
}

/// An unstructured cloud of points. Node indices are stable identifiers.
#[derive(Clone, Debug)]
pub struct Cloud {
    nodes: Vec<Node>,
}

impl Cloud {
    /// Build a cloud from node records, rejecting empty or non-finite input.
    pub fn new(nodes: Vec<Node>) -> Result<Self, InputError> {
        if nodes.is_empty() {
            return Err(InputError::EmptyCloud);
        }
        if let Some(node) = nodes.iter().position(|n| !n.position.is_finite()) {
            return Err(InputError::NonFiniteCoordinate { node });
        }
        Ok(Self { nodes })
    }

    /// Build a cloud from parallel coordinate and flag arrays.
    pub fn from_arrays(coordinates: &[[f64; 2]], flags: &[f64]) -> Result<Self, InputError> {
        if coordinates.len() != flags.len() {
            return Err(InputError::ShapeMismatch {
                what: "boundary flags",
                expected: coordinates.len(),
                found: flags.len(),
            });
        }
        let nodes = coordinates
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(i, (&[x, y], &flag))| {
                Ok(Node {
                    position: DVec2::new(x, y),
                    kind: NodeKind::from_flag(i, flag)?,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;
        Self::new(nodes)
    }

    /// Build a cloud from packed `(x, y, flag)` rows.
    pub fn from_packed(rows: &[[f64; 3]]) -> Result<Self, InputError> {
        let nodes = rows
            .iter()
            .enumerate()
            .map(|(i, &[x, y, flag])| {
                Ok(Node {
                    position: DVec2::new(x, y),
                    kind: NodeKind::from_flag(i, flag)?,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;
        Self::new(nodes)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i]
    }

    #[inline]
    pub fn position(&self, i: usize) -> DVec2 {
        self.nodes[i].position
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.nodes.iter().map(|n| n.position)
    }

    pub fn interior_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_boundary())
            .map(|(i, _)| i)
    }

    pub fn boundary_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_boundary())
            .map(|(i, _)| i)
    }

    pub fn num_interior(&self) -> usize {
        self.interior_indices().count()
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        self.positions().fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        )
    }
}

/// Triangle connectivity over a [`Cloud`], always 0-based.
#[derive(Clone, Debug)]
pub struct Triangulation {
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Build from 0-based triangles, validating every index against `node_count`.
    pub fn new(triangles: Vec<[usize; 3]>, node_count: usize) -> Result<Self, ConfigurationError> {
        for (t, tri) in triangles.iter().enumerate() {
            for (k, &v) in tri.iter().enumerate() {
                if v >= node_count {
                    return Err(ConfigurationError::TriangleIndexOutOfRange {
                        triangle: t,
                        index: v as i64,
                        node_count,
                    });
                }
                if tri[..k].contains(&v) {
                    return Err(ConfigurationError::DegenerateTriangle {
                        triangle: t,
                        index: v,
                    });
                }
            }
        }
        Ok(Self { triangles })
    }

    /// Build from raw connectivity that may be 1-based.
    ///
    /// Input whose smallest index is 1 is shifted down by one, matching how
    /// triangulations exported from 1-based tools are stored.
    pub fn from_raw(raw: &[[i64; 3]], node_count: usize) -> Result<Self, ConfigurationError> {
        let min = raw.iter().flatten().copied().min().unwrap_or(0);
        let offset = if min == 1 { 1 } else { 0 };
        if offset == 1 {
            tracing::debug!("triangulation looks 1-based, shifting indices down");
        }

        let mut triangles = Vec::with_capacity(raw.len());
        for (t, tri) in raw.iter().enumerate() {
            let mut out = [0usize; 3];
            for (k, &v) in tri.iter().enumerate() {
                let shifted = v - offset;
                if shifted < 0 || shifted as usize >= node_count {
                    return Err(ConfigurationError::TriangleIndexOutOfRange {
                        triangle: t,
                        index: v,
                        node_count,
                    });
                }
                out[k] = shifted as usize;
            }
            triangles.push(out);
        }
        Self::new(triangles, node_count)
    }

    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
