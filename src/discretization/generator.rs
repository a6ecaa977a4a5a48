use super::cloud::{Cloud, Node, Triangulation};
use crate::error::{ConfigurationError, InputError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a regular `nx × ny` lattice over `[0, width[0]] × [0, width[1]]`.
/// Nodes on the outer ring are tagged as boundary. Index is `j * nx + i`.
pub fn regular_lattice(width: [f64; 2], nx: usize, ny: usize) -> Result<Cloud, InputError> {
    let dx = width[0] / (nx.max(2) - 1) as f64;
    let dy = width[1] / (ny.max(2) - 1) as f64;

    let mut nodes = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let x = i as f64 * dx;
            let y = j as f64 * dy;
            let on_edge = i == 0 || j == 0 || i + 1 == nx || j + 1 == ny;
            nodes.push(if on_edge {
                Node::boundary(x, y)
            } else {
                Node::interior(x, y)
            });
        }
    }

    Cloud::new(nodes)
}

/// Lattice with every interior node displaced by up to `amplitude` lattice
/// spacings in each direction. Reproducible for a given `seed`.
pub fn jittered_lattice(
    width: [f64; 2],
    nx: usize,
    ny: usize,
    amplitude: f64,
    seed: u64,
) -> Result<Cloud, InputError> {
    let lattice = regular_lattice(width, nx, ny)?;
    let dx = width[0] / (nx.max(2) - 1) as f64;
    let dy = width[1] / (ny.max(2) - 1) as f64;
    let a = amplitude.abs().min(0.45);
    let mut rng = StdRng::seed_from_u64(seed);

    let nodes = lattice
        .nodes()
        .iter()
        .map(|node| {
            if node.is_boundary() || a == 0.0 {
                *node
            } else {
                let sx: f64 = rng.random_range(-a..=a);
                let sy: f64 = rng.random_range(-a..=a);
                Node::interior(node.position.x + sx * dx, node.position.y + sy * dy)
            }
        })
        .collect();

    Cloud::new(nodes)
}

/// Split every lattice cell into two triangles along its rising diagonal.
/// Matches the node numbering of [`regular_lattice`].
pub fn lattice_triangulation(nx: usize, ny: usize) -> Result<Triangulation, ConfigurationError> {
    let mut triangles = Vec::with_capacity(2 * nx.saturating_sub(1) * ny.saturating_sub(1));
    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let a = j * nx + i;
            let b = a + 1;
            let c = a + nx;
            let d = c + 1;
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }
    Triangulation::new(triangles, nx * ny)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_tags_the_outer_ring() {
        let cloud = regular_lattice([1.0, 1.0], 5, 4).unwrap();
        assert_eq!(cloud.len(), 20);
        assert_eq!(cloud.num_interior(), 3 * 2);
        let (lo, hi) = cloud.bounds();
        assert_eq!((lo.x, lo.y, hi.x, hi.y), (0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn jitter_is_reproducible_and_keeps_the_boundary() {
        let a = jittered_lattice([1.0, 1.0], 6, 6, 0.3, 7).unwrap();
        let b = jittered_lattice([1.0, 1.0], 6, 6, 0.3, 7).unwrap();
        let grid = regular_lattice([1.0, 1.0], 6, 6).unwrap();
        for i in 0..a.len() {
            assert_eq!(a.position(i), b.position(i));
            if grid.node(i).is_boundary() {
                assert_eq!(a.position(i), grid.position(i));
            }
        }
        assert!((0..a.len()).any(|i| a.position(i) != grid.position(i)));
    }

    #[test]
    fn triangulation_covers_every_cell_twice() {
        let tri = lattice_triangulation(4, 3).unwrap();
        assert_eq!(tri.len(), 2 * 3 * 2);
        assert_eq!(tri.triangles()[0], [0, 1, 5]);
        assert_eq!(tri.triangles()[1], [0, 5, 4]);
    }
}
