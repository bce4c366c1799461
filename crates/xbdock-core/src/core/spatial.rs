use crate::core::grid::array::Array3;
use crate::core::grid::dims::{GridDims, dims_begin, dims_end};
use crate::core::models::atom::AtomTyping;
use crate::core::models::model::Model;
use crate::core::utils::geometry::brick_distance_sqr;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds receptor atoms that may interact with a point.
pub trait SpatialIndex: Sync {
    /// Indices into the model's receptor atoms. The list is a superset of
    /// the atoms within the cutoff of `point`; callers re-check distances.
    fn possibilities(&self, point: &Point3<f64>) -> &[usize];
}

/// A cell list over the docking box.
///
/// Each cell stores the receptor atoms whose distance to the cell (as a
/// box) is at most the cutoff, so any point inside the cell sees every atom
/// in range. Points outside the box use the nearest boundary cell.
#[derive(Debug, Clone)]
pub struct NeighborGrid {
    dims: GridDims,
    cells: Array3<Vec<usize>>,
}

impl NeighborGrid {
    /// Indexes the in-scheme receptor atoms of `model` over `dims`, one cell
    /// per interval.
    ///
    /// # Arguments
    ///
    /// * `model` - The model whose receptor atoms are indexed.
    /// * `dims` - Cell layout; usually the coarse neighbor dims of the box.
    /// * `cutoff_sqr` - Squared interaction cutoff.
    /// * `typing` - Receptor atoms without a type under this scheme are left out.
    pub fn new(model: &Model, dims: &GridDims, cutoff_sqr: f64, typing: AtomTyping) -> Self {
        let dims = dims.map(|mut d| {
            d.n = d.n.max(1);
            d
        });
        let shape = [dims[0].n, dims[1].n, dims[2].n];
        let cell_size = Vector3::new(
            dims[0].span() / shape[0] as f64,
            dims[1].span() / shape[1] as f64,
            dims[2].span() / shape[2] as f64,
        );

        let box_begin = dims_begin(&dims);
        let box_end = dims_end(&dims);
        let relevant: Vec<usize> = model
            .grid_atoms()
            .iter()
            .enumerate()
            .filter(|(_, atom)| {
                atom.type_id(typing).is_some()
                    && brick_distance_sqr(&box_begin, &box_end, &atom.position) <= cutoff_sqr
            })
            .map(|(i, _)| i)
            .collect();

        if relevant.is_empty() {
            debug!("No receptor atoms near the box; neighbor grid is empty.");
            return Self {
                dims,
                cells: Array3::new(shape[0], shape[1], shape[2]),
            };
        }

        // One tree entry per distinct position; kiddo leaves cannot hold
        // more than a bucket's worth of coincident points.
        let mut sites: Vec<[f64; 3]> = Vec::new();
        let mut occupants: Vec<Vec<usize>> = Vec::new();
        let mut site_of: HashMap<[u64; 3], usize> = HashMap::new();
        for &i in &relevant {
            let p = model.grid_atoms()[i].position;
            // `+ 0.0` folds -0.0 into 0.0.
            let site = [p.x + 0.0, p.y + 0.0, p.z + 0.0];
            let key = site.map(f64::to_bits);
            let slot = *site_of.entry(key).or_insert_with(|| {
                sites.push(site);
                occupants.push(Vec::new());
                sites.len() - 1
            });
            occupants[slot].push(i);
        }
        let kdtree: KdTree<f64, 3> = (&sites).into();

        // Padded so the brick test below alone decides boundary cases.
        let search_radius = (cutoff_sqr.sqrt() + cell_size.norm() / 2.0) * (1.0 + 1e-9);
        let search_radius_sq = search_radius * search_radius;

        let cell_atoms = |cell: usize| -> Vec<usize> {
            let x = cell / (shape[1] * shape[2]);
            let y = (cell / shape[2]) % shape[1];
            let z = cell % shape[2];
            let begin = box_begin
                + Vector3::new(x as f64, y as f64, z as f64).component_mul(&cell_size);
            let end = begin + cell_size;
            let center = begin + cell_size / 2.0;

            let mut found: Vec<usize> = kdtree
                .within_unsorted::<SquaredEuclidean>(&[center.x, center.y, center.z], search_radius_sq)
                .into_iter()
                .filter(|neighbour| {
                    let [x, y, z] = sites[neighbour.item as usize];
                    brick_distance_sqr(&begin, &end, &Point3::new(x, y, z)) <= cutoff_sqr
                })
                .flat_map(|neighbour| occupants[neighbour.item as usize].iter().copied())
                .collect();
            found.sort_unstable();
            found
        };

        let total = shape[0] * shape[1] * shape[2];

        #[cfg(not(feature = "parallel"))]
        let lists: Vec<Vec<usize>> = (0..total).map(cell_atoms).collect();

        #[cfg(feature = "parallel")]
        let lists: Vec<Vec<usize>> = (0..total).into_par_iter().map(cell_atoms).collect();

        debug!(
            cells = total,
            relevant_atoms = relevant.len(),
            distinct_sites = sites.len(),
            "Built receptor neighbor grid."
        );

        // Cell lists are produced in x-major order, matching Array3's layout.
        let cells = Array3::from_vec(shape, lists)
            .unwrap_or_else(|| Array3::new(shape[0], shape[1], shape[2]));
        Self { dims, cells }
    }

    fn cell_of(&self, point: &Point3<f64>) -> (usize, usize, usize) {
        let index = |axis: usize| {
            let d = &self.dims[axis];
            let n = self.cells.dim(axis);
            let t = (point[axis] - d.begin) * n as f64 / d.span();
            if t <= 0.0 {
                0
            } else {
                (t as usize).min(n - 1)
            }
        };
        (index(0), index(1), index(2))
    }
}

impl SpatialIndex for NeighborGrid {
    fn possibilities(&self, point: &Point3<f64>) -> &[usize] {
        &self.cells[self.cell_of(point)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::dims::{GridDim, neighbor_dims};
    use crate::core::models::atom::{AdType, Atom, XsType};

    fn receptor(positions: &[[f64; 3]]) -> Model {
        let mut model = Model::new();
        for p in positions {
            model.add_grid_atom(Atom::new(
                "O",
                AdType::OA,
                Some(XsType::OA),
                Point3::new(p[0], p[1], p[2]),
            ));
        }
        model
    }

    fn brute_force(model: &Model, point: &Point3<f64>, cutoff_sqr: f64) -> Vec<usize> {
        model
            .grid_atoms()
            .iter()
            .enumerate()
            .filter(|(_, a)| (a.position - point).norm_squared() <= cutoff_sqr)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn possibilities_cover_every_atom_in_range() {
        let model = receptor(&[
            [0.5, 0.5, 0.5],
            [5.0, 5.0, 5.0],
            [11.0, 2.0, 9.0],
            [-3.0, 6.0, 6.0],
            [20.0, 20.0, 20.0],
        ]);
        let dims = neighbor_dims(&[GridDim::new(0.0, 12.0, 32); 3]);
        let cutoff_sqr = 16.0;
        let index = NeighborGrid::new(&model, &dims, cutoff_sqr, AtomTyping::XScore);

        for p in [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(6.0, 4.5, 5.5),
            Point3::new(11.9, 0.1, 11.9),
            Point3::new(0.0, 6.0, 6.0),
        ] {
            let found = index.possibilities(&p);
            for i in brute_force(&model, &p, cutoff_sqr) {
                assert!(found.contains(&i), "atom {} missing near {:?}", i, p);
            }
        }
    }

    #[test]
    fn atoms_exactly_at_the_cutoff_are_listed() {
        let model = receptor(&[[-1.0, 6.0, 6.0]]);
        let dims = neighbor_dims(&[GridDim::new(0.0, 12.0, 32); 3]);
        let index = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::XScore);

        // (3, 6, 6) lies on a cell face, 4 Å from the atom.
        let point = Point3::new(3.0, 6.0, 6.0);
        assert_eq!(brute_force(&model, &point, 16.0), vec![0]);
        assert_eq!(index.possibilities(&point), &[0]);
    }

    #[test]
    fn coincident_atoms_are_all_listed() {
        let positions = vec![[1.0, 1.0, 1.0]; 40];
        let mut model = receptor(&positions);
        model.add_grid_atom(Atom::new(
            "O",
            AdType::OA,
            Some(XsType::OA),
            Point3::new(-0.0, 1.0, 1.0),
        ));
        model.add_grid_atom(Atom::new(
            "O",
            AdType::OA,
            Some(XsType::OA),
            Point3::new(0.0, 1.0, 1.0),
        ));
        let dims = neighbor_dims(&[GridDim::new(0.0, 6.0, 16); 3]);
        let index = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::XScore);

        let found = index.possibilities(&Point3::new(1.5, 1.0, 1.0));
        assert_eq!(found, (0..42).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn atoms_far_from_the_box_are_never_listed() {
        let model = receptor(&[[1.0, 1.0, 1.0], [40.0, 40.0, 40.0]]);
        let dims = neighbor_dims(&[GridDim::new(0.0, 9.0, 24); 3]);
        let index = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::XScore);
        let found = index.possibilities(&Point3::new(9.0, 9.0, 9.0));
        assert!(!found.contains(&1));
    }

    #[test]
    fn out_of_scheme_atoms_are_not_indexed() {
        let mut model = receptor(&[[1.0, 1.0, 1.0]]);
        model.add_grid_atom(Atom::new("H", AdType::HD, None, Point3::new(1.2, 1.0, 1.0)));
        let dims = neighbor_dims(&[GridDim::new(0.0, 6.0, 16); 3]);

        let xs = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::XScore);
        assert_eq!(xs.possibilities(&Point3::new(1.0, 1.0, 1.0)), &[0]);

        let ad = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::AutoDock);
        assert_eq!(ad.possibilities(&Point3::new(1.0, 1.0, 1.0)), &[0, 1]);
    }

    #[test]
    fn queries_outside_the_box_use_the_nearest_cell() {
        let model = receptor(&[[0.5, 0.5, 0.5]]);
        let dims = neighbor_dims(&[GridDim::new(0.0, 9.0, 24); 3]);
        let index = NeighborGrid::new(&model, &dims, 4.0, AtomTyping::XScore);
        assert_eq!(index.possibilities(&Point3::new(-50.0, -1.0, 0.2)), &[0]);
        assert!(index.possibilities(&Point3::new(100.0, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn empty_receptor_yields_no_candidates() {
        let model = Model::new();
        let dims = neighbor_dims(&[GridDim::new(0.0, 9.0, 24); 3]);
        let index = NeighborGrid::new(&model, &dims, 16.0, AtomTyping::XScore);
        assert!(index.possibilities(&Point3::new(4.0, 4.0, 4.0)).is_empty());
    }
}
