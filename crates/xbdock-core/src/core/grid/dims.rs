use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Preferred edge length of a neighbor-search cell, in Angstroms.
const NEIGHBOR_CELL_SIZE: f64 = 3.0;

/// Extent and resolution of a lattice along one axis.
///
/// `n` counts intervals, so the axis carries `n + 1` lattice points from
/// `begin` to `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDim {
    pub begin: f64,
    pub end: f64,
    pub n: usize,
}

impl GridDim {
    pub fn new(begin: f64, end: f64, n: usize) -> Self {
        Self { begin, end, n }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.begin
    }

    /// Whether this axis is resolved at all; unresolved axes are ignored by
    /// box clamping and containment checks.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.n > 0
    }

    /// Equality up to floating-point noise in the bounds.
    pub fn approx_eq(&self, other: &GridDim) -> bool {
        self.n == other.n
            && (self.begin - other.begin).abs() < f64::EPSILON
            && (self.end - other.end).abs() < f64::EPSILON
    }
}

pub type GridDims = [GridDim; 3];

pub fn dims_approx_eq(a: &GridDims, b: &GridDims) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.approx_eq(y))
}

/// Coordinates of lattice point `(x, y, z)`.
#[inline]
pub fn lattice_point(dims: &GridDims, x: usize, y: usize, z: usize) -> Point3<f64> {
    let index = [x, y, z];
    let coords: [f64; 3] = std::array::from_fn(|i| {
        let d = &dims[i];
        d.begin + d.span() * index[i] as f64 / d.n as f64
    });
    Point3::from(coords)
}

/// Lower corner of the box.
pub fn dims_begin(dims: &GridDims) -> Point3<f64> {
    Point3::new(dims[0].begin, dims[1].begin, dims[2].begin)
}

/// Upper corner of the box.
pub fn dims_end(dims: &GridDims) -> Point3<f64> {
    Point3::new(dims[0].end, dims[1].end, dims[2].end)
}

/// Same box, divided into cells of roughly 3 Å (at least one per axis) for
/// neighbor searches.
pub fn neighbor_dims(dims: &GridDims) -> GridDims {
    dims.map(|d| {
        let n = (d.span() / NEIGHBOR_CELL_SIZE) as usize;
        GridDim::new(d.begin, d.end, n.max(1))
    })
}
