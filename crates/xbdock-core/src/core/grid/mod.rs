//! # Lattice Module
//!
//! Regular 3D lattices over the docking box and the per-atom-type potential
//! grids stored on them.
//!
//! ## Key Components
//!
//! - [`dims`] - Per-axis extent and resolution ([`GridDims`](dims::GridDims)),
//!   lattice point lookup, and the coarse dimensions used for neighbor search
//! - [`array`] - A dense x-major 3D array with contiguous x-slabs
//! - [`grid`] - [`Grid`](grid::Grid), trilinear interpolation with
//!   slope-bounded extrapolation outside the box

pub mod array;
pub mod dims;
#[allow(clippy::module_inception)]
pub mod grid;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid axis {axis} has no intervals or a non-positive span")]
    EmptyAxis { axis: usize },
    #[error("Expected {expected} lattice values, found {found}")]
    ValueCountMismatch { expected: usize, found: usize },
}
