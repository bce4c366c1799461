//! # Core Module
//!
//! Stateless building blocks for ligand-receptor scoring.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, type codes, bonds, and
//!   the ligand/receptor model
//! - **Pair Potentials** ([`forcefield`]) - Type pair indexing, tabulated
//!   potentials, and the curl transform
//! - **Lattices** ([`grid`]) - Box dimensions and interpolating potential grids
//! - **Neighbor Search** ([`spatial`]) - Cell lists over receptor atoms
//! - **Geometry** ([`utils`]) - Angles and box distances
//!
//! Nothing in this layer holds evaluation state; the [`engine`](crate::engine)
//! layer composes these pieces into evaluators.

pub mod forcefield;
pub mod grid;
pub mod models;
pub mod spatial;
pub mod utils;
