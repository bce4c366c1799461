//! # Engine Module
//!
//! The evaluators an optimizer calls once per candidate pose, and the
//! configuration and error types around them.
//!
//! ## Overview
//!
//! Two strategies compute the same ligand-receptor interaction energy:
//!
//! - [`cache::GridCache`] precomputes, per ligand atom type, the summed
//!   receptor potential on a lattice covering the docking box, then scores a
//!   pose by interpolating one grid value per atom.
//! - [`direct::DirectEvaluator`] sums pair terms over nearby receptor atoms
//!   on every call, with nothing precomputed beyond a neighbor grid.
//!
//! Both implement [`evaluator::Evaluator`] and both take directional angles
//! from the single [`corrector::GeometryCorrector`], so a pose scores the
//! same up to interpolation error whichever path is used.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Search box, slope, typing scheme and
//!   version tag, loadable from TOML
//! - **Error Handling** ([`error`]) - Cache construction, population and
//!   persistence failures
//! - **Directional Geometry** ([`corrector`]) - Halogen-bond and
//!   sulfur-aromatic angles from bonded neighbors
//! - **Evaluators** ([`cache`], [`direct`]) behind the [`evaluator`] trait
//! - **Progress Reporting** ([`progress`]) - Optional callbacks during grid
//!   population
//!
//! ## Concurrency
//!
//! Evaluation borrows the cache immutably and may run from many threads.
//! Population needs `&mut GridCache`, so it cannot overlap evaluation; with
//! the `parallel` feature its lattice sweep is split across x-slabs.

pub mod cache;
pub mod config;
pub mod corrector;
pub mod direct;
pub mod error;
pub mod evaluator;
pub mod progress;
#[cfg(test)]
pub(crate) mod testing;
