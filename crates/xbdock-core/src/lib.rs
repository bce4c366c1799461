//! # XBDock Core Library
//!
//! Intermolecular energy evaluation for docking: scores a flexible ligand
//! against a rigid receptor, with a directional correction for halogen bonds
//! and sulfur-aromatic contacts.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Model`, `Atom`),
//!   pair potential lookup, interpolating lattices, and the receptor
//!   neighbor index.
//!
//! - **[`engine`]: The Evaluators.** Configuration, the geometry corrector
//!   that computes directional angles, and the two interchangeable energy
//!   evaluators: `GridCache`, which precomputes one potential grid per ligand
//!   atom type and interpolates, and `DirectEvaluator`, which sums pair terms
//!   over nearby receptor atoms on every call.
//!
//! Both evaluators implement [`engine::evaluator::Evaluator`], so an
//! optimizer can switch strategies without code changes.

pub mod core;
pub mod engine;
