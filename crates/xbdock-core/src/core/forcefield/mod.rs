//! # Force Field Module
//!
//! Pairwise potentials as the scoring engine consumes them: indexed by
//! unordered atom type pair, evaluated at a squared distance and a
//! directional angle.
//!
//! ## Overview
//!
//! The functional form of the potential is supplied by the caller. This
//! module only fixes how it is looked up and how its values are shaped
//! before they reach an evaluator:
//!
//! - **Type pair indexing** into a packed triangular table
//! - **Tabulation** of an analytic term on a squared-distance lattice, with
//!   central-difference derivatives for force evaluation
//! - **Curl**, the saturating transform that keeps extreme overlaps from
//!   producing unbounded energies
//!
//! ## Key Components
//!
//! - [`precalculate`] - The [`Precalculate`](precalculate::Precalculate)
//!   lookup trait and [`PrecalculatedTable`](precalculate::PrecalculatedTable)
//! - [`potentials`] - Type pair indexing and the curl transform
//!
//! ## Usage
//!
//! ```ignore
//! use xbdock::core::forcefield::precalculate::{PairTerm, PrecalculatedTable};
//!
//! let table = PrecalculatedTable::new(MyTerm::default(), AtomTyping::XScore);
//! let e = table.eval_fast(type_pair_index(t1, t2), r2, 180.0);
//! ```

pub mod potentials;
pub mod precalculate;
