//! # Core Models Module
//!
//! Data structures describing what gets scored: atoms with their typing
//! information, bonds, and the ligand/receptor model.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms, the element / AutoDock / X-Score type codes, and the
//!   [`AtomTyping`](atom::AtomTyping) scheme selector
//! - [`topology`] - Atom indices and bonds
//! - [`model`] - Movable ligand atoms, their current pose and force slots,
//!   and the fixed receptor atoms
//!
//! ## Usage
//!
//! ```ignore
//! use xbdock::core::models::{atom::*, model::Model};
//!
//! let mut model = Model::new();
//! let cl = model.add_movable_atom(Atom::new("CL", AdType::Cl, Some(XsType::ClH), pos_cl));
//! let c = model.add_movable_atom(Atom::new("C1", AdType::A, Some(XsType::CH), pos_c));
//! model.add_bond(cl, c)?;
//! ```

pub mod atom;
pub mod model;
pub mod topology;
