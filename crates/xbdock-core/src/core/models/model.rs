use super::atom::Atom;
use super::topology::{AtomIndex, Bond};
use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Atom not found in the model: {0}")]
    AtomNotFound(AtomIndex),
    #[error("Cannot bond {0} to itself")]
    SelfBond(AtomIndex),
}

/// A ligand posed against a rigid receptor.
///
/// Ligand atoms are all movable: their current pose lives in a coordinate
/// array parallel to the atom list, and every evaluation that produces
/// derivatives writes one minus-force vector per ligand atom. Receptor atoms
/// are fixed and use their stored positions.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Movable ligand atoms.
    atoms: Vec<Atom>,
    /// Current pose, one entry per ligand atom.
    coords: Vec<Point3<f64>>,
    /// Energy gradient per ligand atom, written by derivative evaluations.
    minus_forces: Vec<Vector3<f64>>,
    /// Fixed receptor atoms.
    grid_atoms: Vec<Atom>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a movable ligand atom, posed at its reference position.
    ///
    /// # Return
    ///
    /// The index of the new atom.
    pub fn add_movable_atom(&mut self, atom: Atom) -> AtomIndex {
        self.coords.push(atom.position);
        self.minus_forces.push(Vector3::zeros());
        self.atoms.push(atom);
        AtomIndex::ligand(self.atoms.len() - 1)
    }

    /// Adds a fixed receptor atom.
    ///
    /// # Return
    ///
    /// The index of the new atom.
    pub fn add_grid_atom(&mut self, atom: Atom) -> AtomIndex {
        self.grid_atoms.push(atom);
        AtomIndex::grid(self.grid_atoms.len() - 1)
    }

    /// Records a bond on both atoms.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AtomNotFound`] if either index is unknown, or
    /// [`ModelError::SelfBond`] if both indices name the same atom.
    pub fn add_bond(&mut self, a: AtomIndex, b: AtomIndex) -> Result<(), ModelError> {
        if a == b {
            return Err(ModelError::SelfBond(a));
        }
        self.get_atom(a).ok_or(ModelError::AtomNotFound(a))?;
        self.get_atom(b).ok_or(ModelError::AtomNotFound(b))?;

        self.atom_mut(a).bonds.push(Bond::new(b));
        self.atom_mut(b).bonds.push(Bond::new(a));
        Ok(())
    }

    fn atom_mut(&mut self, index: AtomIndex) -> &mut Atom {
        if index.in_grid {
            &mut self.grid_atoms[index.index]
        } else {
            &mut self.atoms[index.index]
        }
    }

    pub fn get_atom(&self, index: AtomIndex) -> Option<&Atom> {
        if index.in_grid {
            self.grid_atoms.get(index.index)
        } else {
            self.atoms.get(index.index)
        }
    }

    /// Current position of an atom: the pose for ligand atoms, the stored
    /// position for receptor atoms.
    pub fn position_of(&self, index: AtomIndex) -> Option<Point3<f64>> {
        if index.in_grid {
            self.grid_atoms.get(index.index).map(|a| a.position)
        } else {
            self.coords.get(index.index).copied()
        }
    }

    #[inline]
    pub fn num_movable_atoms(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn movable_atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn grid_atoms(&self) -> &[Atom] {
        &self.grid_atoms
    }

    #[inline]
    pub fn coords(&self) -> &[Point3<f64>] {
        &self.coords
    }

    #[inline]
    pub fn coords_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.coords
    }

    #[inline]
    pub fn minus_forces(&self) -> &[Vector3<f64>] {
        &self.minus_forces
    }

    /// Borrows the ligand atoms and pose immutably together with the force
    /// slots mutably, for derivative evaluations.
    #[inline]
    pub fn split_for_forces(&mut self) -> (&[Atom], &[Point3<f64>], &mut [Vector3<f64>]) {
        (&self.atoms, &self.coords, &mut self.minus_forces)
    }

    /// Runs `f` with the whole model borrowed immutably and its force slots
    /// mutably, reusing the existing force buffer.
    ///
    /// Within `f`, [`minus_forces`](Self::minus_forces) on the model
    /// argument is empty; the slots are only reachable through the slice.
    pub fn with_forces<R>(&mut self, f: impl FnOnce(&Model, &mut [Vector3<f64>]) -> R) -> R {
        let mut forces = std::mem::take(&mut self.minus_forces);
        let result = f(self, &mut forces);
        self.minus_forces = forces;
        result
    }
}
