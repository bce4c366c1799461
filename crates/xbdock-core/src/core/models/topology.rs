use std::fmt;

/// Locates an atom inside a [`Model`](super::model::Model): either a ligand
/// atom or a receptor (grid) atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomIndex {
    pub index: usize,
    pub in_grid: bool,
}

impl AtomIndex {
    pub fn ligand(index: usize) -> Self {
        Self {
            index,
            in_grid: false,
        }
    }

    pub fn grid(index: usize) -> Self {
        Self {
            index,
            in_grid: true,
        }
    }
}

impl fmt::Display for AtomIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_grid {
            write!(f, "receptor atom #{}", self.index)
        } else {
            write!(f, "ligand atom #{}", self.index)
        }
    }
}

/// One end of a covalent bond, stored on the atom that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub connected: AtomIndex, // The atom on the other end
}

impl Bond {
    pub fn new(connected: AtomIndex) -> Self {
        Self { connected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_grid_flag() {
        assert!(!AtomIndex::ligand(3).in_grid);
        assert!(AtomIndex::grid(3).in_grid);
        assert_ne!(AtomIndex::ligand(3), AtomIndex::grid(3));
    }

    #[test]
    fn display_names_the_side() {
        assert_eq!(AtomIndex::ligand(2).to_string(), "ligand atom #2");
        assert_eq!(AtomIndex::grid(7).to_string(), "receptor atom #7");
    }

    #[test]
    fn bond_new_stores_connected_atom() {
        let bond = Bond::new(AtomIndex::grid(4));
        assert_eq!(bond.connected, AtomIndex::grid(4));
    }
}
