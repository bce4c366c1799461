use crate::core::models::atom::{Atom, Element};
use crate::core::models::model::Model;
use crate::core::utils::geometry::angle_degrees;
use nalgebra::Point3;

/// Angle reported when no directional relation applies.
pub const DEFAULT_THETA: f64 = 180.0;

/// Angle reported for a sulfur that does not have exactly two bonds.
pub const EXCLUDED_SULFUR_THETA: f64 = 0.0;

/// The ligand-side partner of a directional pair.
#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    /// A bare point, such as a lattice point during grid population.
    Point(Point3<f64>),
    /// A ligand atom at its current pose.
    Atom {
        atom: &'a Atom,
        position: Point3<f64>,
    },
}

impl Probe<'_> {
    #[inline]
    pub fn position(&self) -> Point3<f64> {
        match self {
            Probe::Point(p) => *p,
            Probe::Atom { position, .. } => *position,
        }
    }

    #[inline]
    fn atom(&self) -> Option<&Atom> {
        match self {
            Probe::Point(_) => None,
            Probe::Atom { atom, .. } => Some(atom),
        }
    }
}

/// Computes the directional angle `theta` for halogen-bond and
/// sulfur-aromatic pairs from the bonded neighbors of the participating
/// atom.
///
/// Relations are tried in a fixed order and the first that yields an angle
/// wins:
///
/// 1. ligand atom is a halogen bonded to a carbon
/// 2. receptor atom is a halogen bonded to a carbon
/// 3. ligand atom is a sulfur
/// 4. receptor atom is a sulfur
///
/// Otherwise the result is [`DEFAULT_THETA`]. A halogen angle is measured at
/// the halogen between its carbon and the partner, so a linear
/// C-X...partner arrangement gives 180 degrees.
pub struct GeometryCorrector<'m> {
    model: &'m Model,
}

impl<'m> GeometryCorrector<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// Directional angle, in degrees, between `probe` and `receptor`.
    pub fn theta(&self, probe: &Probe<'_>, receptor: &Atom) -> f64 {
        let probe_position = probe.position();
        let ligand = probe.atom();

        if let Some(atom) = ligand.filter(|a| a.is_halogen()) {
            if let Some(theta) = self.halogen_angle(atom, probe_position, receptor.position) {
                return theta;
            }
        }
        if receptor.is_halogen() {
            if let Some(theta) = self.halogen_angle(receptor, receptor.position, probe_position) {
                return theta;
            }
        }
        if let Some(atom) = ligand.filter(|a| a.is_sulfur()) {
            return self.sulfur_angle(atom, probe_position, receptor.position);
        }
        if receptor.is_sulfur() {
            return self.sulfur_angle(receptor, receptor.position, probe_position);
        }
        DEFAULT_THETA
    }

    /// Angle at the halogen using its first bonded carbon; `None` if it has
    /// no carbon neighbor.
    fn halogen_angle(
        &self,
        halogen: &Atom,
        halogen_position: Point3<f64>,
        partner: Point3<f64>,
    ) -> Option<f64> {
        halogen.bonds.iter().find_map(|bond| {
            let neighbor = self.model.get_atom(bond.connected)?;
            if neighbor.element != Element::C {
                return None;
            }
            let carbon = self.model.position_of(bond.connected)?;
            Some(angle_degrees(
                &(halogen_position - carbon),
                &(halogen_position - partner),
            ))
        })
    }

    /// Larger of the per-bond angles of a divalent sulfur. Bonds to
    /// non-aromatic atoms contribute 0.
    fn sulfur_angle(&self, sulfur: &Atom, sulfur_position: Point3<f64>, partner: Point3<f64>) -> f64 {
        if sulfur.bonds.len() != 2 {
            return EXCLUDED_SULFUR_THETA;
        }
        sulfur
            .bonds
            .iter()
            .map(|bond| {
                let aromatic = self
                    .model
                    .get_atom(bond.connected)
                    .is_some_and(Atom::is_aromatic_carbon);
                match self.model.position_of(bond.connected) {
                    Some(neighbor) if aromatic => angle_degrees(
                        &(sulfur_position - neighbor),
                        &(sulfur_position - partner),
                    ),
                    _ => 0.0,
                }
            })
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AdType, XsType};
    use crate::core::models::topology::AtomIndex;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn at(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn oxygen(p: Point3<f64>) -> Atom {
        Atom::new("O", AdType::OA, Some(XsType::OA), p)
    }

    fn probe_atom(model: &Model, index: AtomIndex) -> Probe<'_> {
        Probe::Atom {
            atom: model.get_atom(index).unwrap(),
            position: model.position_of(index).unwrap(),
        }
    }

    #[test]
    fn non_directional_pair_gets_default() {
        let mut model = Model::new();
        let c = model.add_movable_atom(Atom::new("C", AdType::C, Some(XsType::CH), at(0.0, 0.0, 0.0)));
        let o = model.add_grid_atom(oxygen(at(3.0, 0.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        let receptor = model.get_atom(o).unwrap();
        assert_eq!(corrector.theta(&probe_atom(&model, c), receptor), DEFAULT_THETA);
        assert_eq!(
            corrector.theta(&Probe::Point(at(1.0, 1.0, 1.0)), receptor),
            DEFAULT_THETA
        );
    }

    #[test]
    fn ligand_halogen_uses_its_carbon_at_current_pose() {
        let mut model = Model::new();
        let cl = model.add_movable_atom(Atom::new("CL", AdType::Cl, Some(XsType::ClH), at(0.0, 0.0, 0.0)));
        let c = model.add_movable_atom(Atom::new("C1", AdType::A, Some(XsType::CH), at(9.0, 9.0, 9.0)));
        model.add_bond(cl, c).unwrap();
        // Pose the carbon opposite the acceptor: linear C-Cl...O.
        model.coords_mut()[1] = at(-1.8, 0.0, 0.0);
        let o = model.add_grid_atom(oxygen(at(3.2, 0.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        let theta = corrector.theta(&probe_atom(&model, cl), model.get_atom(o).unwrap());
        assert!(f64_approx_equal(theta, 180.0));

        model.coords_mut()[1] = at(0.0, -1.8, 0.0);
        let corrector = GeometryCorrector::new(&model);
        let theta = corrector.theta(&probe_atom(&model, cl), model.get_atom(o).unwrap());
        assert!(f64_approx_equal(theta, 90.0));
    }

    #[test]
    fn receptor_halogen_propagates_its_angle() {
        let mut model = Model::new();
        let br = model.add_grid_atom(Atom::new("BR", AdType::Br, Some(XsType::BrH), at(0.0, 0.0, 0.0)));
        let c = model.add_grid_atom(Atom::new("C", AdType::C, Some(XsType::CH), at(0.0, 1.9, 0.0)));
        model.add_bond(br, c).unwrap();
        let o = model.add_movable_atom(oxygen(at(3.0, 0.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        let receptor = model.get_atom(br).unwrap();
        let theta = corrector.theta(&probe_atom(&model, o), receptor);
        assert!(f64_approx_equal(theta, 90.0));

        let theta = corrector.theta(&Probe::Point(at(0.0, -3.0, 0.0)), receptor);
        assert!(f64_approx_equal(theta, 180.0));
    }

    #[test]
    fn halogen_without_carbon_falls_back_to_default() {
        let mut model = Model::new();
        let f = model.add_movable_atom(Atom::new("F", AdType::F, Some(XsType::FH), at(0.0, 0.0, 0.0)));
        let n = model.add_movable_atom(Atom::new("N", AdType::N, Some(XsType::NP), at(1.4, 0.0, 0.0)));
        model.add_bond(f, n).unwrap();
        let o = model.add_grid_atom(oxygen(at(0.0, 3.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        assert_eq!(
            corrector.theta(&probe_atom(&model, f), model.get_atom(o).unwrap()),
            DEFAULT_THETA
        );
    }

    #[test]
    fn sulfur_uses_only_aromatic_neighbor() {
        let mut model = Model::new();
        let s = model.add_grid_atom(Atom::new("S", AdType::SA, Some(XsType::SP), at(0.0, 0.0, 0.0)));
        let aromatic = model.add_grid_atom(Atom::new("CA", AdType::A, Some(XsType::CH), at(1.8, 0.0, 0.0)));
        let aliphatic = model.add_grid_atom(Atom::new("CB", AdType::C, Some(XsType::CH), at(-1.0, -1.5, 0.0)));
        model.add_bond(s, aromatic).unwrap();
        model.add_bond(s, aliphatic).unwrap();

        let corrector = GeometryCorrector::new(&model);
        let receptor = model.get_atom(s).unwrap();
        // Partner perpendicular to the S-CA bond.
        let theta = corrector.theta(&Probe::Point(at(0.0, 3.0, 0.0)), receptor);
        assert!(f64_approx_equal(theta, 90.0));

        // Partner opposite CA.
        let theta = corrector.theta(&Probe::Point(at(-3.0, 0.0, 0.0)), receptor);
        assert!(f64_approx_equal(theta, 180.0));
    }

    #[test]
    fn sulfur_takes_larger_of_two_aromatic_angles() {
        let mut model = Model::new();
        let s = model.add_movable_atom(Atom::new("S", AdType::S, Some(XsType::SP), at(0.0, 0.0, 0.0)));
        let c1 = model.add_movable_atom(Atom::new("C1", AdType::A, Some(XsType::CH), at(1.8, 0.0, 0.0)));
        let c2 = model.add_movable_atom(Atom::new("C2", AdType::A, Some(XsType::CH), at(0.0, 1.8, 0.0)));
        model.add_bond(s, c1).unwrap();
        model.add_bond(s, c2).unwrap();
        let o = model.add_grid_atom(oxygen(at(-3.0, 0.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        let theta = corrector.theta(&probe_atom(&model, s), model.get_atom(o).unwrap());
        assert!(f64_approx_equal(theta, 180.0));
    }

    #[test]
    fn sulfur_without_two_bonds_is_excluded() {
        let mut model = Model::new();
        let s = model.add_movable_atom(Atom::new("S", AdType::S, Some(XsType::SP), at(0.0, 0.0, 0.0)));
        let c = model.add_movable_atom(Atom::new("C", AdType::A, Some(XsType::CH), at(1.8, 0.0, 0.0)));
        model.add_bond(s, c).unwrap();
        let o = model.add_grid_atom(oxygen(at(-3.0, 0.0, 0.0)));

        let corrector = GeometryCorrector::new(&model);
        assert_eq!(
            corrector.theta(&probe_atom(&model, s), model.get_atom(o).unwrap()),
            0.0
        );
    }

    #[test]
    fn halogen_takes_precedence_over_sulfur() {
        let mut model = Model::new();
        let i = model.add_movable_atom(Atom::new("I", AdType::I, Some(XsType::IH), at(0.0, 0.0, 0.0)));
        let c = model.add_movable_atom(Atom::new("C", AdType::C, Some(XsType::CH), at(-2.1, 0.0, 0.0)));
        model.add_bond(i, c).unwrap();
        // A receptor sulfur with one bond would give 0 on its own.
        let s = model.add_grid_atom(Atom::new("S", AdType::SA, Some(XsType::SP), at(3.5, 0.0, 0.0)));
        let cs = model.add_grid_atom(Atom::new("C", AdType::C, Some(XsType::CH), at(5.3, 0.0, 0.0)));
        model.add_bond(s, cs).unwrap();

        let corrector = GeometryCorrector::new(&model);
        let theta = corrector.theta(&probe_atom(&model, i), model.get_atom(s).unwrap());
        assert!(f64_approx_equal(theta, 180.0));
    }
}
