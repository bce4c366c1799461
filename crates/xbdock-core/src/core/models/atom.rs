use super::topology::Bond;
use nalgebra::Point3;
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical element classes distinguished by the scoring function.
///
/// Metals are lumped into a single class since the potentials never tell
/// them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H,
    C,
    N,
    O,
    S,
    P,
    F,
    Cl,
    Br,
    I,
    Met,
}

impl Element {
    pub const COUNT: usize = 11;
}

/// AutoDock atom types, as found in the type column of PDBQT records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AdType {
    C,
    /// Aromatic carbon.
    A,
    N,
    O,
    P,
    S,
    H,
    F,
    I,
    /// Hydrogen-bond accepting nitrogen.
    NA,
    /// Hydrogen-bond accepting oxygen.
    OA,
    /// Hydrogen-bond accepting sulfur.
    SA,
    /// Polar (donor) hydrogen.
    HD,
    Mg,
    Mn,
    Zn,
    Ca,
    Fe,
    Cl,
    Br,
}

static AD_TYPE_NAMES: Map<&'static str, AdType> = phf_map! {
    "C" => AdType::C,
    "A" => AdType::A,
    "N" => AdType::N,
    "O" => AdType::O,
    "P" => AdType::P,
    "S" => AdType::S,
    "H" => AdType::H,
    "F" => AdType::F,
    "I" => AdType::I,
    "NA" => AdType::NA,
    "OA" => AdType::OA,
    "SA" => AdType::SA,
    "HD" => AdType::HD,
    "Mg" => AdType::Mg,
    "Mn" => AdType::Mn,
    "Zn" => AdType::Zn,
    "Ca" => AdType::Ca,
    "Fe" => AdType::Fe,
    "Cl" => AdType::Cl,
    "Br" => AdType::Br,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown AutoDock atom type '{0}'")]
pub struct ParseAdTypeError(pub String);

impl AdType {
    pub const COUNT: usize = 20;

    /// The element an AutoDock type belongs to.
    pub fn element(self) -> Element {
        match self {
            AdType::C | AdType::A => Element::C,
            AdType::N | AdType::NA => Element::N,
            AdType::O | AdType::OA => Element::O,
            AdType::S | AdType::SA => Element::S,
            AdType::H | AdType::HD => Element::H,
            AdType::P => Element::P,
            AdType::F => Element::F,
            AdType::I => Element::I,
            AdType::Cl => Element::Cl,
            AdType::Br => Element::Br,
            AdType::Mg | AdType::Mn | AdType::Zn | AdType::Ca | AdType::Fe => Element::Met,
        }
    }
}

impl FromStr for AdType {
    type Err = ParseAdTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AD_TYPE_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseAdTypeError(s.to_string()))
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// X-Score atom types: element plus hydrophobic/polar and donor/acceptor
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum XsType {
    /// Hydrophobic carbon.
    CH,
    /// Polar carbon (bonded to a heteroatom).
    CP,
    NP,
    ND,
    NA,
    NDA,
    OP,
    OD,
    OA,
    ODA,
    SP,
    PP,
    FH,
    ClH,
    BrH,
    IH,
    MetD,
}

impl XsType {
    pub const COUNT: usize = 17;

    #[inline]
    pub fn is_halogen(self) -> bool {
        matches!(self, XsType::FH | XsType::ClH | XsType::BrH | XsType::IH)
    }

    #[inline]
    pub fn is_sulfur(self) -> bool {
        self == XsType::SP
    }
}

/// Selects which of an atom's type codes indexes grids and potential tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtomTyping {
    Element,
    #[serde(rename = "autodock")]
    AutoDock,
    #[default]
    XScore,
}

impl AtomTyping {
    /// Number of type ids in this scheme; valid ids are `0..num_atom_types()`.
    pub fn num_atom_types(self) -> usize {
        match self {
            AtomTyping::Element => Element::COUNT,
            AtomTyping::AutoDock => AdType::COUNT,
            AtomTyping::XScore => XsType::COUNT,
        }
    }
}

impl fmt::Display for AtomTyping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomTyping::Element => "element",
            AtomTyping::AutoDock => "autodock",
            AtomTyping::XScore => "x-score",
        };
        write!(f, "{}", name)
    }
}

/// An atom of either the ligand or the receptor.
///
/// The element and X-Score type are derived from the AutoDock type by the
/// caller's typing step; this struct only stores them. For ligand atoms the
/// `position` is the reference position and the model's coordinate array
/// holds the pose being scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "C1", "CL").
    pub name: String,
    /// Reference coordinates in Angstroms.
    pub position: Point3<f64>,
    pub element: Element,
    pub ad: AdType,
    /// X-Score type; `None` for hydrogens and anything X-Score does not type.
    pub xs: Option<XsType>,
    /// Bonds owned by this atom, each naming the connected atom.
    pub bonds: Vec<Bond>,
}

impl Atom {
    /// Creates an atom with no bonds.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `ad` - The AutoDock type; the element is derived from it.
    /// * `xs` - The X-Score type, if the atom has one.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, ad: AdType, xs: Option<XsType>, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            position,
            element: ad.element(),
            ad,
            xs,
            bonds: Vec::new(),
        }
    }

    /// The type id of this atom under `typing`, or `None` when the scheme has
    /// no type for it.
    #[inline]
    pub fn type_id(&self, typing: AtomTyping) -> Option<usize> {
        match typing {
            AtomTyping::Element => Some(self.element as usize),
            AtomTyping::AutoDock => Some(self.ad as usize),
            AtomTyping::XScore => self.xs.map(|xs| xs as usize),
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }

    #[inline]
    pub fn is_halogen(&self) -> bool {
        self.xs.is_some_and(XsType::is_halogen)
    }

    #[inline]
    pub fn is_sulfur(&self) -> bool {
        self.xs.is_some_and(XsType::is_sulfur)
    }

    #[inline]
    pub fn is_aromatic_carbon(&self) -> bool {
        self.ad == AdType::A
    }
}
