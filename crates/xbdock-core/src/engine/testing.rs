use crate::core::forcefield::precalculate::Precalculate;
use crate::core::models::atom::AtomTyping;

/// An analytic stand-in potential:
/// `e = offset + pair_weight * tpi + k * r2 + angle_weight * (180 - theta)`.
///
/// Its radial derivative over distance is `2k` everywhere, so forces can be
/// checked exactly.
#[derive(Debug, Clone)]
pub(crate) struct LinearTable {
    pub typing: AtomTyping,
    pub cutoff: f64,
    pub offset: f64,
    pub pair_weight: f64,
    pub k: f64,
    pub angle_weight: f64,
}

impl LinearTable {
    pub fn constant(value: f64, cutoff: f64) -> Self {
        Self {
            typing: AtomTyping::XScore,
            cutoff,
            offset: value,
            pair_weight: 0.0,
            k: 0.0,
            angle_weight: 0.0,
        }
    }

    pub fn radial(offset: f64, k: f64, cutoff: f64) -> Self {
        Self {
            k,
            ..Self::constant(offset, cutoff)
        }
    }

    pub fn energy(&self, type_pair_index: usize, r2: f64, theta: f64) -> f64 {
        self.offset
            + self.pair_weight * type_pair_index as f64
            + self.k * r2
            + self.angle_weight * (180.0 - theta)
    }
}

impl Precalculate for LinearTable {
    fn atom_typing(&self) -> AtomTyping {
        self.typing
    }

    fn cutoff_sqr(&self) -> f64 {
        self.cutoff * self.cutoff
    }

    fn eval_fast(&self, type_pair_index: usize, r2: f64, theta: f64) -> f64 {
        self.energy(type_pair_index, r2, theta)
    }

    fn eval_deriv(&self, type_pair_index: usize, r2: f64, theta: f64) -> (f64, f64) {
        (self.energy(type_pair_index, r2, theta), 2.0 * self.k)
    }
}
