use super::potentials::{num_type_pairs, type_pair_index};
use crate::core::models::atom::AtomTyping;
use tracing::debug;

/// Samples per Å² of squared distance used when none is specified.
pub const DEFAULT_FACTOR: f64 = 32.0;

/// A pairwise potential ready for evaluation inside the scoring loop.
///
/// Implementations are indexed by [`type_pair_index`] over the type ids of
/// [`atom_typing`](Precalculate::atom_typing), and receive the squared
/// distance plus the directional angle `theta` (degrees; 180 means no
/// directional correction applies).
pub trait Precalculate: Sync {
    /// Typing scheme whose type ids the pair indices are built from.
    fn atom_typing(&self) -> AtomTyping;

    /// Squared cutoff beyond which every pair contributes zero.
    fn cutoff_sqr(&self) -> f64;

    /// Energy of a pair at squared distance `r2`.
    fn eval_fast(&self, type_pair_index: usize, r2: f64, theta: f64) -> f64;

    /// Energy and its radial derivative divided by the distance,
    /// `(e, (de/dr) / r)`. Multiplying the second element by the pair
    /// displacement vector gives the Cartesian gradient.
    fn eval_deriv(&self, type_pair_index: usize, r2: f64, theta: f64) -> (f64, f64);
}

/// An analytic pair potential to be tabulated by [`PrecalculatedTable`].
pub trait PairTerm: Sync {
    /// Interaction cutoff in Angstroms.
    fn cutoff(&self) -> f64;

    /// Distance-dependent energy of types `t1` and `t2` at distance `r`.
    fn radial(&self, t1: usize, t2: usize, r: f64) -> f64;

    /// Multiplier applied for directional pairs at angle `theta` (degrees).
    fn angular_factor(&self, _t1: usize, _t2: usize, _theta: f64) -> f64 {
        1.0
    }
}

#[derive(Debug, Clone)]
struct PairSamples {
    t1: usize,
    t2: usize,
    /// Piecewise-constant values, one per squared-distance bin.
    fast: Vec<f64>,
    /// Energy and `(de/dr) / r` at each knot.
    smooth: Vec<(f64, f64)>,
}

impl PairSamples {
    fn new(t1: usize, t2: usize, energies: Vec<f64>, rs: &[f64]) -> Self {
        let n = energies.len();
        let mut smooth = Vec::with_capacity(n);
        let mut fast = Vec::with_capacity(n);
        for i in 0..n {
            let dor = if i == 0 || i == n - 1 {
                0.0
            } else {
                (energies[i + 1] - energies[i - 1]) / ((rs[i + 1] - rs[i - 1]) * rs[i])
            };
            smooth.push((energies[i], dor));

            let next = energies.get(i + 1).copied().unwrap_or(0.0);
            fast.push((energies[i] + next) / 2.0);
        }
        Self {
            t1,
            t2,
            fast,
            smooth,
        }
    }
}

/// A [`PairTerm`] sampled on a uniform squared-distance lattice.
///
/// Energies are tabulated at `r = sqrt(i / factor)` for every unordered type
/// pair; [`eval_fast`](Precalculate::eval_fast) reads the bin midpoint and
/// [`eval_deriv`](Precalculate::eval_deriv) interpolates linearly between
/// knots. The angular multiplier is applied at evaluation time.
#[derive(Debug, Clone)]
pub struct PrecalculatedTable<T> {
    term: T,
    typing: AtomTyping,
    cutoff_sqr: f64,
    factor: f64,
    pairs: Vec<PairSamples>,
}

impl<T: PairTerm> PrecalculatedTable<T> {
    /// Tabulates `term` with [`DEFAULT_FACTOR`] samples per Å².
    pub fn new(term: T, typing: AtomTyping) -> Self {
        Self::with_factor(term, typing, DEFAULT_FACTOR)
    }

    /// Tabulates `term` with `factor` samples per Å².
    ///
    /// # Panics
    ///
    /// Panics if `factor` or the term's cutoff is not positive.
    pub fn with_factor(term: T, typing: AtomTyping, factor: f64) -> Self {
        assert!(factor > 0.0, "Sampling factor must be positive");
        let cutoff = term.cutoff();
        assert!(cutoff > 0.0, "Cutoff must be positive");

        let cutoff_sqr = cutoff * cutoff;
        let n = (factor * cutoff_sqr) as usize + 3;
        let rs: Vec<f64> = (0..n).map(|i| (i as f64 / factor).sqrt()).collect();

        let num_types = typing.num_atom_types();
        let mut pairs = Vec::with_capacity(num_type_pairs(num_types));
        for t2 in 0..num_types {
            for t1 in 0..=t2 {
                debug_assert_eq!(pairs.len(), type_pair_index(t1, t2));
                let energies = rs.iter().map(|&r| term.radial(t1, t2, r)).collect();
                pairs.push(PairSamples::new(t1, t2, energies, &rs));
            }
        }

        debug!(
            typing = %typing,
            num_pairs = pairs.len(),
            samples_per_pair = n,
            "Tabulated pair potential."
        );

        Self {
            term,
            typing,
            cutoff_sqr,
            factor,
            pairs,
        }
    }

    pub fn term(&self) -> &T {
        &self.term
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    #[inline]
    fn angular(&self, pair: &PairSamples, theta: f64) -> f64 {
        self.term.angular_factor(pair.t1, pair.t2, theta)
    }
}

impl<T: PairTerm> Precalculate for PrecalculatedTable<T> {
    fn atom_typing(&self) -> AtomTyping {
        self.typing
    }

    fn cutoff_sqr(&self) -> f64 {
        self.cutoff_sqr
    }

    #[inline]
    fn eval_fast(&self, type_pair_index: usize, r2: f64, theta: f64) -> f64 {
        let pair = &self.pairs[type_pair_index];
        let i = ((self.factor * r2) as usize).min(pair.fast.len() - 1);
        pair.fast[i] * self.angular(pair, theta)
    }

    #[inline]
    fn eval_deriv(&self, type_pair_index: usize, r2: f64, theta: f64) -> (f64, f64) {
        let pair = &self.pairs[type_pair_index];
        let scaled = self.factor * r2;
        let i1 = (scaled as usize).min(pair.smooth.len() - 2);
        let rem = scaled - i1 as f64;

        let (e1, dor1) = pair.smooth[i1];
        let (e2, dor2) = pair.smooth[i1 + 1];
        let angular = self.angular(pair, theta);
        (
            (e1 + rem * (e2 - e1)) * angular,
            (dor1 + rem * (dor2 - dor1)) * angular,
        )
    }
}
