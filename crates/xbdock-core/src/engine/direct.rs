use super::corrector::{GeometryCorrector, Probe};
use super::evaluator::Evaluator;
use crate::core::forcefield::potentials::{curl, curl_with_gradient, type_pair_index};
use crate::core::forcefield::precalculate::Precalculate;
use crate::core::grid::dims::{GridDims, neighbor_dims};
use crate::core::models::atom::Atom;
use crate::core::models::model::Model;
use crate::core::spatial::{NeighborGrid, SpatialIndex};
use nalgebra::{Point3, Vector3};
use tracing::{debug, instrument};

/// A ligand position pulled back into the box.
struct Clamped {
    position: Point3<f64>,
    /// Total distance moved, summed over axes.
    overshoot: f64,
    /// -1, 0 or 1 per axis: the side of the box the atom left through.
    side: Vector3<f64>,
}

/// Sums pair terms over nearby receptor atoms on every call.
///
/// Nothing is precomputed beyond the receptor neighbor grid, which makes
/// this the cheaper choice for one-off evaluations or ligand atom types
/// too rare to justify a full potential grid. Atoms outside the box are
/// scored at the nearest point of the box plus a penalty of `slope` per
/// Angstrom of overshoot.
pub struct DirectEvaluator<'p, P: Precalculate + ?Sized> {
    index: NeighborGrid,
    dims: GridDims,
    p: &'p P,
    slope: f64,
}

impl<'p, P: Precalculate + ?Sized> DirectEvaluator<'p, P> {
    #[instrument(skip_all, name = "direct_evaluator_new")]
    pub fn new(model: &Model, dims: GridDims, p: &'p P, slope: f64) -> Self {
        let index = NeighborGrid::new(model, &neighbor_dims(&dims), p.cutoff_sqr(), p.atom_typing());
        debug!(
            receptor_atoms = model.grid_atoms().len(),
            typing = %p.atom_typing(),
            "Direct evaluator ready."
        );
        Self {
            index,
            dims,
            p,
            slope,
        }
    }

    pub fn dims(&self) -> &GridDims {
        &self.dims
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Whether every heavy ligand atom lies inside the box grown by
    /// `margin` on each resolved axis.
    pub fn within(&self, model: &Model, margin: f64) -> bool {
        model
            .movable_atoms()
            .iter()
            .zip(model.coords())
            .filter(|(atom, _)| !atom.is_hydrogen())
            .all(|(_, c)| {
                self.dims.iter().enumerate().all(|(i, d)| {
                    !d.enabled() || (c[i] >= d.begin - margin && c[i] <= d.end + margin)
                })
            })
    }

    fn clamp(&self, coords: &Point3<f64>) -> Clamped {
        let mut clamped = Clamped {
            position: *coords,
            overshoot: 0.0,
            side: Vector3::zeros(),
        };
        for (i, d) in self.dims.iter().enumerate() {
            if !d.enabled() {
                continue;
            }
            if coords[i] < d.begin {
                clamped.position[i] = d.begin;
                clamped.overshoot += d.begin - coords[i];
                clamped.side[i] = -1.0;
            } else if coords[i] > d.end {
                clamped.position[i] = d.end;
                clamped.overshoot += coords[i] - d.end;
                clamped.side[i] = 1.0;
            }
        }
        clamped
    }

    /// Receptor atoms within the cutoff of `position`, with their type pair
    /// index, displacement from the receptor atom and directional angle.
    fn pairs<'a>(
        &'a self,
        model: &'a Model,
        corrector: &'a GeometryCorrector<'a>,
        ligand: &'a Atom,
        pose: Point3<f64>,
        position: Point3<f64>,
    ) -> impl Iterator<Item = (usize, Vector3<f64>, f64)> + 'a {
        let typing = self.p.atom_typing();
        let cutoff_sqr = self.p.cutoff_sqr();
        let receptor = model.grid_atoms();
        let t1 = ligand.type_id(typing);
        self.index
            .possibilities(&position)
            .iter()
            .filter_map(move |&j| {
                let b = &receptor[j];
                let tpi = type_pair_index(t1?, b.type_id(typing)?);
                let r_ba = position - b.position;
                if r_ba.norm_squared() >= cutoff_sqr {
                    return None;
                }
                let probe = Probe::Atom {
                    atom: ligand,
                    position: pose,
                };
                Some((tpi, r_ba, corrector.theta(&probe, b)))
            })
    }
}

impl<P: Precalculate + ?Sized> Evaluator for DirectEvaluator<'_, P> {
    fn eval(&self, model: &Model, cap: f64) -> f64 {
        let typing = self.p.atom_typing();
        let corrector = GeometryCorrector::new(model);
        let mut e = 0.0;
        for (atom, coords) in model.movable_atoms().iter().zip(model.coords()) {
            if atom.type_id(typing).is_none() {
                continue;
            }
            let clamped = self.clamp(coords);
            let mut this_e: f64 = self
                .pairs(model, &corrector, atom, *coords, clamped.position)
                .map(|(tpi, r_ba, theta)| self.p.eval_fast(tpi, r_ba.norm_squared(), theta))
                .sum();
            curl(&mut this_e, cap);
            e += this_e + self.slope * clamped.overshoot;
        }
        e
    }

    fn eval_deriv(&self, model: &mut Model, cap: f64) -> f64 {
        let typing = self.p.atom_typing();
        model.with_forces(|model, minus_forces| {
            let corrector = GeometryCorrector::new(model);
            let mut e = 0.0;
            for ((atom, coords), force) in model
                .movable_atoms()
                .iter()
                .zip(model.coords())
                .zip(minus_forces.iter_mut())
            {
                if atom.type_id(typing).is_none() {
                    *force = Vector3::zeros();
                    continue;
                }
                let clamped = self.clamp(coords);
                let mut this_e = 0.0;
                let mut deriv = Vector3::zeros();
                for (tpi, r_ba, theta) in
                    self.pairs(model, &corrector, atom, *coords, clamped.position)
                {
                    let (pair_e, dor) = self.p.eval_deriv(tpi, r_ba.norm_squared(), theta);
                    this_e += pair_e;
                    deriv += r_ba * dor;
                }
                curl_with_gradient(&mut this_e, &mut deriv, cap);
                e += this_e + self.slope * clamped.overshoot;
                *force = deriv + clamped.side * self.slope;
            }
            e
        })
    }
}
