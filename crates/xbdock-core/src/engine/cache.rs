use super::config::ScoringConfig;
use super::corrector::{GeometryCorrector, Probe};
use super::error::CacheError;
use super::evaluator::Evaluator;
use super::progress::{Progress, ProgressReporter};
use crate::core::forcefield::potentials::type_pair_index;
use crate::core::forcefield::precalculate::Precalculate;
use crate::core::grid::dims::{GridDims, dims_approx_eq, lattice_point, neighbor_dims};
use crate::core::grid::grid::Grid;
use crate::core::models::atom::AtomTyping;
use crate::core::models::model::Model;
use crate::core::spatial::{NeighborGrid, SpatialIndex};
use itertools::iproduct;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Precomputed receptor potential, one lazily filled [`Grid`] per ligand
/// atom type.
///
/// Every grid shares the cache's dimensions and typing scheme. Grids are
/// only computed for the types passed to [`populate`](Self::populate), and
/// a type is never recomputed once present.
#[derive(Debug, Clone)]
pub struct GridCache {
    version: String,
    dims: GridDims,
    slope: f64,
    typing: AtomTyping,
    grids: Vec<Option<Grid>>,
}

#[derive(Serialize, Deserialize)]
struct StoredCache {
    version: String,
    atom_typing: AtomTyping,
    dims: GridDims,
    grids: Vec<StoredGrid>,
}

#[derive(Serialize, Deserialize)]
struct StoredGrid {
    atom_type: usize,
    values: Vec<f64>,
}

impl GridCache {
    /// Creates an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidDimensions`] if any axis of `dims` has no
    /// intervals or a non-positive span.
    pub fn new(
        version: impl Into<String>,
        dims: GridDims,
        slope: f64,
        typing: AtomTyping,
    ) -> Result<Self, CacheError> {
        Grid::new(&dims)?;
        Ok(Self {
            version: version.into(),
            dims,
            slope,
            typing,
            grids: vec![None; typing.num_atom_types()],
        })
    }

    pub fn from_config(config: &ScoringConfig) -> Result<Self, CacheError> {
        Self::new(
            config.version.clone(),
            config.grid_dims(),
            config.slope,
            config.atom_typing,
        )
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dims(&self) -> &GridDims {
        &self.dims
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn atom_typing(&self) -> AtomTyping {
        self.typing
    }

    pub fn is_populated(&self, atom_type: usize) -> bool {
        self.grid(atom_type).is_some()
    }

    pub fn grid(&self, atom_type: usize) -> Option<&Grid> {
        self.grids.get(atom_type).and_then(Option::as_ref)
    }

    fn ready_grid(&self, atom_type: usize) -> &Grid {
        match self.grid(atom_type) {
            Some(grid) => grid,
            None => panic!(
                "Grid for atom type {} evaluated before it was populated",
                atom_type
            ),
        }
    }

    /// Computes the grids of every requested atom type that is not yet
    /// present.
    ///
    /// Each lattice point receives, per requested type, the sum of the pair
    /// potential over the receptor atoms within the cutoff. Requested types
    /// outside the typing scheme are skipped with a warning. Calling this
    /// again with already populated types does nothing.
    ///
    /// Progress is reported as one phase containing one task step per
    /// x-slab of the lattice.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::TypingMismatch`] if `p` was built for a
    /// different typing scheme than the cache.
    #[instrument(skip_all, name = "grid_cache_populate")]
    pub fn populate<P>(
        &mut self,
        model: &Model,
        p: &P,
        atom_types_needed: &[usize],
        reporter: &ProgressReporter,
    ) -> Result<(), CacheError>
    where
        P: Precalculate + ?Sized,
    {
        if p.atom_typing() != self.typing {
            return Err(CacheError::TypingMismatch {
                expected: self.typing,
                found: p.atom_typing(),
            });
        }

        reporter.report(Progress::PhaseStart {
            name: "Grid Population",
        });

        let mut needed: Vec<usize> = Vec::new();
        for &t in atom_types_needed {
            if t >= self.grids.len() {
                warn!(
                    atom_type = t,
                    typing = %self.typing,
                    "Requested atom type is outside the typing scheme; skipping."
                );
                continue;
            }
            if self.grids[t].is_none() && !needed.contains(&t) {
                needed.push(t);
            }
        }
        if needed.is_empty() {
            debug!("All requested grids already populated.");
            reporter.report(Progress::PhaseFinish);
            return Ok(());
        }

        info!(
            atom_types = ?needed,
            receptor_atoms = model.grid_atoms().len(),
            "Populating potential grids."
        );

        let dims = self.dims;
        let typing = self.typing;
        let cutoff_sqr = p.cutoff_sqr();
        let index = NeighborGrid::new(model, &neighbor_dims(&dims), cutoff_sqr, typing);
        let corrector = GeometryCorrector::new(model);
        let receptor = model.grid_atoms();
        let (nx, ny, nz) = (dims[0].n + 1, dims[1].n + 1, dims[2].n + 1);
        let k = needed.len();

        reporter.report(Progress::TaskStart {
            total_steps: nx as u64,
        });

        // Values for one x-slab, `k` consecutive slots per (y, z) point.
        let compute_slab = |x: usize| -> Vec<f64> {
            let mut affinities = vec![0.0; ny * nz * k];
            for (point, (y, z)) in iproduct!(0..ny, 0..nz).enumerate() {
                let probe = lattice_point(&dims, x, y, z);
                let slots = &mut affinities[point * k..(point + 1) * k];
                for &i in index.possibilities(&probe) {
                    let atom = &receptor[i];
                    let Some(t1) = atom.type_id(typing) else {
                        continue;
                    };
                    let r2 = (atom.position - probe).norm_squared();
                    if r2 > cutoff_sqr {
                        continue;
                    }
                    let theta = corrector.theta(&Probe::Point(probe), atom);
                    for (slot, &t2) in slots.iter_mut().zip(&needed) {
                        *slot += p.eval_fast(type_pair_index(t1, t2), r2, theta);
                    }
                }
            }
            reporter.report(Progress::TaskIncrement);
            affinities
        };

        #[cfg(not(feature = "parallel"))]
        let slabs: Vec<Vec<f64>> = (0..nx).map(compute_slab).collect();

        #[cfg(feature = "parallel")]
        let slabs: Vec<Vec<f64>> = (0..nx).into_par_iter().map(compute_slab).collect();

        reporter.report(Progress::TaskFinish);

        let mut grids = needed
            .iter()
            .map(|_| Grid::new(&dims))
            .collect::<Result<Vec<_>, _>>()?;
        for (x, slab) in slabs.iter().enumerate() {
            for (j, grid) in grids.iter_mut().enumerate() {
                for (value, point) in grid.slab_mut(x).iter_mut().zip(slab.chunks_exact(k)) {
                    *value = point[j];
                }
            }
        }
        for (t, grid) in needed.iter().zip(grids) {
            self.grids[*t] = Some(grid);
        }

        info!(populated = k, lattice_points = nx * ny * nz, "Grid population finished.");
        reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    /// Serializes the version tag, dims, typing scheme and every populated
    /// grid to TOML.
    pub fn to_toml_string(&self) -> Result<String, CacheError> {
        let stored = StoredCache {
            version: self.version.clone(),
            atom_typing: self.typing,
            dims: self.dims,
            grids: self
                .grids
                .iter()
                .enumerate()
                .filter_map(|(atom_type, grid)| {
                    grid.as_ref().map(|g| StoredGrid {
                        atom_type,
                        values: g.values().to_vec(),
                    })
                })
                .collect(),
        };
        Ok(toml::to_string(&stored)?)
    }

    /// Replaces this cache's grids with those of a serialized cache.
    ///
    /// The stored version tag, dims and typing scheme must match this
    /// cache's, checked in that order. On any error the cache is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::VersionMismatch`], [`CacheError::DimensionMismatch`]
    /// or [`CacheError::TypingMismatch`] for the first field that differs,
    /// [`CacheError::UnknownAtomType`] or [`CacheError::MalformedGrid`] for
    /// inconsistent grid records, and [`CacheError::Toml`] for unparsable
    /// input.
    pub fn load_from_str(&mut self, content: &str) -> Result<(), CacheError> {
        let stored: StoredCache = toml::from_str(content)?;

        if stored.version != self.version {
            return Err(CacheError::VersionMismatch {
                expected: self.version.clone(),
                found: stored.version,
            });
        }
        if !dims_approx_eq(&stored.dims, &self.dims) {
            return Err(CacheError::DimensionMismatch);
        }
        if stored.atom_typing != self.typing {
            return Err(CacheError::TypingMismatch {
                expected: self.typing,
                found: stored.atom_typing,
            });
        }

        let mut grids = vec![None; self.typing.num_atom_types()];
        for record in stored.grids {
            let atom_type = record.atom_type;
            let slot = grids
                .get_mut(atom_type)
                .ok_or(CacheError::UnknownAtomType {
                    atom_type,
                    typing: self.typing,
                })?;
            let grid = Grid::from_values(&self.dims, record.values)
                .map_err(|source| CacheError::MalformedGrid { atom_type, source })?;
            *slot = Some(grid);
        }
        self.grids = grids;
        Ok(())
    }

    #[instrument(skip_all, name = "grid_cache_write")]
    pub fn write(&self, path: &Path) -> Result<(), CacheError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| CacheError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        info!(path = %path.display(), "Grid cache written.");
        Ok(())
    }

    #[instrument(skip_all, name = "grid_cache_read")]
    pub fn read(&mut self, path: &Path) -> Result<(), CacheError> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.load_from_str(&content)?;
        info!(
            path = %path.display(),
            populated = self.grids.iter().flatten().count(),
            "Grid cache loaded."
        );
        Ok(())
    }
}

impl Evaluator for GridCache {
    /// # Panics
    ///
    /// Panics if an in-scheme ligand atom's type has not been populated.
    fn eval(&self, model: &Model, cap: f64) -> f64 {
        model
            .movable_atoms()
            .iter()
            .zip(model.coords())
            .filter_map(|(atom, coords)| {
                let t = atom.type_id(self.typing)?;
                Some(self.ready_grid(t).evaluate(coords, self.slope, cap))
            })
            .sum()
    }

    /// # Panics
    ///
    /// Panics if an in-scheme ligand atom's type has not been populated.
    fn eval_deriv(&self, model: &mut Model, cap: f64) -> f64 {
        let (atoms, coords, minus_forces) = model.split_for_forces();
        let mut e = 0.0;
        for ((atom, c), force) in atoms.iter().zip(coords).zip(minus_forces.iter_mut()) {
            match atom.type_id(self.typing) {
                Some(t) => {
                    let (value, deriv) =
                        self.ready_grid(t).evaluate_with_gradient(c, self.slope, cap);
                    e += value;
                    *force = deriv;
                }
                None => *force = Vector3::zeros(),
            }
        }
        e
    }
}
