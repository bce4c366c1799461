use super::GridError;
use super::array::Array3;
use super::dims::{GridDims, lattice_point};
use crate::core::forcefield::potentials::{curl, curl_with_gradient};
use nalgebra::{Point3, Vector3};

/// Interpolation cell containing a query point, plus how far the point lies
/// outside the lattice.
struct Cell {
    /// Lower corner index of the cell along each axis.
    corner: [usize; 3],
    /// Fractional position inside the cell, each in `[0, 1]`.
    frac: [f64; 3],
    /// Distance outside the lattice in lattice units, zero when inside.
    miss: [f64; 3],
    /// -1 below the lattice, 1 above, 0 inside.
    region: [i8; 3],
}

/// Values of one atom type's potential sampled on a regular lattice.
///
/// Evaluation interpolates trilinearly inside the lattice. Outside it, the
/// value at the nearest face is used and a penalty of `slope` per Angstrom
/// of overshoot is added, so optimizers are pushed back into the box.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    dims: GridDims,
    init: Vector3<f64>,
    factor: Vector3<f64>,
    factor_inv: Vector3<f64>,
    /// Last lattice index per axis, i.e. `n`.
    dim_fl_minus_1: Vector3<f64>,
    data: Array3<f64>,
}

impl Grid {
    /// Allocates a zero-filled grid with `n + 1` points along each axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyAxis`] if any axis has no intervals or a
    /// non-positive span.
    pub fn new(dims: &GridDims) -> Result<Self, GridError> {
        for (axis, d) in dims.iter().enumerate() {
            if d.n == 0 || d.span() <= 0.0 {
                return Err(GridError::EmptyAxis { axis });
            }
        }

        let init = Vector3::new(dims[0].begin, dims[1].begin, dims[2].begin);
        let n = Vector3::new(dims[0].n as f64, dims[1].n as f64, dims[2].n as f64);
        let span = Vector3::new(dims[0].span(), dims[1].span(), dims[2].span());
        let factor = n.component_div(&span);

        Ok(Self {
            dims: *dims,
            init,
            factor,
            factor_inv: span.component_div(&n),
            dim_fl_minus_1: n,
            data: Array3::new(dims[0].n + 1, dims[1].n + 1, dims[2].n + 1),
        })
    }

    /// Rebuilds a grid from its lattice values in x-major order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyAxis`] for degenerate dims and
    /// [`GridError::ValueCountMismatch`] if `values` does not hold exactly
    /// one value per lattice point.
    pub fn from_values(dims: &GridDims, values: Vec<f64>) -> Result<Self, GridError> {
        let mut grid = Self::new(dims)?;
        let shape = grid.data.dims();
        let expected = grid.data.len();
        let found = values.len();
        grid.data =
            Array3::from_vec(shape, values).ok_or(GridError::ValueCountMismatch { expected, found })?;
        Ok(grid)
    }

    #[inline]
    pub fn dims(&self) -> &GridDims {
        &self.dims
    }

    /// Number of lattice points along `axis`.
    #[inline]
    pub fn points(&self, axis: usize) -> usize {
        self.data.dim(axis)
    }

    /// Coordinates of lattice point `(x, y, z)`.
    #[inline]
    pub fn index_to_argument(&self, x: usize, y: usize, z: usize) -> Point3<f64> {
        lattice_point(&self.dims, x, y, z)
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.data[(x, y, z)]
    }

    #[inline]
    pub fn set_value(&mut self, x: usize, y: usize, z: usize, value: f64) {
        self.data[(x, y, z)] = value;
    }

    /// The `(y, z)` plane of values at lattice index `x`.
    #[inline]
    pub fn slab_mut(&mut self, x: usize) -> &mut [f64] {
        self.data.slab_mut(x)
    }

    /// All lattice values in x-major order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        self.data.as_slice()
    }

    fn locate(&self, location: &Point3<f64>) -> Cell {
        let s = (location.coords - self.init).component_mul(&self.factor);
        let mut cell = Cell {
            corner: [0; 3],
            frac: [0.0; 3],
            miss: [0.0; 3],
            region: [0; 3],
        };
        for i in 0..3 {
            if s[i] < 0.0 {
                cell.miss[i] = -s[i];
                cell.region[i] = -1;
            } else if s[i] >= self.dim_fl_minus_1[i] {
                cell.miss[i] = s[i] - self.dim_fl_minus_1[i];
                cell.region[i] = 1;
                cell.corner[i] = self.data.dim(i) - 2;
                cell.frac[i] = 1.0;
            } else {
                let a = s[i] as usize;
                cell.corner[i] = a;
                cell.frac[i] = s[i] - a as f64;
            }
        }
        cell
    }

    fn penalty(&self, cell: &Cell, slope: f64) -> f64 {
        slope * (0..3).map(|i| cell.miss[i] * self.factor_inv[i]).sum::<f64>()
    }

    /// The eight corner values of a cell, indexed by `(dx << 2) | (dy << 1) | dz`.
    fn corners(&self, cell: &Cell) -> [f64; 8] {
        let [x, y, z] = cell.corner;
        std::array::from_fn(|k| self.data[(x + (k >> 2), y + ((k >> 1) & 1), z + (k & 1))])
    }

    /// Interpolated value at `location`, capped by `cap` and with the
    /// out-of-lattice penalty added.
    pub fn evaluate(&self, location: &Point3<f64>, slope: f64, cap: f64) -> f64 {
        let cell = self.locate(location);
        let [x, y, z] = cell.frac;
        let (mx, my, mz) = (1.0 - x, 1.0 - y, 1.0 - z);
        let [f000, f001, f010, f011, f100, f101, f110, f111] = self.corners(&cell);

        let mut f = f000 * mx * my * mz
            + f100 * x * my * mz
            + f010 * mx * y * mz
            + f110 * x * y * mz
            + f001 * mx * my * z
            + f101 * x * my * z
            + f011 * mx * y * z
            + f111 * x * y * z;
        curl(&mut f, cap);
        f + self.penalty(&cell, slope)
    }

    /// Like [`evaluate`](Self::evaluate), also returning the Cartesian
    /// gradient. Outside the lattice the interpolated gradient is dropped on
    /// the offending axis and replaced by `slope` pointing back inward.
    pub fn evaluate_with_gradient(
        &self,
        location: &Point3<f64>,
        slope: f64,
        cap: f64,
    ) -> (f64, Vector3<f64>) {
        let cell = self.locate(location);
        let [x, y, z] = cell.frac;
        let (mx, my, mz) = (1.0 - x, 1.0 - y, 1.0 - z);
        let [f000, f001, f010, f011, f100, f101, f110, f111] = self.corners(&cell);

        let mut f = f000 * mx * my * mz
            + f100 * x * my * mz
            + f010 * mx * y * mz
            + f110 * x * y * mz
            + f001 * mx * my * z
            + f101 * x * my * z
            + f011 * mx * y * z
            + f111 * x * y * z;

        let x_g = -f000 * my * mz + f100 * my * mz - f010 * y * mz + f110 * y * mz
            - f001 * my * z
            + f101 * my * z
            - f011 * y * z
            + f111 * y * z;
        let y_g = -f000 * mx * mz - f100 * x * mz + f010 * mx * mz + f110 * x * mz
            - f001 * mx * z
            - f101 * x * z
            + f011 * mx * z
            + f111 * x * z;
        let z_g = -f000 * mx * my - f100 * x * my - f010 * mx * y - f110 * x * y
            + f001 * mx * my
            + f101 * x * my
            + f011 * mx * y
            + f111 * x * y;

        let mut gradient = Vector3::new(x_g, y_g, z_g);
        curl_with_gradient(&mut f, &mut gradient, cap);

        let deriv = Vector3::from_fn(|i, _| {
            let inside = if cell.region[i] == 0 { gradient[i] } else { 0.0 };
            self.factor[i] * inside + slope * f64::from(cell.region[i])
        });
        (f + self.penalty(&cell, slope), deriv)
    }
}
