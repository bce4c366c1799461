use std::ops::{Index, IndexMut};

/// Dense 3D array over a flat buffer, x-major: `(x, y, z)` lives at
/// `(x * dim1 + y) * dim2 + z`, so each x-slab is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Array3<T> {
    dims: [usize; 3],
    data: Vec<T>,
}

impl<T: Clone + Default> Array3<T> {
    pub fn new(dim0: usize, dim1: usize, dim2: usize) -> Self {
        Self {
            dims: [dim0, dim1, dim2],
            data: vec![T::default(); dim0 * dim1 * dim2],
        }
    }
}

impl<T> Array3<T> {
    /// Wraps an existing buffer; `None` if its length does not match.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Option<Self> {
        (data.len() == dims[0] * dims[1] * dims[2]).then_some(Self { dims, data })
    }

    #[inline]
    pub fn dim(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.dims[0] && y < self.dims[1] && z < self.dims[2]);
        (x * self.dims[1] + y) * self.dims[2] + z
    }

    #[inline]
    pub fn slab_len(&self) -> usize {
        self.dims[1] * self.dims[2]
    }

    /// All `(y, z)` values at a fixed `x`.
    #[inline]
    pub fn slab_mut(&mut self, x: usize) -> &mut [T] {
        let len = self.slab_len();
        &mut self.data[x * len..(x + 1) * len]
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<(usize, usize, usize)> for Array3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &T {
        &self.data[self.offset(x, y, z)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Array3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut T {
        let offset = self.offset(x, y, z);
        &mut self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_default_filled() {
        let a: Array3<f64> = Array3::new(2, 3, 4);
        assert_eq!(a.len(), 24);
        assert!(a.as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(a.dims(), [2, 3, 4]);
    }

    #[test]
    fn indexing_is_x_major() {
        let mut a: Array3<usize> = Array3::new(2, 3, 4);
        a[(1, 2, 3)] = 7;
        a[(0, 0, 1)] = 1;
        assert_eq!(a.as_slice()[23], 7);
        assert_eq!(a.as_slice()[1], 1);
    }

    #[test]
    fn slab_mut_covers_one_x_plane() {
        let mut a: Array3<i32> = Array3::new(3, 2, 2);
        a.slab_mut(1).iter_mut().for_each(|v| *v = 5);
        assert_eq!(a[(1, 0, 0)], 5);
        assert_eq!(a[(1, 1, 1)], 5);
        assert_eq!(a[(0, 1, 1)], 0);
        assert_eq!(a[(2, 0, 0)], 0);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Array3::from_vec([2, 2, 2], vec![0.0; 8]).is_some());
        assert!(Array3::from_vec([2, 2, 2], vec![0.0; 7]).is_none());
    }
}
