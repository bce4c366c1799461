use nalgebra::Vector3;

/// Caps at or above this value leave energies untouched.
const CURL_DISABLED_ABOVE: f64 = 0.1 * f64::MAX;

/// Index of the unordered type pair `(t1, t2)` in a packed triangular table.
///
/// Argument order does not matter.
#[inline]
pub fn type_pair_index(t1: usize, t2: usize) -> usize {
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    lo + hi * (hi + 1) / 2
}

/// Number of unordered pairs over `num_types` types.
#[inline]
pub fn num_type_pairs(num_types: usize) -> usize {
    num_types * (num_types + 1) / 2
}

#[inline]
fn curl_factor(e: f64, cap: f64) -> Option<f64> {
    if e > 0.0 && cap < CURL_DISABLED_ABOVE {
        Some(if cap < f64::EPSILON { 0.0 } else { cap / (cap + e) })
    } else {
        None
    }
}

/// Saturates a positive energy so it never exceeds `cap`: `e -> e * cap / (cap + e)`.
///
/// Negative energies and effectively infinite caps pass through unchanged.
#[inline]
pub fn curl(e: &mut f64, cap: f64) {
    if let Some(factor) = curl_factor(*e, cap) {
        *e *= factor;
    }
}

/// [`curl`] applied jointly to an energy and its gradient.
#[inline]
pub fn curl_with_gradient(e: &mut f64, gradient: &mut Vector3<f64>, cap: f64) {
    if let Some(factor) = curl_factor(*e, cap) {
        *e *= factor;
        *gradient *= factor * factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn type_pair_index_is_symmetric_and_dense() {
        assert_eq!(type_pair_index(0, 0), 0);
        assert_eq!(type_pair_index(0, 1), 1);
        assert_eq!(type_pair_index(1, 1), 2);
        assert_eq!(type_pair_index(2, 0), 3);
        assert_eq!(type_pair_index(0, 2), 3);

        let n = 5;
        let mut seen = vec![false; num_type_pairs(n)];
        for i in 0..n {
            for j in i..n {
                let idx = type_pair_index(i, j);
                assert!(!seen[idx]);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn curl_caps_positive_energy() {
        let mut e = 10.0;
        curl(&mut e, 10.0);
        assert!(f64_approx_equal(e, 5.0));

        let mut huge = 1e12;
        curl(&mut huge, 2.0);
        assert!(huge < 2.0);
    }

    #[test]
    fn curl_leaves_negative_energy_and_infinite_cap_alone() {
        let mut e = -3.0;
        curl(&mut e, 1.0);
        assert_eq!(e, -3.0);

        let mut e = 7.0;
        curl(&mut e, f64::MAX);
        assert_eq!(e, 7.0);
    }

    #[test]
    fn curl_with_zero_cap_zeroes_positive_energy() {
        let mut e = 4.0;
        let mut g = Vector3::new(1.0, 2.0, 3.0);
        curl_with_gradient(&mut e, &mut g, 0.0);
        assert_eq!(e, 0.0);
        assert_eq!(g, Vector3::zeros());
    }

    #[test]
    fn curl_with_gradient_scales_gradient_by_square_of_factor() {
        let mut e = 2.0;
        let mut g = Vector3::new(4.0, 0.0, -8.0);
        curl_with_gradient(&mut e, &mut g, 2.0);
        assert!(f64_approx_equal(e, 1.0));
        assert!(f64_approx_equal(g.x, 1.0));
        assert!(f64_approx_equal(g.z, -2.0));
    }
}
