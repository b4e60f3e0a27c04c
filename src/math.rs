//! ULP-based float comparisons, complex integer powers, and the loose
//! comparators used by [`crate::number`] for `Number` equality and sort.
//!
//! Grounded on `examples/original_source/src/OCMath.c`: the same
//! 2's-complement ULP trick, the same loose epsilon thresholds, and the
//! same `raise_to_integer_power` repeated-squaring-free loop (kept as a
//! plain loop, matching the original, since the exponents this crate
//! exercises are small).

use std::cmp::Ordering;

const DOUBLE_LOOSE_EPS: f64 = 1e-8;
const FLOAT_LOOSE_EPS: f32 = 1.2e-6;

/// Strict ULP-based float equality (`maxUlps` = 8, matching the original's
/// `OCCompareFloatValues`).
pub fn float_almost_equal(a: f32, b: f32) -> bool {
    almost_equal_2s_complement_f32(a, b, 8)
}

/// Strict ULP-based double equality (`maxUlps` = 14, matching the
/// original's `OCCompareDoubleValues`).
pub fn double_almost_equal(a: f64, b: f64) -> bool {
    almost_equal_2s_complement_f64(a, b, 14)
}

fn almost_equal_2s_complement_f32(a: f32, b: f32, max_ulps: i32) -> bool {
    let mut a_int = a.to_bits() as i32;
    if a_int < 0 {
        a_int = i32::MIN.wrapping_sub(a_int);
    }
    let mut b_int = b.to_bits() as i32;
    if b_int < 0 {
        b_int = i32::MIN.wrapping_sub(b_int);
    }
    (a_int.wrapping_sub(b_int)).unsigned_abs() as i64 <= max_ulps as i64
}

fn almost_equal_2s_complement_f64(a: f64, b: f64, max_ulps: i64) -> bool {
    let mut a_int = a.to_bits() as i64;
    if a_int < 0 {
        a_int = i64::MIN.wrapping_sub(a_int);
    }
    let mut b_int = b.to_bits() as i64;
    if b_int < 0 {
        b_int = i64::MIN.wrapping_sub(b_int);
    }
    (a_int.wrapping_sub(b_int)).unsigned_abs() as i128 <= max_ulps as i128
}

/// Three-way ordering with the same ULP tolerance as [`double_almost_equal`].
///
/// Used by [`crate::array::Array::sort`]/`binary_search` as the default
/// numeric comparator (`spec.md` §4.4.1 leaves the comparator a caller
/// choice; this is the one the rest of the original library uses).
pub fn loose_compare(a: f64, b: f64) -> Ordering {
    let diff = (a - b).abs();
    if diff <= DOUBLE_LOOSE_EPS {
        Ordering::Equal
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Loose float comparison counterpart to [`loose_compare`].
pub fn loose_compare_f32(a: f32, b: f32) -> Ordering {
    let diff = (a - b).abs();
    if diff <= FLOAT_LOOSE_EPS {
        Ordering::Equal
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Raises a complex number to an integer power by repeated multiplication.
///
/// Matches `raise_to_integer_power` in the original: a plain loop over
/// `|power|` multiplications, inverting the base first for negative
/// exponents, returning `NAN + NAN*i` if the result is not finite.
pub fn raise_to_integer_power(x: (f64, f64), power: i64) -> (f64, f64) {
    if power == 0 {
        return (1.0, 0.0);
    }
    let positive = power > 0;
    let count = power.unsigned_abs();
    let base = if positive { x } else { complex_recip(x) };
    let mut result = (1.0, 0.0);
    for _ in 0..count {
        result = complex_mul(result, base);
    }
    if result.0.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    result
}

fn complex_mul(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0)
}

fn complex_recip(a: (f64, f64)) -> (f64, f64) {
    let denom = a.0 * a.0 + a.1 * a.1;
    (a.0 / denom, -a.1 / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulp_equal_close_doubles() {
        assert!(double_almost_equal(0.1 + 0.2, 0.3));
    }

    #[test]
    fn ulp_not_equal_far_doubles() {
        assert!(!double_almost_equal(1.0, 1.0001));
    }

    #[test]
    fn loose_compare_within_eps_is_equal() {
        assert_eq!(loose_compare(1.0, 1.0 + 1e-9), Ordering::Equal);
    }

    #[test]
    fn loose_compare_outside_eps_orders() {
        assert_eq!(loose_compare(1.0, 2.0), Ordering::Less);
        assert_eq!(loose_compare(2.0, 1.0), Ordering::Greater);
    }

    #[test]
    fn integer_power_of_complex() {
        let (r, i) = raise_to_integer_power((0.0, 1.0), 2);
        assert!(double_almost_equal(r, -1.0));
        assert!(double_almost_equal(i, 0.0));
    }

    #[test]
    fn integer_power_zero_is_one() {
        assert_eq!(raise_to_integer_power((3.0, 4.0), 0), (1.0, 0.0));
    }

    #[test]
    fn negative_power_inverts_base() {
        let (r, i) = raise_to_integer_power((2.0, 0.0), -1);
        assert!(double_almost_equal(r, 0.5));
        assert!(double_almost_equal(i, 0.0));
    }
}
