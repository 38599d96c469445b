//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the symmetric range `[-limit, limit]`.
///
/// The limit is treated as a magnitude, and a value already inside the range
/// is returned untouched (including `NAN`, which propagates).
pub fn clamp_sym<T>(value: T, limit: T) -> T
where
    T: Float
{
    let limit = limit.abs();

    if value.abs() > limit {
        limit * value.signum()
    }
    else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Map an angle in degrees into the range `[0, 360)`.
pub fn wrap_deg_360<T>(value: T) -> T
where
    T: Float
{
    let full = deg(360.0);
    let r = rem_euclid(value, full);

    // Round-off in `rem_euclid` can land exactly on the upper bound
    if r >= full {
        T::zero()
    }
    else {
        r
    }
}

/// Map an angle in degrees into the range `(-180, 180]`.
///
/// This is the shortest signed angular distance represented by `value`, so
/// `270` maps to `-90` and `-360` maps to `0`.
pub fn wrap_deg_180<T>(value: T) -> T
where
    T: Float
{
    let half = deg(180.0);
    let r = rem_euclid(value + half, deg(360.0)) - half;

    if r <= -half {
        half
    }
    else {
        r
    }
}

fn deg<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp_sym() {
        assert_eq!(clamp_sym(15f64, 10f64), 10f64);
        assert_eq!(clamp_sym(-15f64, 10f64), -10f64);
        assert_eq!(clamp_sym(3f64, 10f64), 3f64);
        assert_eq!(clamp_sym(-3f64, -10f64), -3f64);
        assert!(clamp_sym(f64::NAN, 10f64).is_nan());
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(370f64), 10f64);
        assert_eq!(wrap_deg_360(-90f64), 270f64);
        assert_eq!(wrap_deg_360(360f64), 0f64);
        assert_eq!(wrap_deg_360(-1e-20f64), 0f64);
    }

    #[test]
    fn test_wrap_deg_180() {
        assert_eq!(wrap_deg_180(270f64), -90f64);
        assert_eq!(wrap_deg_180(190f64), -170f64);
        assert_eq!(wrap_deg_180(180f64), 180f64);
        assert_eq!(wrap_deg_180(-180f64), 180f64);
        assert_eq!(wrap_deg_180(-360f64), 0f64);
        assert_eq!(wrap_deg_180(45f64), 45f64);
        assert_eq!(wrap_deg_180(-45f64), -45f64);
        assert!(wrap_deg_180(f64::NAN).is_nan());
    }
}
