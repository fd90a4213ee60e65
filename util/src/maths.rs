//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    value.max(min).min(max)
}

/// Get the signed angular distance in degrees required to rotate from `from_deg` to `to_deg`.
///
/// The shortest way round is taken, so the result is in the range `(-180, 180]`. A positive result
/// means `to_deg` is reached by increasing the angle.
pub fn ang_dist_deg<T>(from_deg: T, to_deg: T) -> T
where
    T: Float
{
    let full_t = T::from(360.0).unwrap();
    let half_t = T::from(180.0).unwrap();

    let d = rem_euclid(to_deg - from_deg, full_t);

    if d > half_t {
        d - full_t
    }
    else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ang_dist_deg() {
        assert_eq!(ang_dist_deg(0f64, 90f64), 90f64);
        assert_eq!(ang_dist_deg(90f64, 0f64), -90f64);
        assert_eq!(ang_dist_deg(350f64, 10f64), 20f64);
        assert_eq!(ang_dist_deg(10f64, 350f64), -20f64);
        assert_eq!(ang_dist_deg(0f64, 360f64), 0f64);
        assert_eq!(ang_dist_deg(0f64, 180f64), 180f64);
        assert_eq!(ang_dist_deg(-45f64, 45f64), 90f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-3.0f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25f64, -1.0, 1.0), 0.25);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 100f64), 0.5), 50.0);
        assert_eq!(lin_map((-1f64, 1f64), (1f64, -1f64), 0.5), -0.5);
    }
}
