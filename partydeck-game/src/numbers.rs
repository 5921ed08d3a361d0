//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Full turn in degrees.
pub const FULL_TURN: f64 = 360.0;

/// Normalize an angle into `[0, 360)`, returning 0.0 for non-finite values.
#[must_use]
pub fn normalize_degrees(theta: f64) -> f64 {
    if !theta.is_finite() {
        return 0.0;
    }
    let normalized = theta.rem_euclid(FULL_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if normalized >= FULL_TURN {
        0.0
    } else {
        normalized
    }
}

/// Floor a f64 and clamp it to the usize range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<usize, f64>(usize::MAX).unwrap_or(f64::MAX);
    cast::<f64, usize>(value.min(max).floor()).unwrap_or(usize::MAX)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_range() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < f64::EPSILON);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < f64::EPSILON);
        assert!(normalize_degrees(720.0).abs() < f64::EPSILON);
        assert!(normalize_degrees(f64::NAN).abs() < f64::EPSILON);
        assert!(normalize_degrees(-1e-20) < FULL_TURN);
    }

    #[test]
    fn floor_clamps_and_handles_nan() {
        assert_eq!(floor_f64_to_usize(2.9), 2);
        assert_eq!(floor_f64_to_usize(-3.0), 0);
        assert_eq!(floor_f64_to_usize(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_usize(f64::NAN), 0);
    }

    #[test]
    fn counts_convert() {
        assert!((usize_to_f64(12) - 12.0).abs() < f64::EPSILON);
    }
}
