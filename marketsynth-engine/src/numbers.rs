//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Truncate a f64 toward zero and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn trunc_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).trunc();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Round a f64 to the nearest multiple of `step`, returning 0 for non-finite values.
#[must_use]
pub fn round_to_step(value: f64, step: f64) -> i64 {
    if !value.is_finite() || step <= 0.0 {
        return 0;
    }
    trunc_f64_to_i64((value / step).round() * step)
}

/// Round a f64 to a fixed number of decimal places.
#[must_use]
pub fn round_to_places(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Clamp an i32 into the u8 range.
#[must_use]
pub fn clamp_i32_to_u8(value: i32) -> u8 {
    u8::try_from(value.clamp(0, i32::from(u8::MAX))).unwrap_or(u8::MAX)
}

/// Clamp an i64 into the u8 range.
#[must_use]
pub fn clamp_i64_to_u8(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX)
}

/// Clamp an i64 into the u32 range.
#[must_use]
pub fn clamp_i64_to_u32(value: i64) -> u32 {
    u32::try_from(value.clamp(0, i64::from(u32::MAX))).unwrap_or(u32::MAX)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunc_handles_sign_and_non_finite() {
        assert_eq!(trunc_f64_to_i64(2_519.99), 2_519);
        assert_eq!(trunc_f64_to_i64(-3.7), -3);
        assert_eq!(trunc_f64_to_i64(f64::NAN), 0);
        assert_eq!(trunc_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn step_rounding_targets_nearest_thousand() {
        assert_eq!(round_to_step(128_499.0, 1_000.0), 128_000);
        assert_eq!(round_to_step(128_500.0, 1_000.0), 129_000);
        assert_eq!(round_to_step(5.0, 0.0), 0);
    }

    #[test]
    fn place_rounding_keeps_requested_precision() {
        assert!((round_to_places(0.183_49, 3) - 0.183).abs() < f64::EPSILON);
        assert!((round_to_places(12.46, 1) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn integer_clamps_saturate() {
        assert_eq!(clamp_i32_to_u8(-4), 0);
        assert_eq!(clamp_i32_to_u8(300), 255);
        assert_eq!(clamp_i64_to_u8(97), 97);
        assert_eq!(clamp_i64_to_u32(-1), 0);
        assert_eq!(clamp_i64_to_u32(i64::MAX), u32::MAX);
    }
}
