//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a percentage-style stat into `0.0..=100.0`, mapping NaN to zero.
#[must_use]
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Clamp a probability into `0.0..=1.0`, mapping NaN to zero.
#[must_use]
pub fn clamp_probability(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Round a f32 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f32_to_i32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let value = f64::from(value);
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    cast::<f64, i32>(value.clamp(min, max).round()).unwrap_or(0)
}

/// Floor a non-negative f32 into a u32, returning 0 for negative or NaN input.
#[must_use]
pub fn floor_f32_to_u32(value: f32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(f64::from(value).min(max).floor()).unwrap_or(0)
}

/// Convert a count into f32 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(0.0)
}

/// Convert a signed integer into f32 while allowing precision loss in a single location.
#[must_use]
pub fn i32_to_f32(value: i32) -> f32 {
    cast::<i32, f32>(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_handle_nan_and_bounds() {
        assert!(clamp_percent(f32::NAN).abs() < f32::EPSILON);
        assert!((clamp_percent(140.0) - 100.0).abs() < f32::EPSILON);
        assert!((clamp_probability(-0.3)).abs() < f32::EPSILON);
        assert!((clamp_probability(1.7) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f32_to_i32(1.6), 2);
        assert_eq!(round_f32_to_i32(-1.6), -2);
        assert_eq!(round_f32_to_i32(f32::NAN), 0);
        assert_eq!(round_f32_to_i32(f32::MAX), i32::MAX);
    }

    #[test]
    fn floor_rejects_negative_and_non_finite() {
        assert_eq!(floor_f32_to_u32(3.9), 3);
        assert_eq!(floor_f32_to_u32(-2.0), 0);
        assert_eq!(floor_f32_to_u32(f32::INFINITY), 0);
    }
}
