//! Timing curves for color transitions.

use std::f32::consts::PI;

/// Sinusoidal ease-in/ease-out.
///
/// Maps progress in [0, 1] to eased progress in [0, 1]; input outside the
/// range is clamped.
pub fn ease_in_out_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    -((PI * t).cos() - 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_midpoint() {
        assert!(ease_in_out_sine(0.0).abs() < 1e-6);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic_and_clamped() {
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_sine(i as f32 / 100.0);
            assert!(v >= last - 1e-6);
            last = v;
        }
        assert_eq!(ease_in_out_sine(-1.0), ease_in_out_sine(0.0));
        assert_eq!(ease_in_out_sine(2.0), ease_in_out_sine(1.0));
    }

    #[test]
    fn test_slow_start() {
        // Ease-in: the first tenth covers far less than a tenth of the distance
        assert!(ease_in_out_sine(0.1) < 0.05);
    }
}
