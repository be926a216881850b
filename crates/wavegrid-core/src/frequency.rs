//! Logarithmic frequency normalization.

/// Lower bound of the audible range in Hz
pub const MIN_FREQUENCY_HZ: f32 = 20.0;
/// Upper bound of the audible range in Hz
pub const MAX_FREQUENCY_HZ: f32 = 20_000.0;
/// Frequency assumed when the analyzer reports no peak
pub const FALLBACK_FREQUENCY_HZ: f32 = 1_000.0;

/// Map a frequency onto [0, 1] using a logarithmic scale over 20 Hz - 20 kHz.
///
/// A non-positive or non-finite input means "no peak" and is treated as
/// [`FALLBACK_FREQUENCY_HZ`].
pub fn normalize_frequency(peak_hz: f32) -> f32 {
    let hz = if peak_hz.is_finite() && peak_hz > 0.0 {
        peak_hz
    } else {
        FALLBACK_FREQUENCY_HZ
    };
    let log_min = MIN_FREQUENCY_HZ.ln();
    let log_max = MAX_FREQUENCY_HZ.ln();
    let log_freq = hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ).ln();
    ((log_freq - log_min) / (log_max - log_min)).clamp(0.0, 1.0)
}

/// Map a normalized frequency onto an integer hue in [0, 360].
pub fn frequency_hue(normalized: f32) -> u16 {
    (normalized.clamp(0.0, 1.0) * 360.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(normalize_frequency(20.0), 0.0);
        assert_eq!(normalize_frequency(20_000.0), 1.0);
        assert_eq!(normalize_frequency(5.0), 0.0);
        assert_eq!(normalize_frequency(96_000.0), 1.0);
    }

    #[test]
    fn test_logarithmic_midpoint() {
        // 2 kHz is two decades above 20 Hz out of three
        let n = normalize_frequency(2_000.0);
        assert!((n - 2.0 / 3.0).abs() < 0.01, "got {}", n);
        // 632 Hz is the geometric mean of the range
        assert!((normalize_frequency(632.46) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_missing_peak_uses_fallback() {
        assert_eq!(normalize_frequency(0.0), normalize_frequency(FALLBACK_FREQUENCY_HZ));
        assert_eq!(normalize_frequency(f32::NAN), normalize_frequency(FALLBACK_FREQUENCY_HZ));
    }

    #[test]
    fn test_frequency_hue() {
        assert_eq!(frequency_hue(0.0), 0);
        assert_eq!(frequency_hue(0.5), 180);
        assert_eq!(frequency_hue(1.0), 360);
    }
}
