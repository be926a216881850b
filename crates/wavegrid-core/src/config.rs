//! Engine configuration
//!
//! Configurations are immutable snapshots: engines validate them once at
//! construction and never observe a partially-updated value afterwards.

use crate::logging::LogConfig;
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tuning for the audio-reactive grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Fraction of beat intensity lost per analyzer frame
    pub beat_decay: f32,
    /// How much overall energy affects the grid
    pub energy_influence: f32,
    /// How much bass affects the grid
    pub bass_influence: f32,
    /// How much transients affect the grid
    pub transient_influence: f32,
    /// Wave amplitude multiplier applied to the clamped intensity
    pub wave_amplitude: f32,
    /// Duration of a beat pulse in milliseconds
    pub pulse_duration_ms: u64,
    /// Frequency-based effects are published while this is > 0
    pub frequency_scale: f32,
    /// Map the peak frequency onto a hue channel
    pub color_shift: bool,
    /// Publish an energy-driven detail level
    pub dynamic_detail: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            beat_decay: 0.05,
            energy_influence: 0.5,
            bass_influence: 1.0,
            transient_influence: 0.8,
            wave_amplitude: 1.5,
            pulse_duration_ms: 300,
            frequency_scale: 0.2,
            color_shift: true,
            dynamic_detail: true,
        }
    }
}

impl GridConfig {
    /// Check every field, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.beat_decay) {
            return Err(CoreError::InvalidParameter(format!(
                "beat_decay must be in [0, 1), got {}",
                self.beat_decay
            )));
        }
        for (name, value) in [
            ("energy_influence", self.energy_influence),
            ("bass_influence", self.bass_influence),
            ("transient_influence", self.transient_influence),
            ("wave_amplitude", self.wave_amplitude),
            ("frequency_scale", self.frequency_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidParameter(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.pulse_duration_ms == 0 {
            return Err(CoreError::InvalidParameter(
                "pulse_duration_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Pulse duration as a [`Duration`]
    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_duration_ms)
    }

    /// Whether frequency-based channels are published
    pub fn frequency_effects_enabled(&self) -> bool {
        self.frequency_scale > 0.0
    }
}

/// Tuning for the ambient color morph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMorphConfig {
    /// Time between palette changes in milliseconds
    pub update_interval_ms: u64,
    /// Duration of one transition in seconds
    pub transition_duration_sec: f32,
    /// Inclusive primary hue bounds in degrees; `[345, 15]` wraps through 0
    pub hue_range: [u16; 2],
    /// Inclusive primary saturation bounds in percent
    pub saturation_range: [u8; 2],
    /// Inclusive primary lightness bounds in percent
    pub lightness_range: [u8; 2],
    /// Interpolation step cadence in milliseconds
    pub frame_interval_ms: u64,
    /// Fixed RNG seed for reproducible palettes
    pub seed: Option<u64>,
}

impl Default for ColorMorphConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 5000,
            transition_duration_sec: 2.5,
            hue_range: [345, 15],
            saturation_range: [75, 90],
            lightness_range: [45, 55],
            frame_interval_ms: 16,
            seed: None,
        }
    }
}

impl ColorMorphConfig {
    /// Check every field, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        let [hue_min, hue_max] = self.hue_range;
        if hue_min >= 360 || hue_max >= 360 {
            return Err(CoreError::InvalidRange {
                name: "hue_range",
                min: hue_min as f64,
                max: hue_max as f64,
            });
        }
        for (name, [min, max]) in [
            ("saturation_range", self.saturation_range),
            ("lightness_range", self.lightness_range),
        ] {
            if min > max || max > 100 {
                return Err(CoreError::InvalidRange {
                    name,
                    min: min as f64,
                    max: max as f64,
                });
            }
        }
        if self.update_interval_ms == 0 {
            return Err(CoreError::InvalidParameter(
                "update_interval_ms must be > 0".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(CoreError::InvalidParameter(
                "frame_interval_ms must be > 0".to_string(),
            ));
        }
        let representable = Duration::try_from_secs_f32(self.transition_duration_sec).is_ok();
        if !representable || self.transition_duration_sec <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "transition_duration_sec must be a positive duration, got {}",
                self.transition_duration_sec
            )));
        }
        Ok(())
    }

    /// Time between palette changes
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Duration of one transition
    ///
    /// Unrepresentable values, which `validate` rejects, map to `Duration::MAX`.
    pub fn transition_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.transition_duration_sec).unwrap_or(Duration::MAX)
    }

    /// Interpolation step cadence
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub log: LogConfig,
    /// Reactive grid tuning
    pub grid: GridConfig,
    /// Ambient color tuning
    pub color_morph: ColorMorphConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate both engine sections.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.color_morph.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GridConfig::default().validate().is_ok());
        assert!(ColorMorphConfig::default().validate().is_ok());
        assert_eq!(GridConfig::default().pulse_duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_grid_config_rejects_bad_decay() {
        let config = GridConfig {
            beat_decay: 1.0,
            ..GridConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidParameter(_))
        ));

        let config = GridConfig {
            bass_influence: f32::NAN,
            ..GridConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_morph_config_rejects_inverted_ranges() {
        let config = ColorMorphConfig {
            saturation_range: [90, 75],
            ..ColorMorphConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidRange {
                name: "saturation_range",
                ..
            })
        ));

        let config = ColorMorphConfig {
            lightness_range: [40, 120],
            ..ColorMorphConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ColorMorphConfig {
            hue_range: [10, 360],
            ..ColorMorphConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_morph_config_rejects_unrepresentable_duration() {
        for seconds in [1e20, f32::INFINITY, f32::NAN, -1.0, 0.0] {
            let config = ColorMorphConfig {
                transition_duration_sec: seconds,
                ..ColorMorphConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(CoreError::InvalidParameter(_))),
                "accepted transition_duration_sec = {}",
                seconds
            );
        }

        let config = ColorMorphConfig {
            transition_duration_sec: 1e20,
            ..ColorMorphConfig::default()
        };
        assert_eq!(config.transition_duration(), Duration::MAX);
    }

    #[test]
    fn test_wrapping_hue_range_is_valid() {
        let config = ColorMorphConfig {
            hue_range: [300, 20],
            ..ColorMorphConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [grid]
            beat_decay = 0.1
            color_shift = false

            [color_morph]
            hue_range = [200, 240]
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.beat_decay, 0.1);
        assert!(!config.grid.color_shift);
        assert_eq!(config.grid.pulse_duration_ms, 300);
        assert_eq!(config.color_morph.hue_range, [200, 240]);
        assert_eq!(config.color_morph.saturation_range, [75, 90]);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_invalid_toml_fails_fast() {
        let err = AppConfig::from_toml_str("[color_morph]\nsaturation_range = [90, 10]\n")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRange { .. }));

        let err = AppConfig::from_toml_str("[grid\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }
}
