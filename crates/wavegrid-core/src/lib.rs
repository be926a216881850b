//! WaveGrid Core - Audio-reactive visual state
//!
//! This crate contains the runtime-free domain model for WaveGrid, including:
//! - Feature frames produced by an audio analyzer
//! - The reactive grid state machine (decay, pulses, channel publishing)
//! - The ambient color morph state machine (palette generation, transitions)
//! - Visual-parameter channels and the output surface abstraction
//! - Configuration and logging settings

#![warn(missing_docs)]

use thiserror::Error;

pub mod channels;
pub mod color;
pub mod config;
pub mod easing;
pub mod features;
pub mod frequency;
pub mod grid;
pub mod logging;
pub mod morph;

// --- Re-exports grouped by category ---

// Channels & Output
pub use channels::{
    Channel, ChannelSurface, MemorySurface, SurfaceFlag, COLOR_CHANNELS, GRID_CHANNELS,
};

// Color
pub use color::{hsl_to_hex, ColorHsl, ColorSet};
pub use morph::{generate_target_colors, ColorMorph, ColorTransition};

// Audio-reactive grid
pub use features::FeatureFrame;
pub use frequency::normalize_frequency;
pub use grid::{GridSnapshot, GridState, ReactiveGrid};

// Configuration & Logging
pub use config::{AppConfig, ColorMorphConfig, GridConfig};
pub use logging::LogConfig;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configured numeric range is inverted, empty or out of bounds
    #[error("Invalid range for {name}: [{min}, {max}]")]
    InvalidRange {
        /// Name of the configuration field
        name: &'static str,
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },

    /// A configured scalar is out of its accepted domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidRange {
            name: "saturation_range",
            min: 90.0,
            max: 75.0,
        };
        assert_eq!(err.to_string(), "Invalid range for saturation_range: [90, 75]");

        let err = CoreError::InvalidParameter("beat_decay must be in [0, 1)".to_string());
        assert!(err.to_string().contains("beat_decay"));
    }
}
