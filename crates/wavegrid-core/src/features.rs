//! Feature frames delivered by the audio analyzer.

use serde::{Deserialize, Serialize};

/// Number of spectrum bands in a zeroed frame
pub const DEFAULT_SPECTRUM_BANDS: usize = 4;

/// A snapshot of analysis output.
///
/// Frames are immutable once delivered. The grid keeps only the most recent
/// one; there is no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFrame {
    /// Overall energy (0.0 - 1.0)
    pub energy: f32,
    /// Band magnitudes, lowest band first
    pub spectrum: Vec<f32>,
    /// Bass band level
    pub bass: f32,
    /// Low-mid band level
    pub low_mid: f32,
    /// High-mid band level
    pub high_mid: f32,
    /// Treble band level
    pub treble: f32,
    /// Dominant frequency in Hz (0.0 when no peak was found)
    pub peak_frequency: f32,
    /// Energy of the most recent transient
    pub transient_energy: f32,
}

impl Default for FeatureFrame {
    fn default() -> Self {
        Self {
            energy: 0.0,
            spectrum: vec![0.0; DEFAULT_SPECTRUM_BANDS],
            bass: 0.0,
            low_mid: 0.0,
            high_mid: 0.0,
            treble: 0.0,
            peak_frequency: 0.0,
            transient_energy: 0.0,
        }
    }
}

impl FeatureFrame {
    /// Frame carrying only a bass level, the minimum a beat payload provides.
    pub fn with_bass(bass: f32) -> Self {
        Self {
            bass,
            ..Self::default()
        }
    }

    /// True if every scalar and every spectrum band is zero.
    pub fn is_silent(&self) -> bool {
        self.energy == 0.0
            && self.bass == 0.0
            && self.low_mid == 0.0
            && self.high_mid == 0.0
            && self.treble == 0.0
            && self.peak_frequency == 0.0
            && self.transient_energy == 0.0
            && self.spectrum.iter().all(|b| *b == 0.0)
    }
}
