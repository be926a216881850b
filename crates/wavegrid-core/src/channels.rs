//! Visual-parameter channels and the surface they are written to.
//!
//! Channel names are stable: downstream renderers read them by name.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A named visual-parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Scaled wave amplitude
    WaveAmplitude,
    /// Decaying beat intensity
    BeatIntensity,
    /// Bass band level
    BassLevel,
    /// Low-mid band level
    MidLevel,
    /// Treble band level
    HighLevel,
    /// Transient energy
    TransientLevel,
    /// Magnitude of the running beat pulse
    PulseIntensity,
    /// Peak frequency on a 0-1 logarithmic scale
    FreqNormalized,
    /// Peak frequency mapped onto an integer hue
    FreqHue,
    /// Grid detail level
    DetailLevel,
    /// Ambient primary color
    ColorPrimary,
    /// Ambient secondary (complementary) color
    ColorSecondary,
    /// Ambient shadow color
    ColorShadow,
    /// Ambient tinted white
    ColorWhite,
}

/// Every channel owned by the reactive grid
pub const GRID_CHANNELS: [Channel; 10] = [
    Channel::WaveAmplitude,
    Channel::BeatIntensity,
    Channel::BassLevel,
    Channel::MidLevel,
    Channel::HighLevel,
    Channel::TransientLevel,
    Channel::PulseIntensity,
    Channel::FreqNormalized,
    Channel::FreqHue,
    Channel::DetailLevel,
];

/// Every channel owned by the color morph
pub const COLOR_CHANNELS: [Channel; 4] = [
    Channel::ColorPrimary,
    Channel::ColorSecondary,
    Channel::ColorShadow,
    Channel::ColorWhite,
];

impl Channel {
    /// Stable external name
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::WaveAmplitude => "wave-amplitude",
            Channel::BeatIntensity => "beat-intensity",
            Channel::BassLevel => "bass-level",
            Channel::MidLevel => "mid-level",
            Channel::HighLevel => "high-level",
            Channel::TransientLevel => "transient-level",
            Channel::PulseIntensity => "pulse-intensity",
            Channel::FreqNormalized => "freq-normalized",
            Channel::FreqHue => "freq-hue",
            Channel::DetailLevel => "detail-level",
            Channel::ColorPrimary => "color-primary",
            Channel::ColorSecondary => "color-secondary",
            Channel::ColorShadow => "color-shadow",
            Channel::ColorWhite => "color-white",
        }
    }

    /// Look up a channel by its external name.
    pub fn from_name(name: &str) -> Option<Self> {
        GRID_CHANNELS
            .iter()
            .chain(COLOR_CHANNELS.iter())
            .copied()
            .find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean markers set on the surface alongside channel values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurfaceFlag {
    /// A beat pulse is running
    Pulsing,
}

impl SurfaceFlag {
    /// Stable external name
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceFlag::Pulsing => "is-pulsing",
        }
    }
}

/// Rendering surface exposing named channels.
///
/// Values are preformatted strings; the surface stores them verbatim.
pub trait ChannelSurface: Send {
    /// Publish a channel value
    fn set(&mut self, channel: Channel, value: String);
    /// Stop publishing a channel
    fn remove(&mut self, channel: Channel);
    /// Set or clear a flag
    fn set_flag(&mut self, flag: SurfaceFlag, enabled: bool);
}

#[derive(Debug, Default)]
struct SurfaceInner {
    values: BTreeMap<Channel, String>,
    flags: BTreeSet<SurfaceFlag>,
    writes: u64,
}

/// In-memory surface that records every write.
///
/// Clones share the same storage, so one clone can be handed to an engine
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<SurfaceInner>>,
}

impl MemorySurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a channel
    pub fn get(&self, channel: Channel) -> Option<String> {
        self.inner.lock().values.get(&channel).cloned()
    }

    /// Whether a flag is set
    pub fn has_flag(&self, flag: SurfaceFlag) -> bool {
        self.inner.lock().flags.contains(&flag)
    }

    /// Total number of set/remove/flag operations received
    pub fn write_count(&self) -> u64 {
        self.inner.lock().writes
    }

    /// Snapshot of all published channels
    pub fn values(&self) -> BTreeMap<Channel, String> {
        self.inner.lock().values.clone()
    }

    /// True if none of the given channels is published
    pub fn is_clear_of(&self, channels: &[Channel]) -> bool {
        let inner = self.inner.lock();
        channels.iter().all(|c| !inner.values.contains_key(c))
    }
}

impl ChannelSurface for MemorySurface {
    fn set(&mut self, channel: Channel, value: String) {
        let mut inner = self.inner.lock();
        inner.writes += 1;
        inner.values.insert(channel, value);
    }

    fn remove(&mut self, channel: Channel) {
        let mut inner = self.inner.lock();
        inner.writes += 1;
        inner.values.remove(&channel);
    }

    fn set_flag(&mut self, flag: SurfaceFlag, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.writes += 1;
        if enabled {
            inner.flags.insert(flag);
        } else {
            inner.flags.remove(&flag);
        }
    }
}

/// Format a numeric channel value with two decimals.
pub fn fixed2(value: f32) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in GRID_CHANNELS.iter().chain(COLOR_CHANNELS.iter()) {
            assert_eq!(Channel::from_name(channel.as_str()), Some(*channel));
        }
        assert_eq!(Channel::from_name("wave-height"), None);
    }

    #[test]
    fn test_memory_surface_clones_share_state() {
        let surface = MemorySurface::new();
        let mut writer = surface.clone();

        writer.set(Channel::BassLevel, "0.50".to_string());
        writer.set_flag(SurfaceFlag::Pulsing, true);

        assert_eq!(surface.get(Channel::BassLevel).as_deref(), Some("0.50"));
        assert!(surface.has_flag(SurfaceFlag::Pulsing));
        assert_eq!(surface.write_count(), 2);

        writer.remove(Channel::BassLevel);
        assert!(surface.is_clear_of(&[Channel::BassLevel]));
    }

    #[test]
    fn test_fixed2() {
        assert_eq!(fixed2(0.0), "0.00");
        assert_eq!(fixed2(1.5), "1.50");
        assert_eq!(fixed2(0.126), "0.13");
    }
}
