//! Audio-reactive grid state machine
//!
//! Turns analyzer frames and beats into decayed, weighted visual intensities
//! and publishes them to a [`ChannelSurface`]. This type owns no timers: the
//! caller schedules pulse expiry and drives [`ReactiveGrid::update_grid`] from
//! its frame clock.

use crate::channels::{fixed2, Channel, ChannelSurface, SurfaceFlag, GRID_CHANNELS};
use crate::config::GridConfig;
use crate::features::FeatureFrame;
use crate::frequency::{frequency_hue, normalize_frequency};
use crate::Result;
use tracing::trace;

/// Mutable state of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    /// Gates all processing
    pub is_active: bool,
    /// Beat intensity, reset to 1.0 on a beat and decayed per frame
    pub beat_intensity: f32,
    /// Combined intensity computed on the last update
    pub intensity: f32,
    /// Most recent analyzer frame
    pub frame: FeatureFrame,
    /// A beat pulse is running
    pub pulsing: bool,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            is_active: false,
            beat_intensity: 0.0,
            intensity: 0.0,
            frame: FeatureFrame::default(),
            pulsing: false,
        }
    }
}

/// Point-in-time copy of the grid state
pub type GridSnapshot = GridState;

/// Grid state plus the configuration it was built with
#[derive(Debug, Clone)]
pub struct ReactiveGrid {
    config: GridConfig,
    state: GridState,
}

impl ReactiveGrid {
    /// Create an inactive grid. Fails if the configuration is invalid.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: GridState::default(),
        })
    }

    /// Configuration snapshot
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Whether frames, beats and updates are processed
    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    /// Start processing (playback started).
    pub fn activate(&mut self) {
        self.state.is_active = true;
    }

    /// Stop processing and reset (playback paused, ended or rebound).
    pub fn deactivate(&mut self, surface: Option<&mut dyn ChannelSurface>) {
        self.state.is_active = false;
        self.reset_grid(surface);
    }

    /// Store a new frame and apply one decay step.
    ///
    /// Returns false if the grid is inactive and the frame was ignored.
    pub fn on_frame(&mut self, frame: FeatureFrame) -> bool {
        if !self.state.is_active {
            return false;
        }
        self.state.frame = frame;
        self.state.beat_intensity =
            (self.state.beat_intensity * (1.0 - self.config.beat_decay)).max(0.0);
        true
    }

    /// Register a beat.
    ///
    /// Returns the pulse magnitude to apply, or `None` if inactive.
    pub fn on_beat(&mut self, payload: &FeatureFrame) -> Option<f32> {
        if !self.state.is_active {
            return None;
        }
        self.state.beat_intensity = 1.0;
        Some((payload.bass * 2.0).max(0.0))
    }

    /// Recompute intensities and publish every grid channel.
    ///
    /// No-op while inactive or without a surface.
    pub fn update_grid(&mut self, surface: Option<&mut dyn ChannelSurface>, tick_time: f64) {
        let Some(surface) = surface else {
            return;
        };
        if !self.state.is_active {
            return;
        }

        let frame = &self.state.frame;
        let config = &self.config;

        self.state.intensity = (frame.energy * config.energy_influence
            + frame.bass * config.bass_influence
            + frame.transient_energy * config.transient_influence
            + self.state.beat_intensity)
            .max(0.0);

        let scaled_amplitude = self.state.intensity.min(1.0) * config.wave_amplitude;
        trace!(
            "update_grid t={:.1} intensity={:.3} amplitude={:.3}",
            tick_time,
            self.state.intensity,
            scaled_amplitude
        );

        surface.set(Channel::WaveAmplitude, fixed2(scaled_amplitude));
        surface.set(Channel::BeatIntensity, fixed2(self.state.beat_intensity));
        surface.set(Channel::BassLevel, fixed2(frame.bass));
        surface.set(Channel::MidLevel, fixed2(frame.low_mid));
        surface.set(Channel::HighLevel, fixed2(frame.treble));
        surface.set(Channel::TransientLevel, fixed2(frame.transient_energy));

        if config.frequency_effects_enabled() {
            let normalized = normalize_frequency(frame.peak_frequency);
            surface.set(Channel::FreqNormalized, fixed2(normalized));
            if config.color_shift {
                surface.set(Channel::FreqHue, frequency_hue(normalized).to_string());
            }
        }

        if config.dynamic_detail {
            let detail_level = 0.5 + frame.energy * 0.5;
            surface.set(Channel::DetailLevel, fixed2(detail_level));
        }
    }

    /// Start (`magnitude > 0`) or clear (`magnitude <= 0`) the pulse effect.
    pub fn pulse(&mut self, surface: Option<&mut dyn ChannelSurface>, magnitude: f32) {
        let pulsing = magnitude > 0.0;
        self.state.pulsing = pulsing;

        let Some(surface) = surface else {
            return;
        };
        surface.set_flag(SurfaceFlag::Pulsing, pulsing);
        if pulsing {
            surface.set(Channel::PulseIntensity, fixed2(magnitude));
        } else {
            surface.remove(Channel::PulseIntensity);
        }
    }

    /// Clear every owned channel and zero the state. `is_active` is kept.
    pub fn reset_grid(&mut self, surface: Option<&mut dyn ChannelSurface>) {
        if let Some(surface) = surface {
            for channel in GRID_CHANNELS {
                surface.remove(channel);
            }
            surface.set_flag(SurfaceFlag::Pulsing, false);
        }

        self.state.pulsing = false;
        self.state.intensity = 0.0;
        self.state.beat_intensity = 0.0;
        self.state.frame = FeatureFrame::default();
    }
}
