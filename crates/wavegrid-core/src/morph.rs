//! Ambient color morph state machine
//!
//! Generates random palettes inside the configured hue/saturation/lightness
//! bounds and interpolates the current palette towards them. Time is fed in
//! as step durations so the owner decides the clock.

use crate::channels::{Channel, ChannelSurface};
use crate::color::{ColorHsl, ColorSet};
use crate::config::ColorMorphConfig;
use crate::easing::ease_in_out_sine;
use crate::Result;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Lightness of the generated secondary color
const SECONDARY_LIGHTNESS: f32 = 8.0;
/// Saturation removed from the primary for the secondary color
const SECONDARY_DESATURATION: f32 = 10.0;
/// Lightness of the generated shadow color
const SHADOW_LIGHTNESS: f32 = 25.0;
/// Saturation and lightness of the tinted white
const WHITE_SATURATION: f32 = 10.0;
const WHITE_LIGHTNESS: f32 = 95.0;

/// Draw a hue from an inclusive range; `min > max` wraps through 0.
fn random_hue<R: Rng>(range: [u16; 2], rng: &mut R) -> u16 {
    let [min, max] = range;
    if min <= max {
        rng.random_range(min..=max)
    } else {
        let span = (360 - min) + max;
        (min + rng.random_range(0..=span)) % 360
    }
}

/// Generate a target palette within the configured bounds.
///
/// Fails if `config` does not pass [`ColorMorphConfig::validate`].
pub fn generate_target_colors<R: Rng>(config: &ColorMorphConfig, rng: &mut R) -> Result<ColorSet> {
    config.validate()?;
    Ok(draw_target_colors(config, rng))
}

/// Palette draw for a config that already passed validation.
fn draw_target_colors<R: Rng>(config: &ColorMorphConfig, rng: &mut R) -> ColorSet {
    let primary_hue = random_hue(config.hue_range, rng) as f32;
    let complementary_hue = (primary_hue + 180.0) % 360.0;

    let [sat_min, sat_max] = config.saturation_range;
    let [light_min, light_max] = config.lightness_range;
    let primary_sat = rng.random_range(sat_min..=sat_max) as f32;
    let primary_light = rng.random_range(light_min..=light_max) as f32;

    ColorSet {
        primary: ColorHsl::new(primary_hue, primary_sat, primary_light),
        secondary: ColorHsl::new(
            complementary_hue,
            (primary_sat - SECONDARY_DESATURATION).max(0.0),
            SECONDARY_LIGHTNESS,
        ),
        shadow: ColorHsl::new(primary_hue, primary_sat, SHADOW_LIGHTNESS),
        white: ColorHsl::new(primary_hue, WHITE_SATURATION, WHITE_LIGHTNESS),
    }
}

/// An in-flight interpolation between two palettes
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTransition {
    /// Palette at the moment the transition started
    pub from: ColorSet,
    /// Destination palette
    pub to: ColorSet,
    elapsed: Duration,
    duration: Duration,
}

impl ColorTransition {
    /// Start a transition
    pub fn new(from: ColorSet, to: ColorSet, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// True once the full duration has elapsed
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Move time forward
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// Eased palette at the current progress
    pub fn value(&self) -> ColorSet {
        self.from.lerp(&self.to, ease_in_out_sine(self.progress()))
    }
}

/// Current palette plus the transition driving it
#[derive(Debug, Clone)]
pub struct ColorMorph {
    config: ColorMorphConfig,
    current: ColorSet,
    transition: Option<ColorTransition>,
}

impl ColorMorph {
    /// Create a morph at the default palette. Fails if the configuration is invalid.
    pub fn new(config: ColorMorphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: ColorSet::default(),
            transition: None,
        })
    }

    /// Configuration snapshot
    pub fn config(&self) -> &ColorMorphConfig {
        &self.config
    }

    /// Palette as last interpolated
    pub fn current(&self) -> &ColorSet {
        &self.current
    }

    /// Destination of the running transition
    pub fn target(&self) -> Option<&ColorSet> {
        self.transition.as_ref().map(|t| &t.to)
    }

    /// Whether a transition is in flight
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Start moving towards `target` from the current palette.
    ///
    /// A running transition is abandoned; its in-flight value is the new start.
    pub fn begin_transition(&mut self, target: ColorSet) {
        if self.transition.is_some() {
            debug!("ColorMorph: superseding running transition");
        }
        self.transition = Some(ColorTransition::new(
            self.current,
            target,
            self.config.transition_duration(),
        ));
    }

    /// Generate a new target and start moving towards it.
    pub fn retarget<R: Rng>(&mut self, rng: &mut R) -> ColorSet {
        let target = draw_target_colors(&self.config, rng);
        self.begin_transition(target);
        target
    }

    /// Advance the running transition by `dt`.
    ///
    /// Returns true if the palette changed, i.e. the caller should publish.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        transition.advance(dt);
        self.current = transition.value();
        if transition.is_complete() {
            self.current = transition.to;
            self.transition = None;
        }
        true
    }

    /// Write all four colors to the surface in one pass.
    pub fn publish(&self, surface: &mut dyn ChannelSurface) {
        let [primary, secondary, shadow, white] = self.current.to_hex();
        surface.set(Channel::ColorPrimary, primary);
        surface.set(Channel::ColorSecondary, secondary);
        surface.set(Channel::ColorShadow, shadow);
        surface.set(Channel::ColorWhite, white);
    }
}
