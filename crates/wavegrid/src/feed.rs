//! Synthetic analyzer feed
//!
//! Stands in for a real feature extractor: a beat-locked bass envelope on
//! top of slow sine drifts, with a little noise.

use rand::Rng;
use std::f32::consts::TAU;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;
use wavegrid_control::ScriptedAnalyzer;
use wavegrid_core::FeatureFrame;

/// Feed cadence and tempo
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub frame_interval: Duration,
    pub bpm: f32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(50),
            bpm: 120.0,
        }
    }
}

impl FeedConfig {
    fn beat_period(&self) -> f32 {
        60.0 / self.bpm
    }
}

/// Frame at `t` seconds; `noise` is added to the bands and clamped away.
pub fn synth_frame(t: f32, config: &FeedConfig, noise: f32) -> FeatureFrame {
    let phase = (t % config.beat_period()) / config.beat_period();
    let envelope = (-phase * 6.0).exp();
    let drift = (t * TAU / 16.0).sin();

    let bass = (0.25 + 0.6 * envelope + noise).clamp(0.0, 1.0);
    let low_mid = (0.35 + 0.15 * drift + noise).clamp(0.0, 1.0);
    let high_mid = (0.3 + 0.1 * (t * TAU / 7.0).sin() + noise).clamp(0.0, 1.0);
    let treble = (0.2 + 0.1 * (t * TAU / 3.0).sin() + noise).clamp(0.0, 1.0);

    FeatureFrame {
        energy: (0.45 + 0.25 * drift + 0.2 * envelope).clamp(0.0, 1.0),
        spectrum: vec![bass, low_mid, high_mid, treble],
        bass,
        low_mid,
        high_mid,
        treble,
        // Sweeps roughly 60 Hz to 6.4 kHz
        peak_frequency: 640.0 * 10f32.powf(drift),
        transient_energy: (envelope - 0.5).max(0.0) * 2.0,
    }
}

/// Drive `analyzer` until the returned handle is aborted.
///
/// Frames are emitted every `frame_interval`; a beat is emitted on the first
/// frame of each beat period.
pub fn spawn(analyzer: ScriptedAnalyzer, config: FeedConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut interval = tokio::time::interval(config.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_beat = None;

        loop {
            interval.tick().await;
            let t = start.elapsed().as_secs_f32();
            let noise = rand::rng().random_range(-0.03..0.03);
            let frame = synth_frame(t, &config, noise);

            let beat = (t / config.beat_period()) as u64;
            if last_beat != Some(beat) {
                last_beat = Some(beat);
                let delivered = analyzer.emit_beat(frame.clone());
                trace!(
                    "feed beat {} (bass {:.2}) delivered={}",
                    beat,
                    frame.bass,
                    delivered
                );
            }
            analyzer.emit_frame(frame);
        }
    })
}
