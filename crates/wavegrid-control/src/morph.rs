//! Ambient color morph engine
//!
//! Publishes the initial palette, then every `update_interval` draws a new
//! target palette and eases towards it, re-publishing all four colors on each
//! frame step.

use crate::error::{ControlError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use wavegrid_core::{ChannelSurface, ColorMorph, ColorMorphConfig};

/// Handle to a running color morph
#[derive(Debug)]
pub struct AmbientColorMorph {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl AmbientColorMorph {
    /// Validate `config` and start morphing on `surface`.
    ///
    /// The first transition starts immediately. A configured `seed` makes the
    /// palette sequence reproducible.
    pub fn start(config: ColorMorphConfig, surface: Box<dyn ChannelSurface>) -> Result<Self> {
        let morph = ColorMorph::new(config)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ControlError::NoRuntime(e.to_string()))?;

        let rng = match morph.config().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        info!(
            "AmbientColorMorph: starting (interval {:?}, transition {:?})",
            morph.config().update_interval(),
            morph.config().transition_duration()
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = runtime.spawn(run_morph(morph, surface, rng, shutdown_rx));
        Ok(Self {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Stop the morph. No color is written after this returns; calling it
    /// again is a no-op.
    pub async fn dispose(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            warn!("AmbientColorMorph: task ended abnormally: {}", e);
        }
        debug!("AmbientColorMorph: disposed");
    }

    /// Whether the morph task is still alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

async fn run_morph(
    mut morph: ColorMorph,
    mut surface: Box<dyn ChannelSurface>,
    mut rng: StdRng,
    mut shutdown: oneshot::Receiver<()>,
) {
    morph.publish(surface.as_mut());

    let mut retarget = tokio::time::interval(morph.config().update_interval());
    let mut frames = tokio::time::interval(morph.config().frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_step = Instant::now();

    loop {
        tokio::select! {
            biased;
            // Fires on dispose and when the handle is dropped
            _ = &mut shutdown => break,
            _ = retarget.tick() => {
                let target = morph.retarget(&mut rng);
                debug!(
                    "AmbientColorMorph: new target primary hsl({}, {}%, {}%)",
                    target.primary.h, target.primary.s, target.primary.l
                );
                last_step = Instant::now();
            }
            _ = frames.tick(), if morph.is_transitioning() => {
                let now = Instant::now();
                if morph.advance(now - last_step) {
                    morph.publish(surface.as_mut());
                }
                last_step = now;
            }
        }
    }
}
