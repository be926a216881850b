//! Feature-reactive grid engine
//!
//! [`FeatureReactiveGrid`] runs a [`ReactiveGrid`] inside a tokio task.
//! Analyzer events, playback signals, ticks, pulse expiries and handle
//! commands are all queued as `GridMessage`s and applied in arrival order,
//! so the grid state is only ever touched by the worker. Ticks are coalesced:
//! at most one is queued at a time and it carries the newest timestamp.

use crate::analyzer::{AnalyzerEvent, AudioAnalyzer};
use crate::emitter::{Emitter, OwnerTag, TICK_EVENT};
use crate::error::{ControlError, Result};
use crate::playback::{MediaHandle, PlaybackEvent};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wavegrid_core::{ChannelSurface, GridConfig, GridSnapshot, ReactiveGrid};

enum GridMessage {
    Analyzer {
        connection: u64,
        event: AnalyzerEvent,
    },
    Playback {
        connection: u64,
        event: PlaybackEvent,
    },
    Tick,
    Pulse(f32),
    PulseExpired {
        generation: u64,
    },
    ConnectAudio(MediaHandle),
    Snapshot(oneshot::Sender<GridSnapshot>),
    Dispose,
}

/// Latest tick timestamp plus whether a `Tick` message is already queued
#[derive(Default)]
struct TickSlot {
    queued: AtomicBool,
    timestamp: AtomicU64,
}

impl TickSlot {
    /// Record `timestamp`; queue a `Tick` only if none is outstanding.
    fn offer(&self, tx: &mpsc::UnboundedSender<GridMessage>, timestamp: f64) {
        self.timestamp.store(timestamp.to_bits(), Ordering::SeqCst);
        if !self.queued.swap(true, Ordering::SeqCst) {
            let _ = tx.send(GridMessage::Tick);
        }
    }

    /// Release the slot and return the newest timestamp.
    fn take(&self) -> f64 {
        self.queued.store(false, Ordering::SeqCst);
        f64::from_bits(self.timestamp.load(Ordering::SeqCst))
    }
}

fn surface_of(surface: &mut Option<Box<dyn ChannelSurface>>) -> Option<&mut dyn ChannelSurface> {
    surface.as_mut().map(|s| s.as_mut() as &mut dyn ChannelSurface)
}

struct GridWorker {
    grid: ReactiveGrid,
    surface: Option<Box<dyn ChannelSurface>>,
    media: MediaHandle,
    analyzer: Option<Box<dyn AudioAnalyzer>>,
    emitter: Emitter,
    owner: OwnerTag,
    tx: mpsc::UnboundedSender<GridMessage>,
    ticks: Arc<TickSlot>,
    connection: u64,
    pulse_generation: u64,
    pulse_timer: Option<JoinHandle<()>>,
}

impl GridWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<GridMessage>) {
        while let Some(message) = rx.recv().await {
            if !self.handle(message) {
                return;
            }
        }
        self.shutdown();
    }

    /// Apply one message. Returns false once the worker should exit.
    fn handle(&mut self, message: GridMessage) -> bool {
        match message {
            GridMessage::Analyzer { connection, event } => {
                if connection != self.connection {
                    warn!(
                        "FeatureReactiveGrid: dropping analyzer event from stale connection {}",
                        connection
                    );
                    return true;
                }
                match event {
                    AnalyzerEvent::Frame(frame) => {
                        self.grid.on_frame(frame);
                    }
                    AnalyzerEvent::Beat(payload) => {
                        if let Some(magnitude) = self.grid.on_beat(&payload) {
                            self.set_pulse(magnitude);
                        }
                    }
                }
            }
            GridMessage::Playback { connection, event } => {
                if connection != self.connection {
                    warn!(
                        "FeatureReactiveGrid: dropping {:?} from stale connection {}",
                        event, connection
                    );
                    return true;
                }
                match event {
                    PlaybackEvent::Play => {
                        debug!("FeatureReactiveGrid: play on '{}'", self.media.name());
                        self.grid.activate();
                        if let Some(analyzer) = self.analyzer.as_mut() {
                            analyzer.start();
                        }
                    }
                    PlaybackEvent::Pause | PlaybackEvent::Ended => {
                        debug!(
                            "FeatureReactiveGrid: {:?} on '{}'",
                            event,
                            self.media.name()
                        );
                        self.halt();
                    }
                }
            }
            GridMessage::Tick => {
                let timestamp = self.ticks.take();
                self.grid.update_grid(surface_of(&mut self.surface), timestamp);
            }
            GridMessage::Pulse(magnitude) => self.set_pulse(magnitude),
            GridMessage::PulseExpired { generation } => {
                if generation == self.pulse_generation && self.pulse_timer.take().is_some() {
                    self.grid.pulse(surface_of(&mut self.surface), 0.0);
                }
            }
            GridMessage::ConnectAudio(media) => self.reconnect(media),
            GridMessage::Snapshot(reply) => {
                let _ = reply.send(self.grid.state().clone());
            }
            GridMessage::Dispose => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    /// Bind playback and analyzer listeners under a fresh connection id.
    fn attach(&mut self) {
        self.connection += 1;
        let connection = self.connection;

        let tx = self.tx.clone();
        self.media.add_listener(self.owner, move |event| {
            let _ = tx.send(GridMessage::Playback { connection, event });
        });

        if let Some(analyzer) = self.analyzer.as_mut() {
            let tx = self.tx.clone();
            analyzer.subscribe(Arc::new(move |event| {
                let _ = tx.send(GridMessage::Analyzer { connection, event });
            }));
        }
    }

    fn detach(&mut self) {
        self.media.remove_listener(self.owner);
        if let Some(analyzer) = self.analyzer.as_mut() {
            analyzer.stop();
            analyzer.unsubscribe();
        }
    }

    /// Pause/end: stop the analyzer and clear everything.
    fn halt(&mut self) {
        self.cancel_pulse_timer();
        if let Some(analyzer) = self.analyzer.as_mut() {
            analyzer.stop();
        }
        self.grid.deactivate(surface_of(&mut self.surface));
    }

    fn reconnect(&mut self, media: MediaHandle) {
        info!(
            "FeatureReactiveGrid: reconnecting from '{}' to '{}'",
            self.media.name(),
            media.name()
        );
        self.detach();
        self.media = media;
        if let Some(analyzer) = self.analyzer.as_mut() {
            analyzer.connect_audio(&self.media);
        }
        self.attach();
        self.cancel_pulse_timer();
        self.grid.deactivate(surface_of(&mut self.surface));
    }

    /// Apply a pulse and, if positive, schedule its expiry.
    fn set_pulse(&mut self, magnitude: f32) {
        self.cancel_pulse_timer();
        self.grid.pulse(surface_of(&mut self.surface), magnitude);
        if magnitude <= 0.0 {
            return;
        }

        let generation = self.pulse_generation;
        let duration = self.grid.config().pulse_duration();
        let tx = self.tx.clone();
        self.pulse_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(GridMessage::PulseExpired { generation });
        }));
    }

    /// Abort the pending expiry; an already queued one is invalidated.
    fn cancel_pulse_timer(&mut self) {
        if let Some(timer) = self.pulse_timer.take() {
            timer.abort();
        }
        self.pulse_generation += 1;
    }

    fn shutdown(&mut self) {
        self.detach();
        if let Some(mut analyzer) = self.analyzer.take() {
            analyzer.dispose();
        }
        self.cancel_pulse_timer();
        self.emitter.off(TICK_EVENT, self.owner);
        self.grid.deactivate(surface_of(&mut self.surface));
        debug!("FeatureReactiveGrid: disposed");
    }
}

/// Handle to a running grid engine.
///
/// Commands are queued and applied asynchronously; use [`flush`] or
/// [`snapshot`] to wait for them. Dropping the handle disposes the engine
/// without waiting.
///
/// [`flush`]: FeatureReactiveGrid::flush
/// [`snapshot`]: FeatureReactiveGrid::snapshot
pub struct FeatureReactiveGrid {
    tx: mpsc::UnboundedSender<GridMessage>,
    ticks: Arc<TickSlot>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for FeatureReactiveGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureReactiveGrid")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl FeatureReactiveGrid {
    /// Wire a grid to `media`, `analyzer` and the tick events of `emitter`.
    ///
    /// The grid starts inactive and activates on the next `Play` signal.
    /// Fails on an invalid configuration or outside a tokio runtime.
    pub fn initialize(
        config: GridConfig,
        surface: Option<Box<dyn ChannelSurface>>,
        media: MediaHandle,
        analyzer: Box<dyn AudioAnalyzer>,
        emitter: &Emitter,
    ) -> Result<Self> {
        let grid = ReactiveGrid::new(config)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ControlError::NoRuntime(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let owner = OwnerTag::next();

        let ticks = Arc::new(TickSlot::default());
        let tick_tx = tx.clone();
        let tick_slot = ticks.clone();
        emitter.on(
            TICK_EVENT,
            move |timestamp| tick_slot.offer(&tick_tx, timestamp),
            owner,
        );

        if surface.is_none() {
            warn!("FeatureReactiveGrid: no output surface bound, updates will be skipped");
        }
        info!("FeatureReactiveGrid: initialized on '{}'", media.name());

        let mut worker = GridWorker {
            grid,
            surface,
            media,
            analyzer: Some(analyzer),
            emitter: emitter.clone(),
            owner,
            tx: tx.clone(),
            ticks: ticks.clone(),
            connection: 0,
            pulse_generation: 0,
            pulse_timer: None,
        };
        worker.attach();

        let task = runtime.spawn(worker.run(rx));
        Ok(Self {
            tx,
            ticks,
            task: Some(task),
        })
    }

    /// Recompute and publish every channel as of `tick_time`.
    ///
    /// Merges with a tick that is still queued.
    pub fn update_grid(&self, tick_time: f64) {
        self.ticks.offer(&self.tx, tick_time);
    }

    /// Set (`magnitude > 0`) or clear the pulse effect.
    ///
    /// A positive pulse expires after the configured duration unless
    /// superseded.
    pub fn pulse(&self, magnitude: f32) {
        let _ = self.tx.send(GridMessage::Pulse(magnitude));
    }

    /// Detach from the current media, rebind the analyzer to `media` and
    /// reset. The grid stays inactive until `media` signals `Play`.
    pub fn connect_audio(&self, media: MediaHandle) {
        let _ = self.tx.send(GridMessage::ConnectAudio(media));
    }

    /// State after every previously queued message has been applied.
    ///
    /// `None` once disposed.
    pub async fn snapshot(&self) -> Option<GridSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(GridMessage::Snapshot(reply)).ok()?;
        rx.await.ok()
    }

    /// Wait until every previously queued message has been applied.
    ///
    /// Returns false once disposed.
    pub async fn flush(&self) -> bool {
        self.snapshot().await.is_some()
    }

    /// Release all subscriptions, cancel the pulse timer and reset.
    ///
    /// When this returns the engine writes nothing further. Calling it again
    /// is a no-op.
    pub async fn dispose(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.tx.send(GridMessage::Dispose);
        if let Err(e) = task.await {
            warn!("FeatureReactiveGrid: worker ended abnormally: {}", e);
        }
    }

    /// Whether `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for FeatureReactiveGrid {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.tx.send(GridMessage::Dispose);
        }
    }
}
