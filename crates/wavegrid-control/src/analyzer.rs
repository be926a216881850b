//! Audio analyzer collaborator
//!
//! The feature extractor itself lives outside this crate. Engines talk to it
//! through [`AudioAnalyzer`]; [`ScriptedAnalyzer`] is an implementation whose
//! frames and beats are pushed by the caller (synthetic feeds, tests).

use crate::playback::MediaHandle;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use wavegrid_core::FeatureFrame;

/// Event emitted by an analyzer
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerEvent {
    /// A new analysis frame
    Frame(FeatureFrame),
    /// A detected rhythmic onset; the payload carries at least `bass`
    Beat(FeatureFrame),
}

/// Callback receiving analyzer events
pub type AnalyzerListener = Arc<dyn Fn(AnalyzerEvent) + Send + Sync>;

/// Audio feature extractor bound to a media handle.
pub trait AudioAnalyzer: Send {
    /// Begin producing events
    fn start(&mut self);
    /// Stop producing events
    fn stop(&mut self);
    /// Rebind to different media
    fn connect_audio(&mut self, media: &MediaHandle);
    /// Install the single event listener, replacing any previous one
    fn subscribe(&mut self, listener: AnalyzerListener);
    /// Remove the event listener
    fn unsubscribe(&mut self);
    /// Release all resources; the analyzer is unusable afterwards
    fn dispose(&mut self);
}

/// Call counters of a [`ScriptedAnalyzer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerStats {
    /// Calls to `start`
    pub start_calls: usize,
    /// Calls to `stop`
    pub stop_calls: usize,
    /// Calls to `connect_audio`
    pub connect_calls: usize,
    /// Calls to `dispose`
    pub dispose_calls: usize,
    /// Name of the bound media
    pub media: Option<String>,
}

#[derive(Default)]
struct ScriptedState {
    running: bool,
    disposed: bool,
    listener: Option<AnalyzerListener>,
    stats: AnalyzerStats,
}

/// Analyzer driven by explicit `emit_*` calls.
///
/// Events are only delivered while started and subscribed, like a real
/// analyzer. Clones share state, so one clone can be given to an engine while
/// another feeds it.
#[derive(Clone, Default)]
pub struct ScriptedAnalyzer {
    state: Arc<Mutex<ScriptedState>>,
}

impl fmt::Debug for ScriptedAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ScriptedAnalyzer")
            .field("running", &state.running)
            .field("disposed", &state.disposed)
            .field("subscribed", &state.listener.is_some())
            .field("stats", &state.stats)
            .finish()
    }
}

impl ScriptedAnalyzer {
    /// Create an analyzer bound to `media`
    pub fn new(media: &MediaHandle) -> Self {
        let analyzer = Self::default();
        analyzer.state.lock().stats.media = Some(media.name().to_string());
        analyzer
    }

    /// Deliver a frame. Returns false if it was dropped.
    pub fn emit_frame(&self, frame: FeatureFrame) -> bool {
        self.emit(AnalyzerEvent::Frame(frame))
    }

    /// Deliver a beat. Returns false if it was dropped.
    pub fn emit_beat(&self, payload: FeatureFrame) -> bool {
        self.emit(AnalyzerEvent::Beat(payload))
    }

    fn emit(&self, event: AnalyzerEvent) -> bool {
        let listener = {
            let state = self.state.lock();
            if !state.running || state.disposed {
                trace!("ScriptedAnalyzer: dropping event while stopped");
                return false;
            }
            match &state.listener {
                Some(listener) => listener.clone(),
                None => return false,
            }
        };
        listener(event);
        true
    }

    /// Whether events are being produced
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Whether `dispose` was called
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Whether a listener is installed
    pub fn is_subscribed(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    /// Call counters
    pub fn stats(&self) -> AnalyzerStats {
        self.state.lock().stats.clone()
    }
}

impl AudioAnalyzer for ScriptedAnalyzer {
    fn start(&mut self) {
        let mut state = self.state.lock();
        state.stats.start_calls += 1;
        if !state.disposed {
            state.running = true;
        }
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.stats.stop_calls += 1;
        state.running = false;
    }

    fn connect_audio(&mut self, media: &MediaHandle) {
        let mut state = self.state.lock();
        debug!("ScriptedAnalyzer: connecting to '{}'", media.name());
        state.stats.connect_calls += 1;
        state.stats.media = Some(media.name().to_string());
        state.running = false;
    }

    fn subscribe(&mut self, listener: AnalyzerListener) {
        self.state.lock().listener = Some(listener);
    }

    fn unsubscribe(&mut self) {
        self.state.lock().listener = None;
    }

    fn dispose(&mut self) {
        let mut state = self.state.lock();
        state.stats.dispose_calls += 1;
        state.running = false;
        state.disposed = true;
        state.listener = None;
    }
}
