//! Global publish/subscribe for frame-clock events.
//!
//! Listeners are registered with an [`OwnerTag`] and removed by that tag,
//! so an engine can drop every handler it installed without keeping the
//! closures around.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

/// Name of the animation-frame event
pub const TICK_EVENT: &str = "tick";

/// Identifies the component that installed a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerTag(u64);

impl OwnerTag {
    /// Allocate a process-unique tag
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

type TickHandler = Arc<dyn Fn(f64) + Send + Sync>;

/// Event bus carrying timestamped events. Clones share listeners.
#[derive(Clone, Default)]
pub struct Emitter {
    listeners: Arc<Mutex<HashMap<String, Vec<(OwnerTag, TickHandler)>>>>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(event, handlers)| (event.as_str(), handlers.len()))
            .collect();
        f.debug_struct("Emitter").field("listeners", &counts).finish()
    }
}

impl Emitter {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event` on behalf of `owner`.
    pub fn on<F>(&self, event: &str, handler: F, owner: OwnerTag)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push((owner, Arc::new(handler)));
    }

    /// Remove every handler `owner` registered for `event`.
    ///
    /// Returns true if anything was removed.
    pub fn off(&self, event: &str, owner: OwnerTag) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(handlers) = listeners.get_mut(event) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(tag, _)| *tag != owner);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Deliver `timestamp` to every handler of `event`.
    ///
    /// Handlers run outside the lock and may call `on`/`off`. Returns the
    /// number of handlers invoked.
    pub fn emit(&self, event: &str, timestamp: f64) -> usize {
        let handlers: Vec<TickHandler> = match self.listeners.lock().get(event) {
            Some(handlers) => handlers.iter().map(|(_, h)| h.clone()).collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler(timestamp);
        }
        handlers.len()
    }

    /// Number of handlers registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }
}

/// Emit [`TICK_EVENT`] at a fixed cadence.
///
/// Timestamps are milliseconds since the ticker started. Late ticks are
/// skipped rather than bunched. Abort the returned handle to stop.
pub fn spawn_ticker(emitter: Emitter, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let timestamp = start.elapsed().as_secs_f64() * 1000.0;
            let delivered = emitter.emit(TICK_EVENT, timestamp);
            trace!("tick {:.1}ms -> {} listeners", timestamp, delivered);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_on_emit_off() {
        let emitter = Emitter::new();
        let owner = OwnerTag::next();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        emitter.on(TICK_EVENT, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }, owner);

        assert_eq!(emitter.emit(TICK_EVENT, 16.0), 1);
        assert_eq!(emitter.emit("other", 16.0), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(emitter.off(TICK_EVENT, owner));
        assert!(!emitter.off(TICK_EVENT, owner));
        assert_eq!(emitter.emit(TICK_EVENT, 32.0), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_only_removes_owner() {
        let emitter = Emitter::new();
        let a = OwnerTag::next();
        let b = OwnerTag::next();
        assert_ne!(a, b);

        emitter.on(TICK_EVENT, |_| {}, a);
        emitter.on(TICK_EVENT, |_| {}, b);
        emitter.on(TICK_EVENT, |_| {}, a);
        assert_eq!(emitter.listener_count(TICK_EVENT), 3);

        emitter.off(TICK_EVENT, a);
        assert_eq!(emitter.listener_count(TICK_EVENT), 1);
    }

    #[test]
    fn test_handler_can_unsubscribe_during_emit() {
        let emitter = Emitter::new();
        let owner = OwnerTag::next();
        let inner = emitter.clone();
        emitter.on(TICK_EVENT, move |_| {
            inner.off(TICK_EVENT, owner);
        }, owner);

        assert_eq!(emitter.emit(TICK_EVENT, 0.0), 1);
        assert_eq!(emitter.listener_count(TICK_EVENT), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_emits_timestamps() {
        let emitter = Emitter::new();
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let sink = stamps.clone();
        emitter.on(TICK_EVENT, move |t| sink.lock().push(t), OwnerTag::next());

        let ticker = spawn_ticker(emitter.clone(), Duration::from_millis(16));
        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.abort();

        let stamps = stamps.lock();
        assert!(stamps.len() >= 3, "got {:?}", *stamps);
        assert_eq!(stamps[0], 0.0);
        assert!(stamps.windows(2).all(|w| w[1] > w[0]));
    }
}
