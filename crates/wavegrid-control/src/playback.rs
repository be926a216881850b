//! Playable media handle and its lifecycle signals.

use crate::emitter::OwnerTag;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Playback lifecycle signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end
    Ended,
}

type PlaybackListener = Arc<dyn Fn(PlaybackEvent) + Send + Sync>;

struct MediaInner {
    id: u64,
    name: String,
    playing: AtomicBool,
    listeners: Mutex<Vec<(OwnerTag, PlaybackListener)>>,
}

/// Shared handle to a playable media element. Clones refer to the same media.
#[derive(Clone)]
pub struct MediaHandle {
    inner: Arc<MediaInner>,
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("playing", &self.is_playing())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl MediaHandle {
    /// Create a paused media handle
    pub fn new(name: impl Into<String>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            inner: Arc::new(MediaInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                name: name.into(),
                playing: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Process-unique id
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the last signal was `Play`
    pub fn is_playing(&self) -> bool {
        self.inner.playing.load(Ordering::SeqCst)
    }

    /// Listen for lifecycle signals on behalf of `owner`.
    pub fn add_listener<F>(&self, owner: OwnerTag, listener: F)
    where
        F: Fn(PlaybackEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.lock().push((owner, Arc::new(listener)));
    }

    /// Remove every listener `owner` installed. Returns true if any existed.
    pub fn remove_listener(&self, owner: OwnerTag) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(tag, _)| *tag != owner);
        listeners.len() != before
    }

    /// Number of installed listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Signal `Play`
    pub fn play(&self) {
        self.signal(PlaybackEvent::Play);
    }

    /// Signal `Pause`
    pub fn pause(&self) {
        self.signal(PlaybackEvent::Pause);
    }

    /// Signal `Ended`
    pub fn end(&self) {
        self.signal(PlaybackEvent::Ended);
    }

    fn signal(&self, event: PlaybackEvent) {
        self.inner
            .playing
            .store(event == PlaybackEvent::Play, Ordering::SeqCst);
        let listeners: Vec<PlaybackListener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        debug!(
            "Media '{}': {:?} -> {} listeners",
            self.inner.name,
            event,
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_reach_listeners() {
        let media = MediaHandle::new("track-a");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let owner = OwnerTag::next();
        media.add_listener(owner, move |e| sink.lock().push(e));

        media.play();
        assert!(media.is_playing());
        media.pause();
        media.end();
        assert!(!media.is_playing());

        assert_eq!(
            *seen.lock(),
            vec![PlaybackEvent::Play, PlaybackEvent::Pause, PlaybackEvent::Ended]
        );

        assert!(media.remove_listener(owner));
        media.play();
        assert_eq!(seen.lock().len(), 3);
    }

    #[test]
    fn test_clones_share_identity() {
        let media = MediaHandle::new("track-b");
        let clone = media.clone();
        clone.add_listener(OwnerTag::next(), |_| {});
        assert_eq!(media.listener_count(), 1);
        assert_eq!(media.id(), clone.id());
        assert_ne!(media.id(), MediaHandle::new("track-b").id());
    }
}
