//! Shared engine handle for the dispatch thread and the reload watcher

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;
use wanderer_core::{
    ActiveNote, EngineConfig, MidiEvent, NoteSessionTracker, ProcessorSnapshot, Result,
};

/// Cloneable handle to one note session tracker.
///
/// Every call takes the lock once and releases it before returning, so a
/// reset from another thread lands between two events, never inside one.
#[derive(Clone)]
pub struct Engine {
    tracker: Arc<Mutex<NoteSessionTracker>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let tracker = NoteSessionTracker::new(config)?;
        info!(table_size = tracker.config().table_size, "Engine created");
        Ok(Self { tracker: Arc::new(Mutex::new(tracker)) })
    }

    // A panic while holding the lock leaves the tracker in a consistent state
    // between events, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, NoteSessionTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn handle(&self, event: MidiEvent) -> MidiEvent {
        self.lock().handle(event)
    }

    /// Handle an event and observe its channel under the same lock
    pub fn handle_observed(&self, event: MidiEvent) -> (MidiEvent, Option<ProcessorSnapshot>) {
        let mut tracker = self.lock();
        let output = tracker.handle(event);
        let snapshot = tracker.observe(event.channel);
        (output, snapshot)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn active_notes(&self) -> Vec<ActiveNote> {
        self.lock().active_notes()
    }

    pub fn release_all(&self) -> Vec<MidiEvent> {
        self.lock().release_all()
    }

    pub fn observe(&self, channel: u8) -> Option<ProcessorSnapshot> {
        self.lock().observe(channel)
    }

    pub fn observe_all(&self) -> Vec<(u8, ProcessorSnapshot)> {
        self.lock().observe_all()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_reset_from_another_thread() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let first = engine.handle(MidiEvent::note_on(0, 60, 100));
        engine.handle(MidiEvent::note_on(0, 61, 100));

        let remote = engine.clone();
        thread::spawn(move || remote.reset()).join().unwrap();

        assert!(engine.active_notes().is_empty());
        assert_eq!(engine.handle(MidiEvent::note_on(0, 60, 100)).note, first.note);
    }

    #[test]
    fn test_handle_observed() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let (out, snapshot) = engine.handle_observed(MidiEvent::note_on(4, 60, 100));
        assert_eq!(out.note, 96);
        let snapshot = snapshot.unwrap();
        assert_eq!(snapshot.last_index, Some(7));
        assert_eq!(engine.observe(4), Some(snapshot));
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let remote = engine.clone();
        let _ = thread::spawn(move || {
            let _guard = remote.lock();
            panic!("poison");
        })
        .join();

        engine.reset();
        assert_eq!(engine.handle(MidiEvent::note_on(0, 60, 100)).note, 96);
    }
}
