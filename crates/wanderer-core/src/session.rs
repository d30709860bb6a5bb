//! Note session tracking
//!
//! Owns one harmonic processor per channel and remembers which note was
//! emitted for every sounding input note, so the matching stop turns off the
//! transposed note rather than the one that came in.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::event::{classify, MidiEvent, NoteClass};
use crate::processor::{HarmonicProcessor, ProcessorSnapshot};

/// Emitted notes wrap into `[0, NOTE_RANGE)`
pub const NOTE_RANGE: i32 = 127;

/// Wraparound range policy. Applied to both the emitted start and the stored
/// mapping, so a note's start and stop always carry the same value.
pub fn wrap_note(note: i32) -> i32 {
    note.rem_euclid(NOTE_RANGE)
}

/// Identity of a sounding note at the input boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteKey {
    pub channel: u8,
    pub note: i32,
}

impl NoteKey {
    pub fn of(event: &MidiEvent) -> Self {
        Self { channel: event.channel, note: event.note }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveNote {
    pub key: NoteKey,
    pub emitted: i32,
}

pub struct NoteSessionTracker {
    config: EngineConfig,
    processors: BTreeMap<u8, HarmonicProcessor>,
    active: HashMap<NoteKey, i32>,
}

impl NoteSessionTracker {
    /// Fails if the configuration cannot build a processor
    pub fn new(config: EngineConfig) -> Result<Self> {
        HarmonicProcessor::with_automaton(config.table_size, &config.automaton)?;
        Ok(Self {
            config,
            processors: BTreeMap::new(),
            active: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Transform one event. Never fails: anything that cannot be transformed
    /// is returned as it came in.
    pub fn handle(&mut self, event: MidiEvent) -> MidiEvent {
        match classify(&event) {
            NoteClass::Start => self.handle_start(event),
            NoteClass::Stop => self.handle_stop(event),
            NoteClass::Other => {
                trace!(channel = event.channel, kind = ?event.kind, "Passthrough");
                event
            }
        }
    }

    fn handle_start(&mut self, event: MidiEvent) -> MidiEvent {
        let key = NoteKey::of(&event);
        let output = match self.processor_for(event.channel).and_then(|p| p.process(event.note)) {
            Ok(output) => output,
            Err(e) => {
                warn!(channel = event.channel, note = event.note, error = %e, "Note passed through untransformed");
                self.active.remove(&key);
                return event;
            }
        };

        let emitted = wrap_note(output);
        if let Some(stale) = self.active.insert(key, emitted) {
            debug!(channel = key.channel, note = key.note, stale, "Replaced mapping of a note still sounding");
        }
        MidiEvent { note: emitted, ..event }
    }

    fn handle_stop(&mut self, event: MidiEvent) -> MidiEvent {
        match self.active.entry(NoteKey::of(&event)) {
            MapEntry::Occupied(e) => MidiEvent { note: e.remove(), ..event },
            MapEntry::Vacant(_) => {
                trace!(channel = event.channel, note = event.note, "Unmatched stop");
                event
            }
        }
    }

    fn processor_for(&mut self, channel: u8) -> Result<&mut HarmonicProcessor> {
        match self.processors.entry(channel) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let processor =
                    HarmonicProcessor::with_automaton(self.config.table_size, &self.config.automaton)?;
                debug!(channel, "Created harmonic processor");
                Ok(e.insert(processor))
            }
        }
    }

    /// Forget every sounding note and restart every channel's automaton
    pub fn reset(&mut self) {
        self.active.clear();
        for processor in self.processors.values_mut() {
            processor.reset();
        }
        info!(channels = self.processors.len(), "Session reset");
    }

    /// Sounding notes, ordered by key
    pub fn active_notes(&self) -> Vec<ActiveNote> {
        let mut notes: Vec<ActiveNote> = self
            .active
            .iter()
            .map(|(&key, &emitted)| ActiveNote { key, emitted })
            .collect();
        notes.sort_by_key(|n| n.key);
        notes
    }

    /// Drop every mapping and return a stop for each emitted note
    pub fn release_all(&mut self) -> Vec<MidiEvent> {
        let released: Vec<MidiEvent> = self
            .active_notes()
            .into_iter()
            .map(|n| MidiEvent::note_off(n.key.channel, n.emitted))
            .collect();
        self.active.clear();
        released
    }

    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.processors.keys().copied()
    }

    pub fn observe(&self, channel: u8) -> Option<ProcessorSnapshot> {
        self.processors.get(&channel).map(HarmonicProcessor::snapshot)
    }

    pub fn observe_all(&self) -> Vec<(u8, ProcessorSnapshot)> {
        self.processors.iter().map(|(&ch, p)| (ch, p.snapshot())).collect()
    }
}
