//! Note events as seen by the engine

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    /// Any other channel message, carried through untouched
    Other { status: u8 },
}

/// A MIDI event for note transformation
///
/// For [`EventKind::Other`] the `note` and `velocity` fields hold the two raw
/// data bytes. `timestamp_us` is opaque to the engine and always echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    pub channel: u8,
    pub note: i32,
    pub velocity: u8,
    pub kind: EventKind,
    pub timestamp_us: u64,
}

impl MidiEvent {
    pub fn note_on(channel: u8, note: i32, velocity: u8) -> Self {
        Self { channel, note, velocity, kind: EventKind::NoteOn, timestamp_us: 0 }
    }

    pub fn note_off(channel: u8, note: i32) -> Self {
        Self { channel, note, velocity: 0, kind: EventKind::NoteOff, timestamp_us: 0 }
    }

    pub fn with_timestamp(self, timestamp_us: u64) -> Self {
        Self { timestamp_us, ..self }
    }

    pub fn class(&self) -> NoteClass {
        classify(self)
    }
}

/// Pairing role of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClass {
    Start,
    Stop,
    Other,
}

/// Note-on with zero velocity counts as a stop
pub fn classify(event: &MidiEvent) -> NoteClass {
    match event.kind {
        EventKind::NoteOn if event.velocity > 0 => NoteClass::Start,
        EventKind::NoteOn | EventKind::NoteOff => NoteClass::Stop,
        EventKind::Other { .. } => NoteClass::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(MidiEvent::note_on(0, 60, 100).class(), NoteClass::Start);
        assert_eq!(MidiEvent::note_on(0, 60, 0).class(), NoteClass::Stop);
        assert_eq!(MidiEvent::note_off(0, 60).class(), NoteClass::Stop);
        let cc = MidiEvent {
            channel: 0,
            note: 7,
            velocity: 64,
            kind: EventKind::Other { status: 0xB0 },
            timestamp_us: 0,
        };
        assert_eq!(cc.class(), NoteClass::Other);
    }
}
