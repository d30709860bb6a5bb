//! Raw MIDI bytes to engine events and back

use wanderer_core::{EventKind, MidiEvent, Result, WandererError};

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const PROGRAM_CHANGE: u8 = 0xC0;
const CHANNEL_PRESSURE: u8 = 0xD0;
const SYSTEM: u8 = 0xF0;

/// A message as it came off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub bytes: Vec<u8>,
    pub timestamp_us: u64,
}

impl RawMessage {
    pub fn new(bytes: impl Into<Vec<u8>>, timestamp_us: u64) -> Self {
        Self { bytes: bytes.into(), timestamp_us }
    }
}

fn data_len(status: u8) -> usize {
    match status & 0xF0 {
        PROGRAM_CHANGE | CHANNEL_PRESSURE => 1,
        _ => 2,
    }
}

/// Decode a single channel voice message. System messages and running status
/// are not supported; a buffer holding more than one message is rejected so
/// the caller can forward it whole.
pub fn decode(bytes: &[u8], timestamp_us: u64) -> Result<MidiEvent> {
    let (&status, data) = bytes.split_first().ok_or(WandererError::EmptyMessage)?;
    if status < 0x80 || status >= SYSTEM {
        return Err(WandererError::UnrecognizedStatus(status));
    }
    if data.len() < data_len(status) {
        return Err(WandererError::TruncatedMessage { status, len: bytes.len() });
    }
    if data.len() > data_len(status) {
        return Err(WandererError::TrailingData { status, len: bytes.len() });
    }

    let kind = match status & 0xF0 {
        NOTE_OFF => EventKind::NoteOff,
        NOTE_ON => EventKind::NoteOn,
        _ => EventKind::Other { status },
    };
    Ok(MidiEvent {
        channel: status & 0x0F,
        note: data[0] as i32,
        velocity: data.get(1).copied().unwrap_or(0),
        kind,
        timestamp_us,
    })
}

/// Encode an event. Notes outside `0..=127` are clamped on the wire.
pub fn encode(event: &MidiEvent) -> Vec<u8> {
    let status = match event.kind {
        EventKind::NoteOff => NOTE_OFF | (event.channel & 0x0F),
        EventKind::NoteOn => NOTE_ON | (event.channel & 0x0F),
        EventKind::Other { status } => status,
    };
    let note = event.note.clamp(0, 127) as u8;
    let mut bytes = vec![status, note, event.velocity & 0x7F];
    bytes.truncate(1 + data_len(status));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use wanderer_core::ErrorKind;

    #[test]
    fn test_decode_notes() {
        let on = decode(&[0x91, 60, 100], 5).unwrap();
        assert_eq!(on, MidiEvent::note_on(1, 60, 100).with_timestamp(5));

        let off = decode(&[0x8F, 72, 64], 0).unwrap();
        assert_eq!(off.kind, EventKind::NoteOff);
        assert_eq!(off.channel, 15);
        assert_eq!(off.velocity, 64);
    }

    #[test]
    fn test_decode_other() {
        let cc = decode(&[0xB3, 7, 90], 0).unwrap();
        assert_eq!(cc.kind, EventKind::Other { status: 0xB3 });
        assert_eq!(cc.channel, 3);
        assert_eq!(encode(&cc), vec![0xB3, 7, 90]);

        let program = decode(&[0xC0, 12], 0).unwrap();
        assert_eq!(program.note, 12);
        assert_eq!(encode(&program), vec![0xC0, 12]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode(&[], 0), Err(WandererError::EmptyMessage)));
        assert!(matches!(decode(&[0xF8], 0), Err(WandererError::UnrecognizedStatus(0xF8))));
        assert!(matches!(decode(&[0x40, 1], 0), Err(WandererError::UnrecognizedStatus(0x40))));
        let truncated = decode(&[0x90, 60], 0).unwrap_err();
        assert_eq!(truncated.kind(), ErrorKind::Protocol);
        assert!(matches!(
            decode(&[0x90, 60, 100, 62, 100], 0),
            Err(WandererError::TrailingData { status: 0x90, len: 5 })
        ));
        assert!(matches!(
            decode(&[0xC0, 12, 13], 0),
            Err(WandererError::TrailingData { status: 0xC0, len: 3 })
        ));
    }

    #[test]
    fn test_encode_clamps_note() {
        assert_eq!(encode(&MidiEvent::note_on(2, 140, 100)), vec![0x92, 127, 100]);
        assert_eq!(encode(&MidiEvent::note_off(0, -3)), vec![0x80, 0, 0]);
    }
}
