//! Built-in phrase fed through the engine when no MIDI ports are available

use wanderer_services::RawMessage;

/// Broken C major chord on channel 0 answered by a fifth on channel 1, with a
/// mod wheel move in between. Some releases use note-on with zero velocity.
pub(crate) fn phrase() -> Vec<RawMessage> {
    let mut messages = Vec::new();
    let mut t = 0u64;
    let mut push = |bytes: [u8; 3]| {
        messages.push(RawMessage::new(bytes, t));
        t += 125_000;
    };

    for note in [60, 64, 67, 72] {
        push([0x90, note, 96]);
        push([0x80, note, 0]);
    }
    push([0xB0, 1, 64]);
    for note in [55, 62] {
        push([0x91, note, 80]);
    }
    for note in [55, 62] {
        push([0x91, note, 0]);
    }
    messages
}
