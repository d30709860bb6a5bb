//! wanderer-core: Note transformation engine
//!
//! A counting automaton picks a harmonic for every note-start; the session
//! tracker remembers what it emitted so the matching note-stop turns off the
//! right note.

pub mod automaton;
mod config;
mod error;
mod event;
pub mod harmonics;
pub mod processor;
pub mod session;

pub use automaton::{CountingAutomaton, Operator, State, STATE_COUNT};
pub use config::{AutomatonConfig, EngineConfig, StateConfig};
pub use error::{ErrorKind, Result, WandererError};
pub use event::{classify, EventKind, MidiEvent, NoteClass};
pub use harmonics::HarmonicTable;
pub use processor::{floor_mod, HarmonicProcessor, ProcessorSnapshot};
pub use session::{wrap_note, ActiveNote, NoteKey, NoteSessionTracker, NOTE_RANGE};
