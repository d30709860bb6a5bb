//! wanderer-services: Engine handle, MIDI transport, dispatch and display

pub mod codec;
pub mod dispatch;
pub mod engine;
#[cfg(all(feature = "midi-io", unix))]
pub mod ports;
pub mod presentation;
pub mod watcher;

pub use codec::{decode, encode, RawMessage};
pub use dispatch::{process_message, Activity, DispatchError, Dispatcher};
pub use engine::Engine;
#[cfg(all(feature = "midi-io", unix))]
pub use ports::{TransportError, VirtualPorts};
pub use presentation::{
    format_automaton, format_event, format_processor, pane_for_channel, DisplayLine,
    MarkupRenderer, Style,
};
pub use watcher::{SourceWatcher, WatchError, WatchHandle};
