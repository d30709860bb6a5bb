//! Virtual MIDI ports through midir

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use midir::os::unix::{VirtualInput, VirtualOutput};
use midir::{MidiInput, MidiInputConnection, MidiOutput};
use thiserror::Error;
use tracing::{info, warn};

use crate::codec::RawMessage;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MIDI init failed: {0}")]
    Init(String),
    #[error("Failed to create virtual port '{port}': {reason}")]
    Connect { port: String, reason: String },
}

/// A virtual input feeding the dispatch channel and a virtual output drained
/// from the engine's outbound channel
pub struct VirtualPorts {
    input: Option<MidiInputConnection<()>>,
    output_thread: Option<JoinHandle<()>>,
}

impl VirtualPorts {
    pub fn open(
        input_name: &str,
        output_name: &str,
        inbound: Sender<RawMessage>,
        outbound: Receiver<Vec<u8>>,
    ) -> Result<Self, TransportError> {
        let midi_out = MidiOutput::new("wanderer-out").map_err(|e| TransportError::Init(e.to_string()))?;
        let mut conn_out = midi_out.create_virtual(output_name).map_err(|e| TransportError::Connect {
            port: output_name.to_string(),
            reason: e.to_string(),
        })?;

        let midi_in = MidiInput::new("wanderer-in").map_err(|e| TransportError::Init(e.to_string()))?;
        let conn_in = midi_in
            .create_virtual(
                input_name,
                move |timestamp_us, message, _| {
                    let _ = inbound.send(RawMessage::new(message, timestamp_us));
                },
                (),
            )
            .map_err(|e| TransportError::Connect {
                port: input_name.to_string(),
                reason: e.to_string(),
            })?;

        // Runs until every outbound sender is dropped, so the final
        // note-off sweep still reaches the port
        let output_thread = thread::spawn(move || {
            while let Ok(bytes) = outbound.recv() {
                if let Err(e) = conn_out.send(&bytes) {
                    warn!(error = %e, "MIDI send failed");
                }
            }
            conn_out.close();
        });

        info!(input = input_name, output = output_name, "Virtual ports open");
        Ok(Self { input: Some(conn_in), output_thread: Some(output_thread) })
    }

    /// Stop accepting input. Dropping the input callback releases its
    /// inbound sender.
    pub fn close_input(&mut self) {
        if let Some(conn) = self.input.take() {
            conn.close();
            info!("Virtual input closed");
        }
    }

    /// Close the input and wait for the output to flush
    pub fn finish(mut self) {
        self.close_input();
        if let Some(handle) = self.output_thread.take() {
            let _ = handle.join();
        }
        info!("Virtual output closed");
    }
}
