//! Background dispatch loop: raw input -> engine -> raw output

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::{debug, info, warn};
use wanderer_core::{MidiEvent, NoteClass, ProcessorSnapshot};

use crate::codec::{self, RawMessage};
use crate::engine::Engine;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Dispatcher not running")]
    NotRunning,
    #[error("Dispatch thread panicked")]
    ThreadPanicked,
}

/// One transformed note, reported to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub input: MidiEvent,
    pub output: MidiEvent,
    pub snapshot: Option<ProcessorSnapshot>,
}

impl Activity {
    pub fn is_start(&self) -> bool {
        self.input.class() == NoteClass::Start
    }
}

/// Run one raw message through the engine.
///
/// Returns the bytes to send and, for note events, what happened to them.
/// Messages the codec rejects are forwarded unchanged.
pub fn process_message(engine: &Engine, message: &RawMessage) -> (Vec<u8>, Option<Activity>) {
    let input = match codec::decode(&message.bytes, message.timestamp_us) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Forwarding undecoded message");
            return (message.bytes.clone(), None);
        }
    };

    if input.class() == NoteClass::Other {
        return (codec::encode(&engine.handle(input)), None);
    }

    let (output, snapshot) = engine.handle_observed(input);
    (codec::encode(&output), Some(Activity { input, output, snapshot }))
}

pub struct Dispatcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl Dispatcher {
    /// Spawn the dispatch thread.
    ///
    /// The thread stops when [`Dispatcher::stop`] is called or every inbound
    /// sender is gone. Before exiting it drains what is still queued and
    /// sends a stop for every note left sounding.
    pub fn start(
        engine: Engine,
        inbound: Receiver<RawMessage>,
        outbound: Sender<Vec<u8>>,
        activity: Option<Sender<Activity>>,
        poll_interval: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::spawn(move || {
            Self::process_loop(engine, inbound, outbound, activity, flag, poll_interval)
        });

        info!("Dispatcher started");
        Self { running, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the thread and return how many messages it processed
    pub fn stop(&mut self) -> Result<u64, DispatchError> {
        let handle = self.handle.take().ok_or(DispatchError::NotRunning)?;
        self.running.store(false, Ordering::SeqCst);
        let processed = handle.join().map_err(|_| DispatchError::ThreadPanicked)?;
        info!(processed, "Dispatcher stopped");
        Ok(processed)
    }

    fn process_loop(
        engine: Engine,
        inbound: Receiver<RawMessage>,
        outbound: Sender<Vec<u8>>,
        activity: Option<Sender<Activity>>,
        running: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> u64 {
        let mut processed = 0u64;
        let mut forward = |message: RawMessage| {
            let (bytes, report) = process_message(&engine, &message);
            if outbound.send(bytes).is_err() {
                warn!("Output closed, dropping message");
            }
            if let (Some(tx), Some(report)) = (&activity, report) {
                // Display lagging behind must not stall the stream
                let _ = tx.try_send(report);
            }
            processed += 1;
        };

        while running.load(Ordering::SeqCst) {
            match inbound.recv_timeout(poll_interval) {
                Ok(message) => forward(message),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for message in inbound.try_iter() {
            forward(message);
        }

        let released = engine.release_all();
        if !released.is_empty() {
            info!(notes = released.len(), "Releasing sounding notes");
        }
        for event in released {
            let _ = outbound.send(codec::encode(&event));
        }

        processed
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
