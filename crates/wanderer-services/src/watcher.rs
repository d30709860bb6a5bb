//! Polling file watcher that triggers an engine reset on change

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Watcher not running")]
    NotRunning,
    #[error("Watcher thread panicked")]
    ThreadPanicked,
}

/// Modification time and length, or `None` if the file is missing
type Fingerprint = Option<(SystemTime, u64)>;

fn fingerprint(path: &Path) -> Fingerprint {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

pub struct SourceWatcher {
    paths: Vec<PathBuf>,
    fingerprints: Vec<Fingerprint>,
}

impl SourceWatcher {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let fingerprints = paths.iter().map(|p| fingerprint(p)).collect();
        Self { paths, fingerprints }
    }

    /// Paths whose fingerprint changed since the last poll, including files
    /// that appeared or disappeared
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        for (path, last) in self.paths.iter().zip(self.fingerprints.iter_mut()) {
            let current = fingerprint(path);
            if current != *last {
                *last = current;
                changed.push(path.clone());
            }
        }
        changed
    }

    /// Poll every `interval` on a background thread, calling `on_change` for
    /// each changed path
    pub fn spawn<F>(mut self, interval: Duration, mut on_change: F) -> WatchHandle
    where
        F: FnMut(&Path) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(0);

        for path in &self.paths {
            info!(path = %path.display(), "Watching");
        }

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    for path in self.poll() {
                        info!(path = %path.display(), "Source changed");
                        on_change(&path);
                    }
                }
                _ => break,
            }
        });

        WatchHandle { stop_tx: Some(stop_tx), handle: Some(handle) }
    }
}

pub struct WatchHandle {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(&mut self) -> Result<(), WatchError> {
        let handle = self.handle.take().ok_or(WatchError::NotRunning)?;
        // Disconnecting wakes the thread immediately
        self.stop_tx.take();
        handle.join().map_err(|_| WatchError::ThreadPanicked)?;
        info!("Watcher stopped");
        Ok(())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_poll_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let watched = dir.path().join("config.toml");
        let absent = dir.path().join("later.toml");
        fs::write(&watched, "a").unwrap();

        let mut watcher = SourceWatcher::new(vec![watched.clone(), absent.clone()]);
        assert!(watcher.poll().is_empty());

        fs::write(&watched, "abc").unwrap();
        assert_eq!(watcher.poll(), vec![watched.clone()]);
        assert!(watcher.poll().is_empty());

        fs::write(&absent, "x").unwrap();
        assert_eq!(watcher.poll(), vec![absent.clone()]);

        fs::remove_file(&watched).unwrap();
        assert_eq!(watcher.poll(), vec![watched]);
    }

    #[test]
    fn test_spawned_watcher_calls_back() {
        let dir = tempfile::tempdir().unwrap();
        let watched = dir.path().join("handler.toml");
        fs::write(&watched, "a").unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut handle = SourceWatcher::new(vec![watched.clone()])
            .spawn(Duration::from_millis(5), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        fs::write(&watched, "abcd").unwrap();
        for _ in 0..400 {
            if hits.load(Ordering::SeqCst) > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        handle.stop().unwrap();
        assert!(!handle.is_running());
        // A poll can land between truncate and write, so one write may count twice
        assert!(hits.load(Ordering::SeqCst) >= 1);
    }
}
