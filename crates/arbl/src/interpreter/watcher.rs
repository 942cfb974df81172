//! Filesystem watching with per-path debouncing.
//!
//! A [`notify`] watcher forwards `*.arb` events over a channel to a worker
//! thread. The worker coalesces bursts for the same path with a
//! [`Debouncer`] and calls the change handler once the path has been quiet
//! for the debounce window.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use crate::interpreter::WatchError;

/// Coalesces change notifications per path.
///
/// Each recorded path gets a deadline one window after its most recent
/// event; it becomes ready once that deadline passes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: BTreeMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    /// Record an event for `path` at `now`, pushing its deadline back.
    pub fn record(&mut self, path: PathBuf, now: Instant) {
        self.pending.insert(path, now + self.window);
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every path whose deadline is at or before `now`,
    /// in path order.
    pub fn drain_ready(&mut self, now: Instant) -> Vec<PathBuf> {
        let ready: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        for path in &ready {
            self.pending.remove(path);
        }
        ready
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

enum WatchMessage {
    Changed(PathBuf),
    Stop,
}

enum Next {
    Message(WatchMessage),
    Tick,
    Closed,
}

/// A running directory watcher.
///
/// Stopping (explicitly or on drop) unsubscribes from the filesystem,
/// discards pending events and waits for the worker thread, so the change
/// handler is never called after [`HotReloadWatcher::stop`] returns. When
/// stopped from inside the handler itself the thread is left to finish on
/// its own.
pub struct HotReloadWatcher {
    directory: PathBuf,
    watcher: Option<RecommendedWatcher>,
    sender: Sender<WatchMessage>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl HotReloadWatcher {
    /// Start watching `directory` (non-recursively).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist, the notification
    /// backend cannot watch it, or the worker thread cannot be spawned.
    pub fn spawn(
        directory: &Path,
        debounce: Duration,
        on_change: impl Fn(&Path) + Send + 'static,
    ) -> Result<Self, WatchError> {
        if !directory.is_dir() {
            return Err(WatchError::MissingDirectory {
                path: Some(directory.to_path_buf()),
            });
        }

        let (sender, receiver) = mpsc::channel();
        let events = sender.clone();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => forward_event(&events, event),
                Err(err) => error!(error = %err, "file watcher error"),
            }
        })?;
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        let stopped = Arc::new(AtomicBool::new(false));
        let worker_stopped = Arc::clone(&stopped);
        let worker = thread::Builder::new()
            .name("arbl-hot-reload".to_string())
            .spawn(move || run_worker(&receiver, debounce, &worker_stopped, &on_change))
            .map_err(WatchError::Thread)?;

        info!(directory = %directory.display(), debounce_ms = debounce.as_millis(), "hot reload enabled");
        Ok(Self {
            directory: directory.to_path_buf(),
            watcher: Some(watcher),
            sender,
            stopped,
            worker: Some(worker),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop watching. Safe to call more than once.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stopped.store(true, Ordering::SeqCst);
        self.watcher = None;
        // The worker may already have exited; a closed channel is fine.
        let _ = self.sender.send(WatchMessage::Stop);
        if worker.thread().id() != thread::current().id() && worker.join().is_err() {
            error!("hot reload thread panicked");
        }
        info!(directory = %self.directory.display(), "hot reload disabled");
    }
}

impl Drop for HotReloadWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn forward_event(sender: &Sender<WatchMessage>, event: Event) {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }
    for path in event.paths.into_iter().filter(|path| is_arb(path)) {
        let _ = sender.send(WatchMessage::Changed(path));
    }
}

fn is_arb(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "arb")
}

fn next_message(receiver: &Receiver<WatchMessage>, deadline: Option<Instant>) -> Next {
    match deadline {
        None => receiver.recv().map_or(Next::Closed, Next::Message),
        Some(deadline) => {
            match receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok(message) => Next::Message(message),
                Err(RecvTimeoutError::Timeout) => Next::Tick,
                Err(RecvTimeoutError::Disconnected) => Next::Closed,
            }
        }
    }
}

fn run_worker(
    receiver: &Receiver<WatchMessage>,
    debounce: Duration,
    stopped: &AtomicBool,
    on_change: &dyn Fn(&Path),
) {
    let mut debouncer = Debouncer::new(debounce);
    loop {
        match next_message(receiver, debouncer.next_deadline()) {
            Next::Message(WatchMessage::Changed(path)) => {
                debug!(path = %path.display(), "file change queued");
                debouncer.record(path, Instant::now());
            }
            Next::Message(WatchMessage::Stop) | Next::Closed => break,
            Next::Tick => {}
        }

        for path in debouncer.drain_ready(Instant::now()) {
            if stopped.load(Ordering::SeqCst) {
                debouncer.clear();
                return;
            }
            debug!(path = %path.display(), "debounced file change");
            on_change(&path);
        }
    }
    debug!(discarded = debouncer.len(), "hot reload thread exiting");
}
