//! Tracks how many lines are waiting for a writer thread and tells producers
//! when to throttle.
//!
//! Listeners run on a notifier thread of their own: never under the queue lock
//! and never on the writer thread, so a listener may call `flush()` or
//! `write()` on the output that signalled it.

use super::lock;
use crate::internal;
use std::cell::Cell;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Signal sent to the owner of a file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backpressure {
    /// The queue reached its high-water mark.
    Pause,
    /// The writer drained the queue.
    Resume,
}

pub type PressureListener = Arc<dyn Fn(Backpressure) + Send + Sync>;

pub(crate) struct Gauge {
    queued: AtomicUsize,
    dropped: AtomicUsize,
    paused: AtomicBool,
    high_water: usize,
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("queued", &self.queued)
            .field("dropped", &self.dropped)
            .field("paused", &self.paused)
            .field("high_water", &self.high_water)
            .finish()
    }
}

impl Gauge {
    pub(crate) fn new(high_water: usize) -> Self {
        Self {
            queued: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            high_water: high_water.max(1),
        }
    }

    /// Counts a line handed to the queue. Returns `Pause` the first time the
    /// high-water mark is reached.
    pub(crate) fn enqueued(&self) -> Option<Backpressure> {
        let queued = self.queued.fetch_add(1, Ordering::AcqRel) + 1;
        if queued >= self.high_water && !self.paused.swap(true, Ordering::AcqRel) {
            internal::trace("FILE", &format!("pausing at {queued} queued lines"));
            return Some(Backpressure::Pause);
        }
        None
    }

    /// Undoes `enqueued` for a line the queue refused.
    pub(crate) fn rejected(&self) {
        self.queued.fetch_sub(1, Ordering::AcqRel);
        self.dropped.fetch_add(1, Ordering::AcqRel);
    }

    /// Counts a line taken off the queue; returns whether the queue is now empty.
    pub(crate) fn dequeued(&self) -> bool {
        self.queued.fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Leaves the paused state if nothing is queued. Returns the lines dropped
    /// meanwhile; the caller owes a `Resume`.
    pub(crate) fn settle(&self) -> Option<usize> {
        if self.queued.load(Ordering::Acquire) != 0 || !self.paused.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(self.dropped.swap(0, Ordering::AcqRel))
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

enum Note {
    Signal(Backpressure),
    Sync(SyncSender<()>),
}

thread_local! {
    static IN_LISTENER: Cell<bool> = const { Cell::new(false) };
}

/// Sending half of a notifier, cloned into the writer thread.
#[derive(Clone)]
pub(crate) struct Signals(Sender<Note>);

impl Signals {
    pub(crate) fn send(&self, signal: Backpressure) {
        // A gone notifier means the output is shutting down.
        let _ = self.0.send(Note::Signal(signal));
    }
}

/// Delivers signals to one listener, in order, on a dedicated thread.
pub(crate) struct Notifier {
    signals: Mutex<Option<Signals>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Notifier {
    pub(crate) fn spawn(name: String, listener: PressureListener) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Note>();
        let handle = thread::Builder::new().name(name).spawn(move || {
            IN_LISTENER.with(|flag| flag.set(true));
            for note in receiver {
                match note {
                    Note::Signal(signal) => listener(signal),
                    Note::Sync(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        })?;
        Ok(Self {
            signals: Mutex::new(Some(Signals(sender))),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn signals(&self) -> Option<Signals> {
        lock(&self.signals).clone()
    }

    pub(crate) fn send(&self, signal: Backpressure) {
        if let Some(signals) = lock(&self.signals).as_ref() {
            signals.send(signal);
        }
    }

    fn in_listener() -> bool {
        IN_LISTENER.with(Cell::get)
    }

    /// Waits until every signal sent so far has been handled. Returns at once
    /// when called from any listener.
    pub(crate) fn sync(&self) {
        if Self::in_listener() {
            return;
        }
        let Some(Signals(sender)) = self.signals() else {
            return;
        };
        let (ack, done) = mpsc::sync_channel(1);
        if sender.send(Note::Sync(ack)).is_ok() {
            drop(sender);
            let _ = done.recv();
        }
    }

    /// Stops accepting signals and waits for the pending ones, unless called
    /// from a listener.
    pub(crate) fn close(&self) {
        lock(&self.signals).take();
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle
            && !Self::in_listener()
            && handle.join().is_err()
        {
            internal::error("FILE", "backpressure listener panicked");
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("open", &lock(&self.signals).is_some())
            .finish_non_exhaustive()
    }
}
