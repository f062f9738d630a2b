//! Human-readable status lines.
//!
//! The core pushes one line per notable transition into a [`LogSink`]. The
//! shell decides how to keep them; [`LogHistory`] is the bounded rolling
//! history a typical shell shows (five most recent lines, newest first).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use crate::events::EngineEvent;

/// Default number of lines kept by [`LogHistory`].
pub const DEFAULT_LOG_CAPACITY: usize = 5;

/// Receiver of status lines produced by the core.
pub trait LogSink: Send + Sync {
    fn append_line(&self, message: &str);
}

/// Rolling history of at most `capacity` lines, newest first.
#[derive(Debug, Clone)]
pub struct LogHistory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for LogHistory {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    /// Adds a line at the front, dropping the oldest when full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_back();
        }
        self.lines.push_front(message.into());
    }

    /// Lines, newest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn newest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when any kept line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

/// A [`LogHistory`] that can be shared between the shell and the core.
#[derive(Debug, Clone, Default)]
pub struct SharedLogHistory {
    inner: Arc<Mutex<LogHistory>>,
}

impl SharedLogHistory {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Arc::new(Mutex::new(LogHistory::new(capacity))) }
    }

    /// Copy of the current history.
    pub fn snapshot(&self) -> LogHistory {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LogSink for SharedLogHistory {
    fn append_line(&self, message: &str) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).push(message);
    }
}

/// Fans status lines and engine events out to the sink, the `log` facade and
/// event subscribers.
#[derive(Clone)]
pub(crate) struct StatusReporter {
    sink: Arc<dyn LogSink>,
    mirror_to_log: bool,
    events: Option<broadcast::Sender<EngineEvent>>,
}

impl StatusReporter {
    pub(crate) fn new(
        sink: Arc<dyn LogSink>,
        mirror_to_log: bool,
        events: Option<broadcast::Sender<EngineEvent>>,
    ) -> Self {
        Self { sink, mirror_to_log, events }
    }

    pub(crate) fn line(&self, message: &str) {
        if self.mirror_to_log {
            log::info!(target: "surfacing", "{message}");
        }
        self.sink.append_line(message);
        self.emit(EngineEvent::LogLine(message.to_string()));
    }

    /// Having no subscribers is not an error.
    pub(crate) fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
