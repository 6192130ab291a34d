//! Callback channels consumed by front ends

use std::fmt;
use std::sync::{Arc, Mutex};

/// Whether the client is busy with a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// A transfer is active
    Dealing,
    /// Idle
    Ready,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientStatus::Dealing => write!(f, "DEALING"),
            ClientStatus::Ready => write!(f, "READY"),
        }
    }
}

/// Receives human-readable progress lines
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

/// Receives status transitions
pub trait StatusSink: Send + Sync {
    fn status_changed(&self, status: ClientStatus);
}

impl<F> StatusSink for F
where
    F: Fn(ClientStatus) + Send + Sync,
{
    fn status_changed(&self, status: ClientStatus) {
        self(status)
    }
}

/// Shared handle to a [`LogSink`]
///
/// Calls into the sink are serialized, so lines from concurrent sessions
/// arrive whole and one at a time. Every line is mirrored to the `log`
/// facade at debug level.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Mutex<Box<dyn LogSink>>>,
}

impl Logger {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Logger that only feeds the `log` facade
    pub fn silent() -> Self {
        Self::new(|_: &str| {})
    }

    pub fn line(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        log::debug!(target: "tftpc", "{}", line);
        // A panicking sink must not silence every other session
        let sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        sink.log(line);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
