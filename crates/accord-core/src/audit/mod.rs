//! Append-only audit trail for commit and verify events.
//!
//! The sink is an explicitly constructed component injected into the
//! engine, never ambient global state. Recording is best-effort: a sink
//! must not be able to abort the protocol because of a logging failure.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Severity of an audit event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditLevel::Info => write!(f, "INFO"),
            AuditLevel::Warning => write!(f, "WARNING"),
        }
    }
}

/// Sink for audit events.
///
/// `record` never fails and never panics; a sink that cannot write drops
/// the event.
pub trait AuditSink: Send + Sync {
    fn record(&self, level: AuditLevel, message: &str);
}

/// File-backed audit sink.
///
/// Opens the file in append mode once at construction and holds it for
/// the process lifetime. Writes are serialized behind a mutex so events
/// from the timeout path and the commit/verify path cannot interleave
/// within a line.
pub struct FileAudit {
    file: Mutex<Option<File>>,
}

impl FileAudit {
    /// Open (or create) the audit file. If the file cannot be opened the
    /// sink is disabled and every record is dropped.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .ok();
        Self {
            file: Mutex::new(file),
        }
    }
}

impl AuditSink for FileAudit {
    fn record(&self, level: AuditLevel, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{timestamp} {level} {message}");
        }
    }
}

/// In-memory capture sink for tests.
#[derive(Default)]
pub struct MemoryAudit {
    events: Mutex<Vec<(AuditLevel, String)>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, in order.
    pub fn events(&self) -> Vec<(AuditLevel, String)> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of events whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.events()
            .iter()
            .filter(|(_, m)| m.contains(needle))
            .count()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, level: AuditLevel, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, message.to_string()));
        }
    }
}
