//! Structured event stream.
//!
//! Discrete, typed events emitted while planning and applying. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a plan or apply run.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A change was planned for an instance.
    PlanComputed {
        /// When the plan was computed.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
        /// `create`, `update`, `no-op` or `delete`.
        action: String,
        /// Phase before apply.
        from: Option<String>,
        /// Phase after apply.
        to: Option<String>,
    },

    /// Planning failed for an instance.
    PlanBlocked {
        /// When planning failed.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
        /// Diagnostic detail.
        detail: String,
    },

    /// An instance was created in state.
    ResourceCreated {
        /// When the state was written.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
        /// Seeded phase.
        phase: String,
    },

    /// An instance's stored state changed.
    PhaseAdvanced {
        /// When the state was written.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
        /// Phase before apply.
        from: String,
        /// Phase after apply.
        to: String,
    },

    /// An instance was imported.
    ResourceImported {
        /// When the import happened.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
        /// Imported phase.
        phase: String,
    },

    /// An instance was removed from state.
    ResourceDeleted {
        /// When the state was removed.
        timestamp: DateTime<Utc>,
        /// Resource address.
        address: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are silently dropped: a broken event sink
/// must never fail a plan or apply.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    #[test]
    fn emits_jsonl_with_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let emitter = EventEmitter::from_file(&path).unwrap();

        emitter.emit(Event::ResourceImported {
            timestamp: Utc::now(),
            address: "phaser_sequential.a".to_string(),
            phase: "prepare".to_string(),
        });
        emitter.emit(Event::ResourceDeleted {
            timestamp: Utc::now(),
            address: "phaser_sequential.a".to_string(),
        });
        assert_eq!(emitter.count(), 2);
        drop(emitter);

        let file = std::fs::File::open(&path).unwrap();
        let lines: Vec<serde_json::Value> = std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[0]["type"], "ResourceImported");
        assert_eq!(lines[0]["phase"], "prepare");
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["type"], "ResourceDeleted");
    }

    #[test]
    fn noop_counts_but_discards() {
        let emitter = EventEmitter::noop();
        emitter.emit(Event::PlanBlocked {
            timestamp: Utc::now(),
            address: "x".to_string(),
            detail: "d".to_string(),
        });
        assert_eq!(emitter.count(), 1);
    }
}
