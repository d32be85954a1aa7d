use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::trace::trace::TraceEvent;

/// Append-only JSONL sink for fill-pipeline trace events.
///
/// Tracing is diagnostics, never control flow: construction cannot fail,
/// and every write error downgrades to a warning on stderr so a broken
/// trace file can never break a fill.
pub struct TraceLogger {
    sink: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                sink: Some(Mutex::new(file)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self::disabled()
            }
        }
    }

    /// A logger that swallows everything. Scenario runs and tests use
    /// this so tracing never touches the filesystem.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn log(&self, event: &TraceEvent) {
        let sink = match &self.sink {
            Some(sink) => sink,
            None => return,
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace event: {}", e);
                return;
            }
        };

        match sink.lock() {
            Ok(mut file) => {
                if let Err(e) = writeln!(file, "{}", line) {
                    eprintln!("Warning: failed to write trace event: {}", e);
                }
            }
            Err(e) => eprintln!("Warning: trace logger lock poisoned: {}", e),
        }
    }
}
