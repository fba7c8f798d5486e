//! Append-only diagnostics log.
//!
//! Every state change in the shell is recorded as one human-readable line:
//!
//! ```text
//! [2025-03-14T09:26:53.589Z] Color picker window shown: color-picker.html, type: font
//! ```
//!
//! Lines go to a [`DiagnosticsSink`] and are echoed to `tracing` so they also
//! show up on stderr and in the JSONL log. Recording never fails the caller.

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

use crate::error::{Result, StudioError};

/// Destination for formatted diagnostic lines
pub trait DiagnosticsSink {
    /// Append one already-formatted line (without trailing newline)
    fn append(&self, line: &str);
}

/// Format a diagnostics line: `[<ISO-8601 UTC>] <message>`
pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
    format!(
        "[{}] {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

/// Cheap, clonable handle used by every component that records events
#[derive(Clone)]
pub struct Diagnostics {
    sink: Option<Rc<dyn DiagnosticsSink>>,
}

impl Diagnostics {
    pub fn new(sink: Rc<dyn DiagnosticsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Echo to tracing only, no file
    pub fn tracing_only() -> Self {
        Self { sink: None }
    }

    pub fn record(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(category = "DIAG", "{}", message);
        if let Some(sink) = &self.sink {
            sink.append(&format_line(Utc::now(), message));
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

// ============================================================================
// File sink
// ============================================================================

/// Appends lines to a file through a background writer thread.
pub struct FileDiagnostics {
    path: PathBuf,
    writer: RefCell<NonBlocking>,
}

impl FileDiagnostics {
    /// Open `path` for appending. The returned guard flushes pending lines when
    /// dropped and must outlive the sink.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, WorkerGuard)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StudioError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StudioError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        Ok((
            Self {
                path,
                writer: RefCell::new(writer),
            },
            guard,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticsSink for FileDiagnostics {
    fn append(&self, line: &str) {
        let mut writer = self.writer.borrow_mut();
        if let Err(e) = writeln!(writer, "{}", line) {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to append diagnostics line"
            );
        }
    }
}

// ============================================================================
// In-memory sink
// ============================================================================

/// Keeps lines in memory; used by tests and by anything that wants to inspect
/// what was recorded.
#[derive(Clone, Default)]
pub struct MemoryDiagnostics {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// True if any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    pub fn handle(&self) -> Diagnostics {
        Diagnostics::new(Rc::new(self.clone()))
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn append(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line_uses_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(
            format_line(at, "Main window loaded"),
            "[2025-03-14T09:26:53.000Z] Main window loaded"
        );
    }

    #[test]
    fn test_memory_sink_records_bracketed_lines() {
        let memory = MemoryDiagnostics::new();
        let diagnostics = memory.handle();
        diagnostics.record("Code window closed");

        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] Code window closed"));
        assert!(memory.contains("Code window closed"));
    }

    #[test]
    fn test_tracing_only_does_not_panic() {
        Diagnostics::tracing_only().record("nothing to see");
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("debug.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[earlier] existing line\n").unwrap();

        {
            let (sink, guard) = FileDiagnostics::open(&path).unwrap();
            let diagnostics = Diagnostics::new(Rc::new(sink));
            diagnostics.record("first");
            diagnostics.record("second");
            drop(diagnostics);
            drop(guard);
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[earlier] existing line");
        assert!(lines[1].ends_with("] first"));
        assert!(lines[2].ends_with("] second"));
    }

    #[test]
    fn test_file_sink_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("debug.log");
        let (sink, _guard) = FileDiagnostics::open(&path).unwrap();
        assert_eq!(sink.path(), path.as_path());
        assert!(path.exists());
    }
}
