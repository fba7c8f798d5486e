//! Process-wide tracing setup.
//!
//! Two sinks share one subscriber:
//! - `blueprint-studio.jsonl` in the configured log directory, one JSON object
//!   per event, for tooling
//! - compact colored lines on stderr, for whoever launched the app
//!
//! `RUST_LOG` overrides the default filter. The diagnostics line log
//! (`debug.log`) is a separate concern; see [`crate::diagnostics`].
//!
//! ```rust,ignore
//! let _logging = blueprint_studio::logging::init(&config.log_dir());
//! ```
//!
//! A JSONL record looks like:
//!
//! ```json
//! {"timestamp":"2025-03-14T09:26:53.589Z","level":"INFO","target":"blueprint_studio::window_manager","fields":{"event_type":"window_event","role":"code","window_id":3,"action":"created","message":"Window code created"}}
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "blueprint-studio.jsonl";
const DEFAULT_FILTER: &str = "info,gpui=warn,blade_graphics=warn";

/// Keeps the JSONL writer thread alive. Drop it last; dropping flushes.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber. Falls back to stderr only when the log
/// file can't be opened.
pub fn init(log_dir: &Path) -> LoggingGuard {
    let path = log_path(log_dir);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_guard = match open_log_file(log_dir, &path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let jsonl_layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);

            tracing_subscriber::registry()
                .with(filter)
                .with(jsonl_layer)
                .with(stderr_layer())
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer())
                .init();
            tracing::warn!(error = %e, path = %path.display(), "JSONL log unavailable, stderr only");
            None
        }
    };

    tracing::info!(
        event_type = "app_lifecycle",
        action = "logging_ready",
        log_path = %path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Compact colored lines on stderr. Generic over the subscriber so each
/// branch of [`init`] can stack it on a different layer set.
fn stderr_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact()
}

fn open_log_file(log_dir: &Path, path: &Path) -> std::io::Result<File> {
    fs::create_dir_all(log_dir)?;
    OpenOptions::new().create(true).append(true).open(path)
}

/// Where the JSONL log lives inside `log_dir`
pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

// -----------------------------------------------------------------------------
// Structured event helpers
// -----------------------------------------------------------------------------

/// A window was created, shown or closed
pub fn log_window_event(role: &str, window_id: u64, action: &str) {
    tracing::info!(
        event_type = "window_event",
        role = role,
        window_id = window_id,
        action = action,
        "Window {} {}",
        role,
        action
    );
}

/// A signal entered the shell from `source` (a window, stdin)
pub fn log_signal(name: &str, source: &str) {
    tracing::debug!(
        event_type = "signal",
        signal = name,
        source = source,
        "Signal {} from {}",
        name,
        source
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_inside_dir() {
        let dir = Path::new("/tmp/studio-logs");
        assert_eq!(
            log_path(dir),
            PathBuf::from("/tmp/studio-logs/blueprint-studio.jsonl")
        );
    }

    #[test]
    fn test_open_log_file_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let path = log_path(&dir);
        open_log_file(&dir, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_helpers_work_without_subscriber() {
        log_window_event("code", 3, "created");
        log_signal("run-code", "stdin");
    }
}
