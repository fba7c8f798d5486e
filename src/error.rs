use thiserror::Error;
use tracing::{error, warn};

/// How loudly a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The request was dropped; the shell carries on
    Warning,
    /// An operation the user asked for did not happen
    Error,
}

/// Everything that can go wrong inside the shell
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Failed to open {role} window: {message}")]
    WindowOpen { role: String, message: String },

    #[error("Window data evaluation failed: {0}")]
    Evaluation(String),

    #[error("Failed to parse signal: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl StudioError {
    /// A malformed message that serde itself didn't reject
    pub fn protocol(message: impl std::fmt::Display) -> Self {
        Self::Protocol(<serde_json::Error as serde::de::Error>::custom(message))
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::WindowOpen { .. } => ErrorSeverity::Error,
            Self::Evaluation(_) => ErrorSeverity::Error,
            Self::Protocol(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Warning,
            Self::ChannelClosed(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::WindowOpen { role, .. } => format!("Could not open the {} window", role),
            Self::Evaluation(msg) => format!("Could not read window data: {}", msg),
            Self::Protocol(e) => format!("Invalid message format: {}", e),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::Io { path, .. } => format!("Could not access {}", path),
            Self::ChannelClosed(what) => format!("{} is no longer available", what),
        }
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

/// Best-effort handling for results nobody can act on.
///
/// Logs the error with the caller's file and line, then returns `None`.
///
/// ```ignore
/// use blueprint_studio::error::ResultExt;
///
/// inbox.try_send(event).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log at error level and discard
    fn log_err(self) -> Option<T>;
    /// Log at warn level and discard; for failures that are expected at times
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        let caller = std::panic::Location::caller();
        self.map_err(|e| {
            error!(error = ?e, file = caller.file(), line = caller.line(), "Discarded error");
        })
        .ok()
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        let caller = std::panic::Location::caller();
        self.map_err(|e| {
            warn!(error = ?e, file = caller.file(), line = caller.line(), "Discarded failure");
        })
        .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_is_error_severity() {
        let err = StudioError::Evaluation("textBoxes is not defined".into());
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert!(err.to_string().contains("textBoxes is not defined"));
    }

    #[test]
    fn test_protocol_error_from_serde() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: StudioError = parse.unwrap_err().into();
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.user_message().starts_with("Invalid message format"));
    }

    #[test]
    fn test_protocol_constructor_keeps_message() {
        let err = StudioError::protocol("command is missing a \"type\" field");
        assert!(matches!(err, StudioError::Protocol(_)));
        assert!(err.to_string().contains("missing a \"type\" field"));
    }

    #[test]
    fn test_window_open_user_message_names_role() {
        let err = StudioError::WindowOpen {
            role: "Color Picker".into(),
            message: "no display".into(),
        };
        assert_eq!(err.user_message(), "Could not open the Color Picker window");
    }

    #[test]
    fn test_log_err_returns_none_on_error() {
        let result: std::result::Result<u32, &str> = Err("boom");
        assert_eq!(result.log_err(), None);
        let ok: std::result::Result<u32, &str> = Ok(7);
        assert_eq!(ok.warn_on_err(), Some(7));
    }
}
