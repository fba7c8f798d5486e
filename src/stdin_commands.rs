//! External command handling via stdin.
//!
//! Lets tests and automation drive the shell with JSONL, one command per line.
//! Any signal window content can send is accepted, plus a few shell-level
//! commands:
//!
//! ```json
//! {"type": "open-code-window"}
//! {"type": "open-color-picker", "color": "#ff8800"}
//! {"type": "menu", "command": "new-project"}
//! {"type": "activate"}
//! {"type": "get-window-data"}
//! ```
//!
//! `get-window-data` answers on stdout with one JSON line:
//! `{"ok": {...payload...}}` or `{"error": "..."}`.
//!
//! # Example Usage
//!
//! ```bash
//! echo '{"type": "open-blueprint-window"}' | ./blueprint-studio --stdin
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, StudioError};
use crate::logging;
use crate::menu_bar::MenuCommand;
use crate::protocol::Signal;
use crate::shell::{ShellEvent, ShellRequest, WindowDataResponse};

/// Commands accepted on stdin that are not window signals
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ShellCommand {
    Menu { command: MenuCommand },
    Activate,
    GetWindowData,
}

/// A parsed stdin line
#[derive(Debug)]
pub enum ExternalCommand {
    Event(ShellEvent),
    /// Request whose answer should be printed when it arrives
    WindowData(
        ShellRequest,
        async_channel::Receiver<WindowDataResponse>,
    ),
}

/// Parse one stdin line
pub fn parse_command(line: &str) -> Result<ExternalCommand> {
    let value: Value = serde_json::from_str(line.trim())?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StudioError::protocol("command is missing a \"type\" field"))?;

    match kind.as_str() {
        "menu" | "activate" | "get-window-data" => {
            let command: ShellCommand = serde_json::from_value(value)?;
            Ok(match command {
                ShellCommand::Menu { command } => ExternalCommand::Event(ShellEvent::Menu(command)),
                ShellCommand::Activate => ExternalCommand::Event(ShellEvent::Activate),
                ShellCommand::GetWindowData => {
                    let (request, rx) = ShellRequest::get_window_data();
                    ExternalCommand::WindowData(request, rx)
                }
            })
        }
        _ => {
            let signal: Signal = serde_json::from_value(value)?;
            Ok(ExternalCommand::Event(ShellEvent::Signal(signal)))
        }
    }
}

/// Render a window-data answer as one JSON line
pub fn format_response(response: &WindowDataResponse) -> String {
    let value = match response {
        Ok(payload) => serde_json::json!({ "ok": payload }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    value.to_string()
}

// send_blocking since the listener is a plain thread
fn forward(inbox: &async_channel::Sender<ShellEvent>, event: ShellEvent) -> Result<()> {
    inbox
        .send_blocking(event)
        .map_err(|_| StudioError::ChannelClosed("shell inbox".to_string()))
}

/// Start a thread that reads JSONL commands from stdin and forwards them to
/// the shell inbox. The thread exits when stdin closes or the inbox is dropped.
pub fn start_stdin_listener(inbox: async_channel::Sender<ShellEvent>) {
    use std::io::BufRead;

    std::thread::spawn(move || {
        tracing::info!(category = "STDIN", "External command listener started");
        let stdin = std::io::stdin();
        let reader = stdin.lock();

        for line in reader.lines() {
            match line {
                Ok(line) if !line.trim().is_empty() => match parse_command(&line) {
                    Ok(ExternalCommand::Event(event)) => {
                        if let ShellEvent::Signal(signal) = &event {
                            logging::log_signal(signal.name(), "stdin");
                        }
                        if let Err(e) = forward(&inbox, event) {
                            tracing::info!(category = "STDIN", error = %e, "Exiting");
                            break;
                        }
                    }
                    Ok(ExternalCommand::WindowData(request, rx)) => {
                        if let Err(e) = forward(&inbox, ShellEvent::Request(request)) {
                            tracing::info!(category = "STDIN", error = %e, "Exiting");
                            break;
                        }
                        std::thread::spawn(move || {
                            if let Ok(response) = rx.recv_blocking() {
                                println!("{}", format_response(&response));
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(category = "STDIN", error = %e, line = %line, "Failed to parse command");
                    }
                },
                Ok(_) => {} // Empty line, ignore
                Err(e) => {
                    tracing::warn!(category = "STDIN", error = %e, "Error reading stdin");
                    break;
                }
            }
        }
        tracing::info!(category = "STDIN", "External command listener exiting");
    });
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ColorTarget, RenderPayload};

    #[test]
    fn test_parse_signal_command() {
        match parse_command(r#"{"type": "open-code-window"}"#).unwrap() {
            ExternalCommand::Event(ShellEvent::Signal(Signal::OpenCodeWindow)) => {}
            other => panic!("Expected open-code-window, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_signal_with_fields() {
        let line = r#"{"type": "color-confirmed", "color": "teal", "target": "font"}"#;
        match parse_command(line).unwrap() {
            ExternalCommand::Event(ShellEvent::Signal(Signal::ColorConfirmed { color, target })) => {
                assert_eq!(color, "teal");
                assert_eq!(target, ColorTarget::Font);
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_menu_command() {
        match parse_command(r#"{"type": "menu", "command": "new-project"}"#).unwrap() {
            ExternalCommand::Event(ShellEvent::Menu(MenuCommand::NewProject)) => {}
            other => panic!("Expected menu command, got {:?}", other),
        }
        match parse_command(r#"{"type": "menu", "command": "open-dev-tools"}"#).unwrap() {
            ExternalCommand::Event(ShellEvent::Menu(MenuCommand::OpenDevTools)) => {}
            other => panic!("Expected dev tools, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_activate() {
        assert!(matches!(
            parse_command(r#"{"type": "activate"}"#).unwrap(),
            ExternalCommand::Event(ShellEvent::Activate)
        ));
    }

    #[test]
    fn test_parse_get_window_data_creates_request() {
        match parse_command(r#"{"type": "get-window-data"}"#).unwrap() {
            ExternalCommand::WindowData(ShellRequest::GetWindowData { reply }, rx) => {
                reply
                    .try_send(Ok(RenderPayload {
                        width: 1.0,
                        height: 2.0,
                        text_boxes: vec![],
                    }))
                    .unwrap();
                assert!(rx.try_recv().unwrap().is_ok());
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_untyped() {
        assert!(parse_command(r#"{"type": "launch-missiles"}"#).is_err());
        assert!(parse_command(r#"{"color": "red"}"#).is_err());
        assert!(parse_command("not json").is_err());
        assert!(parse_command(r#"{"type": "menu", "command": "format"}"#).is_err());
    }

    #[test]
    fn test_untyped_line_is_a_protocol_error() {
        match parse_command(r#"{"color": "red"}"#) {
            Err(StudioError::Protocol(e)) => assert!(e.to_string().contains("\"type\"")),
            other => panic!("Expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_reports_closed_inbox() {
        let (tx, rx) = async_channel::bounded(1);
        drop(rx);
        let err = forward(&tx, ShellEvent::Activate).unwrap_err();
        assert!(matches!(err, StudioError::ChannelClosed(_)));
    }

    #[test]
    fn test_format_response() {
        let ok: WindowDataResponse = Ok(RenderPayload {
            width: 10.0,
            height: 20.0,
            text_boxes: vec![],
        });
        let line: Value = serde_json::from_str(&format_response(&ok)).unwrap();
        assert_eq!(
            line,
            serde_json::json!({"ok": {"width": 10.0, "height": 20.0, "textBoxes": []}})
        );
        let err: WindowDataResponse = Err(StudioError::Evaluation("boom".into()));
        assert_eq!(
            format_response(&err),
            r#"{"error":"Window data evaluation failed: boom"}"#
        );
    }
}
