//! Outbound channel from window content to the control thread.
//!
//! A [`ContentBridge`] is what a window's content holds to talk to the shell.
//! Restricted bridges carry an allow-list of signal names; anything else is
//! dropped without reaching the inbox.

use std::sync::Arc;

use serde_json::Value;

use crate::protocol::Signal;
use crate::shell::ShellEvent;

/// Signal names the new-project dialog may emit
pub const DEFAULT_BRIDGE_ALLOW_LIST: &[&str] = &["project-created"];

#[derive(Clone)]
pub struct ContentBridge {
    allowed: Option<Arc<[String]>>,
    inbox: async_channel::Sender<ShellEvent>,
}

impl ContentBridge {
    /// A bridge that forwards every well-formed signal
    pub fn unrestricted(inbox: async_channel::Sender<ShellEvent>) -> Self {
        Self {
            allowed: None,
            inbox,
        }
    }

    /// A bridge that only forwards the named signals
    pub fn restricted<I, S>(inbox: async_channel::Sender<ShellEvent>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(allowed.into_iter().map(Into::into).collect()),
            inbox,
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        match &self.allowed {
            Some(allowed) => allowed.iter().any(|a| a == name),
            None => true,
        }
    }

    /// Send `name` with `data` to the control thread. Returns whether it was forwarded.
    pub fn send(&self, name: &str, data: Value) -> bool {
        if !self.allows(name) {
            tracing::debug!(channel = name, "Dropping signal not on bridge allow-list");
            return false;
        }
        let signal = match Signal::from_parts(name, data) {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(channel = name, error = %e, "Malformed signal from window content");
                return false;
            }
        };
        self.forward(signal)
    }

    /// Send an already-typed signal, still subject to the allow-list
    pub fn send_signal(&self, signal: Signal) -> bool {
        if !self.allows(signal.name()) {
            tracing::debug!(channel = signal.name(), "Dropping signal not on bridge allow-list");
            return false;
        }
        self.forward(signal)
    }

    fn forward(&self, signal: Signal) -> bool {
        match self.inbox.try_send(ShellEvent::Signal(signal)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Shell inbox unavailable, signal lost");
                false
            }
        }
    }
}

impl std::fmt::Debug for ContentBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentBridge")
            .field("allowed", &self.allowed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_restricted_bridge_forwards_allowed_signal() {
        let (tx, rx) = async_channel::unbounded();
        let bridge = ContentBridge::restricted(tx, DEFAULT_BRIDGE_ALLOW_LIST.iter().copied());

        assert!(bridge.send("project-created", Value::Null));
        match rx.try_recv().unwrap() {
            ShellEvent::Signal(Signal::ProjectCreated) => {}
            other => panic!("Expected project-created, got {:?}", other),
        }
    }

    #[test]
    fn test_restricted_bridge_drops_everything_else() {
        let (tx, rx) = async_channel::unbounded();
        let bridge = ContentBridge::restricted(tx, ["project-created"]);

        assert!(!bridge.send("open-code-window", Value::Null));
        assert!(!bridge.send("color-cancelled", Value::Null));
        assert!(!bridge.send("not-a-signal", json!({"x": 1})));
        assert!(!bridge.send_signal(Signal::RunCode));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unrestricted_bridge_parses_payload() {
        let (tx, rx) = async_channel::unbounded();
        let bridge = ContentBridge::unrestricted(tx);

        assert!(bridge.send("open-background-color-picker", json!({"color": "#000"})));
        match rx.try_recv().unwrap() {
            ShellEvent::Signal(Signal::OpenBackgroundColorPicker { color }) => {
                assert_eq!(color, "#000")
            }
            other => panic!("Unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_bare_color_payload_is_forwarded() {
        let (tx, rx) = async_channel::unbounded();
        let bridge = ContentBridge::unrestricted(tx);

        assert!(bridge.send("open-color-picker", json!("#ff0000")));
        match rx.try_recv().unwrap() {
            ShellEvent::Signal(Signal::OpenColorPicker { color }) => assert_eq!(color, "#ff0000"),
            other => panic!("Unexpected event {:?}", other),
        }
        assert!(!bridge.send("close-code-window", json!("now")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_malformed_payload_is_not_forwarded() {
        let (tx, rx) = async_channel::unbounded();
        let bridge = ContentBridge::unrestricted(tx);
        assert!(!bridge.send("color-confirmed", json!({"color": "red"})));
        assert!(rx.try_recv().is_err());
    }
}
