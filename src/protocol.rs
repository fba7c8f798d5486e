//! Signal protocol between window content and the control thread
//!
//! Window content talks to the control thread with [`Signal`]s and the control
//! thread talks back with [`WindowMessage`]s. Both are JSON objects tagged by a
//! kebab-case `"type"` field, one per line when carried over stdin:
//!
//! ```json
//! {"type": "open-color-picker", "color": "#ff0000"}
//! {"type": "color-confirmed", "color": "#00ff00", "target": "background"}
//! {"type": "window-data", "width": 1280, "height": 720, "textBoxes": []}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, StudioError};

/// Which color a color-picker session edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTarget {
    Font,
    Background,
}

impl ColorTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTarget::Font => "font",
            ColorTarget::Background => "background",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorTarget::Font => "Font",
            ColorTarget::Background => "Background",
        }
    }
}

/// A color-picker request: the color to start from and what it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRequest {
    pub initial_color: String,
    pub target: ColorTarget,
}

impl ColorRequest {
    pub fn new(initial_color: impl Into<String>, target: ColorTarget) -> Self {
        Self {
            initial_color: initial_color.into(),
            target,
        }
    }

    /// The seeding message pushed into the picker before it is shown
    pub fn into_message(self) -> WindowMessage {
        WindowMessage::SetInitialColor {
            color: self.initial_color,
            target: self.target,
        }
    }
}

/// Point-in-time copy of the main window's layout, consumed by the Output window.
/// The default (0x0, no text boxes) stands for "nothing to report".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub width: f64,
    pub height: f64,
    /// Opaque text-box descriptors, in paint order
    #[serde(default)]
    pub text_boxes: Vec<Value>,
}

/// Signals sent from window content to the control thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Signal {
    ProjectCreated,
    OpenColorPicker {
        color: String,
    },
    OpenBackgroundColorPicker {
        color: String,
    },
    OpenCodeWindow,
    OpenBlueprintWindow,
    RunCode,
    WindowData(RenderPayload),
    CloseCodeWindow,
    CloseBlueprintWindow,
    ColorConfirmed {
        color: String,
        target: ColorTarget,
    },
    ColorCancelled,
    /// A component was added to the open project
    ComponentLoaded {
        #[serde(default)]
        descriptor: Value,
    },
    /// A file was added to the open project
    FileLoaded {
        #[serde(default)]
        descriptor: Value,
    },
}

impl Signal {
    /// The wire name of this signal
    pub fn name(&self) -> &'static str {
        match self {
            Signal::ProjectCreated => "project-created",
            Signal::OpenColorPicker { .. } => "open-color-picker",
            Signal::OpenBackgroundColorPicker { .. } => "open-background-color-picker",
            Signal::OpenCodeWindow => "open-code-window",
            Signal::OpenBlueprintWindow => "open-blueprint-window",
            Signal::RunCode => "run-code",
            Signal::WindowData(_) => "window-data",
            Signal::CloseCodeWindow => "close-code-window",
            Signal::CloseBlueprintWindow => "close-blueprint-window",
            Signal::ColorConfirmed { .. } => "color-confirmed",
            Signal::ColorCancelled => "color-cancelled",
            Signal::ComponentLoaded { .. } => "component-loaded",
            Signal::FileLoaded { .. } => "file-loaded",
        }
    }

    /// Build a signal from a channel name and its payload.
    ///
    /// Object payloads supply the signal's fields; `null` means no fields. The
    /// color pickers also take the bare color, e.g. `("open-color-picker", "#ff0000")`.
    pub fn from_parts(name: &str, data: Value) -> Result<Self> {
        let mut fields = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            scalar => match name {
                "open-color-picker" | "open-background-color-picker" => {
                    let mut map = Map::new();
                    map.insert("color".to_string(), scalar);
                    map
                }
                _ => {
                    return Err(StudioError::protocol(format!(
                        "{} expects an object payload, got {}",
                        name, scalar
                    )))
                }
            },
        };
        fields.insert("type".to_string(), Value::String(name.to_string()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Parse one JSON line into a signal
pub fn parse_signal(line: &str) -> Result<Signal> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Messages pushed from the control thread into a window's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WindowMessage {
    UpdateMainContent { message: String },
    SetInitialColor { color: String, target: ColorTarget },
    ColorSelected { color: String },
    BackgroundColorSelected { color: String },
    SetWindowData(RenderPayload),
}

impl WindowMessage {
    /// The notification Main receives when a color is confirmed for `target`
    pub fn color_selected(target: ColorTarget, color: String) -> Self {
        match target {
            ColorTarget::Font => WindowMessage::ColorSelected { color },
            ColorTarget::Background => WindowMessage::BackgroundColorSelected { color },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unit_signal() {
        let signal = parse_signal(r#"{"type": "project-created"}"#).unwrap();
        assert_eq!(signal, Signal::ProjectCreated);
        assert_eq!(signal.name(), "project-created");
    }

    #[test]
    fn test_parse_color_confirmed() {
        let signal =
            parse_signal(r##"{"type": "color-confirmed", "color": "#112233", "target": "background"}"##)
                .unwrap();
        assert_eq!(
            signal,
            Signal::ColorConfirmed {
                color: "#112233".into(),
                target: ColorTarget::Background,
            }
        );
    }

    #[test]
    fn test_parse_window_data_payload() {
        let line = r#"{"type": "window-data", "width": 1024, "height": 768, "textBoxes": [{"id": 1}]}"#;
        match parse_signal(line).unwrap() {
            Signal::WindowData(payload) => {
                assert_eq!(payload.width, 1024.0);
                assert_eq!(payload.height, 768.0);
                assert_eq!(payload.text_boxes, vec![json!({"id": 1})]);
            }
            other => panic!("Expected WindowData, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_signal_is_rejected() {
        assert!(parse_signal(r#"{"type": "format-disk"}"#).is_err());
    }

    #[test]
    fn test_from_parts_merges_object_payload() {
        let signal = Signal::from_parts("open-color-picker", json!({"color": "red"})).unwrap();
        assert_eq!(signal, Signal::OpenColorPicker { color: "red".into() });

        let signal = Signal::from_parts("project-created", Value::Null).unwrap();
        assert_eq!(signal, Signal::ProjectCreated);
    }

    #[test]
    fn test_from_parts_accepts_bare_color() {
        let signal = Signal::from_parts("open-color-picker", json!("#ff0000")).unwrap();
        assert_eq!(
            signal,
            Signal::OpenColorPicker {
                color: "#ff0000".into()
            }
        );
        let signal = Signal::from_parts("open-background-color-picker", json!("#00ff00")).unwrap();
        assert_eq!(
            signal,
            Signal::OpenBackgroundColorPicker {
                color: "#00ff00".into()
            }
        );
    }

    #[test]
    fn test_from_parts_rejects_scalar_for_other_signals() {
        match Signal::from_parts("color-confirmed", json!("#ff0000")) {
            Err(StudioError::Protocol(e)) => assert!(e.to_string().contains("object payload")),
            other => panic!("Expected protocol error, got {:?}", other),
        }
        assert!(Signal::from_parts("run-code", json!(42)).is_err());
    }

    #[test]
    fn test_color_selected_follows_target() {
        assert_eq!(
            WindowMessage::color_selected(ColorTarget::Font, "blue".into()),
            WindowMessage::ColorSelected { color: "blue".into() }
        );
        assert_eq!(
            WindowMessage::color_selected(ColorTarget::Background, "blue".into()),
            WindowMessage::BackgroundColorSelected { color: "blue".into() }
        );
    }

    #[test]
    fn test_window_message_wire_names() {
        let json = serde_json::to_value(WindowMessage::UpdateMainContent {
            message: "New Project Created".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            json!({"type": "update-main-content", "message": "New Project Created"})
        );
        let json = serde_json::to_value(
            ColorRequest::new("#fff", ColorTarget::Font).into_message(),
        )
        .unwrap();
        assert_eq!(
            json,
            json!({"type": "set-initial-color", "color": "#fff", "target": "font"})
        );
    }
}
