//! gpui window backend and the content surface each window hosts.
//!
//! [`GpuiBackend`] implements [`WindowBackend`] on top of gpui windows. Every
//! window renders a [`SurfaceView`]: a thin stand-in for the role's content
//! document that shows incoming [`WindowMessage`]s and emits signals through
//! its [`ContentBridge`].
//!
//! Lifecycle wiring:
//! - `Ready` is queued as soon as the view is constructed
//! - `Closed` is queued from the view's release hook, so it fires however the
//!   window went away (title-bar button, `remove_window`, app teardown)

use std::collections::HashMap;

use gpui::{
    div, prelude::*, px, rgb, size, App, Bounds, ClickEvent, Context, SharedString,
    TitlebarOptions, Window, WindowBounds, WindowHandle, WindowKind, WindowOptions,
};
use serde_json::Value;

use crate::bridge::ContentBridge;
use crate::error::{Result, ResultExt, StudioError};
use crate::protocol::{ColorTarget, RenderPayload, Signal, WindowMessage};
use crate::shell::ShellEvent;
use crate::window_manager::{LifecycleEvent, SnapshotTicket, WindowBackend, WindowId};
use crate::window_role::{WindowRole, WindowSpec};

// ============================================================================
// Backend
// ============================================================================

pub struct GpuiBackend {
    windows: HashMap<WindowId, WindowHandle<SurfaceView>>,
    inbox: async_channel::Sender<ShellEvent>,
    bridge_allow_list: Vec<String>,
}

impl GpuiBackend {
    pub fn new(inbox: async_channel::Sender<ShellEvent>, bridge_allow_list: Vec<String>) -> Self {
        Self {
            windows: HashMap::new(),
            inbox,
            bridge_allow_list,
        }
    }

    fn bridge_for(&self, role: WindowRole) -> ContentBridge {
        match role {
            WindowRole::NewProject => {
                ContentBridge::restricted(self.inbox.clone(), self.bridge_allow_list.iter().cloned())
            }
            _ => ContentBridge::unrestricted(self.inbox.clone()),
        }
    }

    fn with_view(
        &mut self,
        id: WindowId,
        cx: &mut App,
        f: impl FnOnce(&mut SurfaceView, &mut Window, &mut Context<SurfaceView>),
    ) {
        let Some(handle) = self.windows.get(&id).copied() else {
            tracing::debug!(window_id = id.0, "No gpui window for id");
            return;
        };
        if handle.update(cx, f).is_err() {
            tracing::debug!(window_id = id.0, "gpui window already gone");
            self.windows.remove(&id);
        }
    }
}

impl WindowBackend for GpuiBackend {
    type Context = App;

    fn open(&mut self, id: WindowId, spec: &WindowSpec, cx: &mut App) -> Result<()> {
        let bounds = Bounds::centered(
            None,
            size(px(spec.size.width as f32), px(spec.size.height as f32)),
            cx,
        );
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            titlebar: Some(TitlebarOptions {
                title: Some(SharedString::from(spec.title.clone())),
                ..Default::default()
            }),
            focus: spec.show_immediately,
            show: spec.show_immediately,
            is_resizable: spec.resizable,
            kind: WindowKind::Normal,
            ..Default::default()
        };
        if spec.modal || spec.parented {
            tracing::debug!(
                role = spec.role.as_str(),
                modal = spec.modal,
                parented = spec.parented,
                "Window hierarchy is advisory on this backend"
            );
        }

        let role = spec.role;
        let bridge = self.bridge_for(role);
        let inbox = self.inbox.clone();
        let handle = cx
            .open_window(options, move |_window, cx| {
                cx.new(move |cx| {
                    let closed_inbox = inbox.clone();
                    cx.on_release(move |_view, _cx| {
                        closed_inbox
                            .try_send(ShellEvent::Lifecycle(LifecycleEvent::closed(id)))
                            .warn_on_err();
                    })
                    .detach();
                    SurfaceView::new(role, bridge)
                })
            })
            .map_err(|e| StudioError::WindowOpen {
                role: role.name().to_string(),
                message: e.to_string(),
            })?;

        self.windows.insert(id, handle);
        self.inbox
            .try_send(ShellEvent::Lifecycle(LifecycleEvent::ready(id)))
            .log_err();
        Ok(())
    }

    fn show(&mut self, id: WindowId, cx: &mut App) {
        self.with_view(id, cx, |_, window, _| window.activate_window());
    }

    fn focus(&mut self, id: WindowId, cx: &mut App) {
        cx.activate(true);
        self.with_view(id, cx, |_, window, _| window.activate_window());
    }

    fn maximize(&mut self, id: WindowId, cx: &mut App) {
        self.with_view(id, cx, |_, window, _| window.zoom_window());
    }

    fn close(&mut self, id: WindowId, cx: &mut App) {
        self.with_view(id, cx, |_, window, _| window.remove_window());
        self.windows.remove(&id);
    }

    fn send(&mut self, id: WindowId, message: WindowMessage, cx: &mut App) {
        self.with_view(id, cx, |view, _, cx| {
            view.receive(message);
            cx.notify();
        });
    }

    fn request_snapshot(&mut self, id: WindowId, cx: &mut App) -> SnapshotTicket {
        let (tx, rx) = async_channel::bounded(1);
        let result = match self.windows.get(&id).copied() {
            Some(handle) => handle
                .update(cx, |view, window, _| view.snapshot(window))
                .map_err(|e| e.to_string()),
            None => Err("window is not open".to_string()),
        };
        let _ = tx.try_send(result);
        rx
    }

    fn open_dev_tools(&mut self, id: WindowId, cx: &mut App) {
        self.with_view(id, cx, |view, _, cx| {
            view.dev_tools_open = true;
            cx.notify();
        });
    }

    fn open_window_count(&self, cx: &App) -> usize {
        cx.windows().len()
    }

    fn quit(&mut self, cx: &mut App) {
        cx.quit();
    }
}

// ============================================================================
// Content surface
// ============================================================================

/// Stand-in for a role's content document
pub struct SurfaceView {
    role: WindowRole,
    bridge: ContentBridge,
    status: Option<String>,
    font_color: String,
    background_color: String,
    /// Color being edited, for the color picker
    picking: Option<(String, ColorTarget)>,
    output: Option<RenderPayload>,
    /// Every message this window received, newest last
    history: Vec<WindowMessage>,
    dev_tools_open: bool,
}

impl SurfaceView {
    fn new(role: WindowRole, bridge: ContentBridge) -> Self {
        Self {
            role,
            bridge,
            status: None,
            font_color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
            picking: None,
            output: None,
            history: Vec::new(),
            dev_tools_open: false,
        }
    }

    fn receive(&mut self, message: WindowMessage) {
        self.history.push(message.clone());
        match message {
            WindowMessage::UpdateMainContent { message } => self.status = Some(message),
            WindowMessage::SetInitialColor { color, target } => {
                self.picking = Some((color, target))
            }
            WindowMessage::ColorSelected { color } => self.font_color = color,
            WindowMessage::BackgroundColorSelected { color } => self.background_color = color,
            WindowMessage::SetWindowData(payload) => self.output = Some(payload),
        }
    }

    /// This surface has no text boxes of its own; the layout is the viewport
    fn snapshot(&self, window: &Window) -> RenderPayload {
        let viewport = window.viewport_size();
        RenderPayload {
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
            text_boxes: Vec::new(),
        }
    }

    /// Buttons this surface offers, as (label, signal)
    fn actions(&self) -> Vec<(&'static str, Signal)> {
        match self.role {
            WindowRole::Main => vec![
                ("Code", Signal::OpenCodeWindow),
                ("Blueprint", Signal::OpenBlueprintWindow),
                (
                    "Font Color",
                    Signal::OpenColorPicker {
                        color: self.font_color.clone(),
                    },
                ),
                (
                    "Background",
                    Signal::OpenBackgroundColorPicker {
                        color: self.background_color.clone(),
                    },
                ),
                ("Run", Signal::RunCode),
            ],
            WindowRole::NewProject => vec![("Create Project", Signal::ProjectCreated)],
            WindowRole::ColorPicker => {
                let mut actions = Vec::new();
                if let Some((color, target)) = &self.picking {
                    actions.push((
                        "Confirm",
                        Signal::ColorConfirmed {
                            color: color.clone(),
                            target: *target,
                        },
                    ));
                }
                actions.push(("Cancel", Signal::ColorCancelled));
                actions
            }
            WindowRole::Code => vec![("Run", Signal::RunCode), ("Close", Signal::CloseCodeWindow)],
            WindowRole::Blueprint => vec![("Close", Signal::CloseBlueprintWindow)],
            WindowRole::SaveProject | WindowRole::Output => Vec::new(),
        }
    }

    fn trigger(&mut self, ix: usize) {
        if let Some((label, signal)) = self.actions().into_iter().nth(ix) {
            tracing::debug!(role = self.role.as_str(), action = label, "Surface action");
            self.bridge.send_signal(signal);
        }
    }

    fn body_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Content: {}", self.role.document())];
        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        match self.role {
            WindowRole::Main => {
                lines.push(format!("Font color: {}", self.font_color));
                lines.push(format!("Background color: {}", self.background_color));
            }
            WindowRole::ColorPicker => {
                if let Some((color, target)) = &self.picking {
                    lines.push(format!("Editing {} color: {}", target.as_str(), color));
                }
            }
            WindowRole::Output => {
                if let Some(payload) = &self.output {
                    lines.push(format!(
                        "{}x{}, {} text boxes",
                        payload.width,
                        payload.height,
                        payload.text_boxes.len()
                    ));
                    for text_box in &payload.text_boxes {
                        lines.push(describe_text_box(text_box));
                    }
                }
            }
            _ => {}
        }
        lines
    }
}

fn describe_text_box(text_box: &Value) -> String {
    match text_box.get("text").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => text_box.to_string(),
    }
}

impl Render for SurfaceView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let buttons = self
            .actions()
            .into_iter()
            .enumerate()
            .map(|(ix, (label, _))| {
                div()
                    .id(("surface-action", ix))
                    .px_3()
                    .py_1()
                    .rounded_md()
                    .bg(rgb(0x2d2d30))
                    .hover(|style| style.bg(rgb(0x3e3e42)))
                    .cursor_pointer()
                    .child(label)
                    .on_click(cx.listener(move |this, _: &ClickEvent, _window, _cx| {
                        this.trigger(ix);
                    }))
            });

        let mut root = div()
            .flex()
            .flex_col()
            .size_full()
            .gap_2()
            .p_4()
            .bg(rgb(0x1e1e1e))
            .text_color(rgb(0xdcdcdc))
            .text_sm()
            .child(div().text_lg().child(self.role.name()))
            .children(self.body_lines())
            .child(div().flex().flex_row().gap_2().children(buttons));

        if self.dev_tools_open {
            root = root.child(
                div()
                    .flex()
                    .flex_col()
                    .mt_2()
                    .p_2()
                    .bg(rgb(0x111111))
                    .child("Developer Tools")
                    .children(
                        self.history
                            .iter()
                            .map(|message| format!("{:?}", message)),
                    ),
            );
        }

        root
    }
}
