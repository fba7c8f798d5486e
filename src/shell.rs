//! The control thread: routes signals, menu commands and window lifecycle
//! events to the window registry and session state.
//!
//! Everything runs on one thread, one event at a time. The only handlers that
//! suspend are the snapshot round trips (`run-code` and `get-window-data`);
//! they hand back a [`Pending`] future for the event loop to drive while later
//! events keep being handled.

use futures::future::{FutureExt, LocalBoxFuture};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{ErrorSeverity, Result, ResultExt, StudioError};
use crate::menu_bar::MenuCommand;
use crate::protocol::{ColorRequest, ColorTarget, RenderPayload, Signal, WindowMessage};
use crate::session::{NewProjectDecision, SessionState};
use crate::window_manager::{
    LifecycleEvent, LifecycleKind, OpenOutcome, SnapshotTicket, WindowBackend, WindowRegistry,
    WindowRole, WindowSize,
};

/// Answer to a `get-window-data` request
pub type WindowDataResponse = Result<RenderPayload>;

/// Requests that expect an answer
#[derive(Debug)]
pub enum ShellRequest {
    GetWindowData {
        reply: async_channel::Sender<WindowDataResponse>,
    },
}

impl ShellRequest {
    /// Build a `get-window-data` request and the receiver its answer arrives on
    pub fn get_window_data() -> (Self, async_channel::Receiver<WindowDataResponse>) {
        let (reply, rx) = async_channel::bounded(1);
        (ShellRequest::GetWindowData { reply }, rx)
    }
}

/// Everything the control thread reacts to
#[derive(Debug)]
pub enum ShellEvent {
    Signal(Signal),
    Request(ShellRequest),
    Lifecycle(LifecycleEvent),
    Menu(MenuCommand),
    /// The platform asked the app to come forward (dock click, reopen)
    Activate,
}

/// The shell's inbox. Unbounded: window signals and lifecycle events must
/// never be dropped, or a role could stay registered to a dead window.
pub fn shell_inbox() -> (
    async_channel::Sender<ShellEvent>,
    async_channel::Receiver<ShellEvent>,
) {
    async_channel::unbounded()
}

/// A suspended handler. Resolves to an event that should be queued next.
pub type Pending = LocalBoxFuture<'static, Option<ShellEvent>>;

pub struct Shell<B: WindowBackend> {
    registry: WindowRegistry<B>,
    session: SessionState,
    diagnostics: Diagnostics,
    quit_on_last_window_closed: bool,
}

impl<B: WindowBackend> Shell<B> {
    pub fn new(backend: B, diagnostics: Diagnostics, config: &Config) -> Self {
        let mut registry = WindowRegistry::new(backend, diagnostics.clone());
        for (role, size) in config.window_sizes() {
            registry.set_size(role, size);
        }
        Self {
            registry,
            session: SessionState::new(),
            diagnostics,
            quit_on_last_window_closed: config.quit_on_last_window_closed(),
        }
    }

    pub fn registry(&self) -> &WindowRegistry<B> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WindowRegistry<B> {
        &mut self.registry
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Open the main window
    pub fn start(&mut self, cx: &mut B::Context) {
        self.open(WindowRole::Main, None, None, cx);
    }

    pub fn handle(&mut self, event: ShellEvent, cx: &mut B::Context) -> Option<Pending> {
        match event {
            ShellEvent::Signal(signal) => self.handle_signal(signal, cx),
            ShellEvent::Request(request) => self.handle_request(request, cx),
            ShellEvent::Lifecycle(event) => {
                self.handle_lifecycle(event, cx);
                None
            }
            ShellEvent::Menu(command) => {
                self.handle_menu(command, cx);
                None
            }
            ShellEvent::Activate => {
                if self.registry.backend().open_window_count(cx) == 0 {
                    tracing::info!("Activated with no windows, recreating main window");
                    self.open(WindowRole::Main, None, None, cx);
                }
                None
            }
        }
    }

    // ========================================================================
    // Signals
    // ========================================================================

    fn handle_signal(&mut self, signal: Signal, cx: &mut B::Context) -> Option<Pending> {
        tracing::debug!(signal = signal.name(), "Dispatching signal");
        match signal {
            Signal::ProjectCreated => {
                self.session.project_created();
                let update = WindowMessage::UpdateMainContent {
                    message: "New Project Created".to_string(),
                };
                if self.registry.send(WindowRole::Main, update, cx) {
                    self.diagnostics
                        .record("Project created, updating main window");
                }
            }
            Signal::OpenColorPicker { color } => {
                self.open_color_picker(ColorRequest::new(color, ColorTarget::Font), cx)
            }
            Signal::OpenBackgroundColorPicker { color } => {
                self.open_color_picker(ColorRequest::new(color, ColorTarget::Background), cx)
            }
            Signal::OpenCodeWindow => {
                self.open(WindowRole::Code, None, None, cx);
            }
            Signal::OpenBlueprintWindow => {
                self.open(WindowRole::Blueprint, None, None, cx);
            }
            Signal::RunCode => return self.run_code(cx),
            Signal::WindowData(payload) => {
                let size = payload_size(&payload);
                self.open(
                    WindowRole::Output,
                    Some(WindowMessage::SetWindowData(payload)),
                    size,
                    cx,
                );
            }
            Signal::CloseCodeWindow => {
                if self.registry.close(WindowRole::Code, cx) {
                    self.diagnostics
                        .record("Received close-code-window, closing code window");
                }
            }
            Signal::CloseBlueprintWindow => {
                if self.registry.close(WindowRole::Blueprint, cx) {
                    self.diagnostics
                        .record("Received close-blueprint-window, closing blueprint window");
                }
            }
            Signal::ColorConfirmed { color, target } => {
                let message = WindowMessage::color_selected(target, color.clone());
                if self.registry.send(WindowRole::Main, message, cx) {
                    self.diagnostics
                        .record(format!("{} color confirmed: {}", target.label(), color));
                }
                self.registry.close(WindowRole::ColorPicker, cx);
            }
            Signal::ColorCancelled => {
                if self.registry.close(WindowRole::ColorPicker, cx) {
                    self.diagnostics.record("Color selection cancelled");
                }
            }
            Signal::ComponentLoaded { descriptor } => {
                self.diagnostics
                    .record(format!("Component loaded: {}", descriptor));
                self.session.load_component(descriptor);
            }
            Signal::FileLoaded { descriptor } => {
                self.diagnostics.record(format!("File loaded: {}", descriptor));
                self.session.load_file(descriptor);
            }
        }
        None
    }

    fn open_color_picker(&mut self, request: ColorRequest, cx: &mut B::Context) {
        self.open(WindowRole::ColorPicker, Some(request.into_message()), None, cx);
    }

    /// Snapshot Main, then feed the result back in as `window-data`
    fn run_code(&mut self, cx: &mut B::Context) -> Option<Pending> {
        let ticket = self.registry.request_snapshot(WindowRole::Main, cx)?;
        self.diagnostics
            .record("Received run-code, requesting window data");
        let diagnostics = self.diagnostics.clone();
        Some(
            async move {
                match resolve_snapshot(ticket).await {
                    Ok(payload) => Some(ShellEvent::Signal(Signal::WindowData(payload))),
                    Err(e) => {
                        tracing::error!(error = %e, "run-code snapshot failed");
                        diagnostics.record(format!("Error retrieving window data: {}", e));
                        None
                    }
                }
            }
            .boxed_local(),
        )
    }

    // ========================================================================
    // Requests
    // ========================================================================

    fn handle_request(&mut self, request: ShellRequest, cx: &mut B::Context) -> Option<Pending> {
        match request {
            ShellRequest::GetWindowData { reply } => {
                let ticket = match self.registry.request_snapshot(WindowRole::Main, cx) {
                    Some(ticket) => ticket,
                    None => {
                        self.diagnostics
                            .record("Window data requested with no main window, returning empty data");
                        reply.try_send(Ok(RenderPayload::default())).warn_on_err();
                        return None;
                    }
                };
                let diagnostics = self.diagnostics.clone();
                Some(
                    async move {
                        let result = resolve_snapshot(ticket).await;
                        match &result {
                            Ok(payload) => diagnostics.record(format!(
                                "Window data retrieved: {}",
                                serde_json::to_string(payload).unwrap_or_default()
                            )),
                            Err(e) => {
                                tracing::error!(error = %e, "get-window-data failed");
                                diagnostics.record(format!("Error retrieving window data: {}", e));
                            }
                        }
                        if reply.send(result).await.is_err() {
                            tracing::warn!("get-window-data requester went away");
                        }
                        None
                    }
                    .boxed_local(),
                )
            }
        }
    }

    // ========================================================================
    // Menu
    // ========================================================================

    fn handle_menu(&mut self, command: MenuCommand, cx: &mut B::Context) {
        match command {
            MenuCommand::NewProject => {
                match self.session.start_new_project() {
                    NewProjectDecision::OpenNewProject => {
                        self.open(WindowRole::NewProject, None, None, cx);
                    }
                    NewProjectDecision::PromptSave => {
                        if self.open(WindowRole::SaveProject, None, None, cx).is_some() {
                            self.session.begin_save();
                        }
                    }
                }
                self.diagnostics.record(format!(
                    "New project clicked, componentsLoaded: {}, filesLoaded: {}",
                    serde_json::to_string(self.session.components()).unwrap_or_default(),
                    serde_json::to_string(self.session.files()).unwrap_or_default()
                ));
            }
            MenuCommand::OpenProject => {
                self.diagnostics.record("Open Project clicked");
            }
            MenuCommand::OpenDevTools => {
                if self.registry.open_dev_tools(WindowRole::Main, cx) {
                    self.diagnostics.record("Attempted to open DevTools");
                } else {
                    self.diagnostics
                        .record("Failed to open DevTools: main window is not open");
                }
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn handle_lifecycle(&mut self, event: LifecycleEvent, cx: &mut B::Context) {
        match event.kind {
            LifecycleKind::Ready => {
                self.registry.handle_ready(event.id, cx);
            }
            LifecycleKind::Closed => {
                let role = self.registry.handle_closed(event.id);
                if role == Some(WindowRole::SaveProject) {
                    self.session.complete_save();
                    self.open(WindowRole::NewProject, None, None, cx);
                    self.diagnostics
                        .record("Save project window closed, opening new project window");
                }
                if role.is_some() && self.registry.backend().open_window_count(cx) == 0 {
                    if self.quit_on_last_window_closed {
                        self.diagnostics.record("All windows closed, quitting");
                        self.registry.backend_mut().quit(cx);
                    } else {
                        tracing::info!("All windows closed, staying alive");
                    }
                }
            }
        }
    }

    fn open(
        &mut self,
        role: WindowRole,
        seed: Option<WindowMessage>,
        size: Option<WindowSize>,
        cx: &mut B::Context,
    ) -> Option<OpenOutcome> {
        match self.registry.open_or_focus(role, seed, size, cx) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                match e.severity() {
                    ErrorSeverity::Error => {
                        tracing::error!(role = role.as_str(), error = %e, "Window construction failed")
                    }
                    ErrorSeverity::Warning => {
                        tracing::warn!(role = role.as_str(), error = %e, "Window construction failed")
                    }
                }
                self.diagnostics.record(e.to_string());
                if role != WindowRole::Main {
                    let notice = WindowMessage::UpdateMainContent {
                        message: e.user_message(),
                    };
                    self.registry.send(WindowRole::Main, notice, cx);
                }
                None
            }
        }
    }
}

async fn resolve_snapshot(ticket: SnapshotTicket) -> Result<RenderPayload> {
    match ticket.recv().await {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(message)) => Err(StudioError::Evaluation(message)),
        Err(_) => Err(StudioError::Evaluation(
            "window content went away before answering".to_string(),
        )),
    }
}

/// Largest edge an Output window may take from a snapshot, in logical pixels
const MAX_OUTPUT_EDGE: f64 = 8192.0;

/// Output windows take the snapshot's dimensions when they are usable,
/// capped at [`MAX_OUTPUT_EDGE`]
fn payload_size(payload: &RenderPayload) -> Option<WindowSize> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if usable(payload.width) && usable(payload.height) {
        Some(WindowSize {
            width: payload.width.min(MAX_OUTPUT_EDGE),
            height: payload.height.min(MAX_OUTPUT_EDGE),
        })
    } else {
        None
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
