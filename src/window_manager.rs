//! Window Manager Module for Blueprint Studio
//!
//! Tracks at most one live window per [`WindowRole`] and drives each window's
//! lifecycle through a [`WindowBackend`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ open_or_focus(role) ┌─────────────────────────────┐
//! │ Shell        │────────────────────▶│ WindowRegistry              │
//! │ (signals,    │                     │  windows: role -> entry     │
//! │  menu)       │◀── Ready / Closed ──│  entry: id, seed, shown     │
//! └──────────────┘   (via inbox)       └──────────────┬──────────────┘
//!                                                     │ open/show/focus/
//!                                                     │ send/close
//!                                                     ▼
//!                                      ┌─────────────────────────────┐
//!                                      │ WindowBackend (gpui / mock) │
//!                                      └─────────────────────────────┘
//! ```
//!
//! Non-main windows are created hidden. When the backend reports `Ready`, any
//! seed message (initial color, output payload) is pushed into the window and
//! only then is it shown. A `Closed` event clears the entry for its role.
//!
//! Lifecycle events carry a [`WindowId`] rather than a role, so a late `Closed`
//! for an old instance never clears a newer window of the same role.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::logging;
use crate::protocol::{RenderPayload, WindowMessage};
pub use crate::window_role::{WindowRole, WindowSize, WindowSpec};

/// Registry-assigned identifier for one native window instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    /// Initial content finished loading
    Ready,
    /// Native window is gone
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub id: WindowId,
    pub kind: LifecycleKind,
}

impl LifecycleEvent {
    pub fn ready(id: WindowId) -> Self {
        Self {
            id,
            kind: LifecycleKind::Ready,
        }
    }

    pub fn closed(id: WindowId) -> Self {
        Self {
            id,
            kind: LifecycleKind::Closed,
        }
    }
}

/// Pending answer to a snapshot request. Never answered means never resolved.
pub type SnapshotTicket = async_channel::Receiver<std::result::Result<RenderPayload, String>>;

/// The native windowing surface.
///
/// Implementations report `Ready` and `Closed` asynchronously through the
/// shell's inbox; none of these calls may re-enter the registry.
pub trait WindowBackend {
    /// Whatever the native toolkit needs to touch windows (`gpui::App`, `()`)
    type Context;

    fn open(&mut self, id: WindowId, spec: &WindowSpec, cx: &mut Self::Context) -> Result<()>;
    fn show(&mut self, id: WindowId, cx: &mut Self::Context);
    fn focus(&mut self, id: WindowId, cx: &mut Self::Context);
    fn maximize(&mut self, id: WindowId, cx: &mut Self::Context);
    fn close(&mut self, id: WindowId, cx: &mut Self::Context);
    fn send(&mut self, id: WindowId, message: WindowMessage, cx: &mut Self::Context);
    fn request_snapshot(&mut self, id: WindowId, cx: &mut Self::Context) -> SnapshotTicket;
    fn open_dev_tools(&mut self, id: WindowId, cx: &mut Self::Context);
    fn open_window_count(&self, cx: &Self::Context) -> usize;
    fn quit(&mut self, cx: &mut Self::Context);
}

/// Result of an open request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created(WindowId),
    /// A window for the role already existed and was brought forward
    Focused(WindowId),
}

impl OpenOutcome {
    pub fn id(&self) -> WindowId {
        match self {
            OpenOutcome::Created(id) | OpenOutcome::Focused(id) => *id,
        }
    }
}

#[derive(Debug)]
struct WindowEntry {
    id: WindowId,
    spec: WindowSpec,
    /// Delivered right before the window is first shown
    seed: Option<WindowMessage>,
    shown: bool,
}

/// Keyed mapping from role to its one live window
pub struct WindowRegistry<B: WindowBackend> {
    backend: B,
    windows: HashMap<WindowRole, WindowEntry>,
    sizes: HashMap<WindowRole, WindowSize>,
    next_id: u64,
    diagnostics: Diagnostics,
}

impl<B: WindowBackend> WindowRegistry<B> {
    pub fn new(backend: B, diagnostics: Diagnostics) -> Self {
        Self {
            backend,
            windows: HashMap::new(),
            sizes: HashMap::new(),
            next_id: 1,
            diagnostics,
        }
    }

    /// Override the default size for a role
    pub fn set_size(&mut self, role: WindowRole, size: WindowSize) {
        self.sizes.insert(role, size);
    }

    pub fn size_for(&self, role: WindowRole) -> WindowSize {
        self.sizes
            .get(&role)
            .copied()
            .unwrap_or_else(|| role.default_size())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_open(&self, role: WindowRole) -> bool {
        self.windows.contains_key(&role)
    }

    pub fn id_of(&self, role: WindowRole) -> Option<WindowId> {
        self.windows.get(&role).map(|entry| entry.id)
    }

    pub fn role_of(&self, id: WindowId) -> Option<WindowRole> {
        self.windows
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(role, _)| *role)
    }

    /// Roles with a live window, in declaration order
    pub fn open_roles(&self) -> Vec<WindowRole> {
        let mut roles: Vec<WindowRole> = self.windows.keys().copied().collect();
        roles.sort();
        roles
    }

    /// Focus the existing window for `role`, or create one.
    ///
    /// `seed` is only used when a window is created; an existing window is
    /// focused as-is without being re-seeded.
    pub fn open_or_focus(
        &mut self,
        role: WindowRole,
        seed: Option<WindowMessage>,
        size: Option<WindowSize>,
        cx: &mut B::Context,
    ) -> Result<OpenOutcome> {
        if let Some(entry) = self.windows.get(&role) {
            let id = entry.id;
            tracing::debug!(role = role.as_str(), id = id.0, "Focusing existing window");
            self.backend.focus(id, cx);
            return Ok(OpenOutcome::Focused(id));
        }

        let id = WindowId(self.next_id);
        self.next_id += 1;

        let spec = WindowSpec::for_role(role, size.unwrap_or_else(|| self.size_for(role)));
        self.backend.open(id, &spec, cx)?;
        logging::log_window_event(role.as_str(), id.0, "created");

        let mut entry = WindowEntry {
            id,
            spec,
            seed,
            shown: false,
        };

        if entry.spec.show_immediately {
            if entry.spec.maximized {
                self.backend.maximize(id, cx);
            }
            self.backend.show(id, cx);
            entry.shown = true;
            self.diagnostics
                .record(format!("{} window loaded: {}", role.name(), role.document()));
        }

        self.windows.insert(role, entry);
        Ok(OpenOutcome::Created(id))
    }

    /// Content for `id` finished loading: seed it, then make it visible.
    pub fn handle_ready(&mut self, id: WindowId, cx: &mut B::Context) -> Option<WindowRole> {
        let role = self.role_of(id)?;
        let entry = self.windows.get_mut(&role)?;

        if entry.shown {
            self.diagnostics.record(format!(
                "{} window finished loading, DevTools available",
                role.name()
            ));
            return Some(role);
        }

        let seeded = entry.seed.take();
        let detail = match &seeded {
            Some(WindowMessage::SetInitialColor { target, .. }) => {
                format!(", type: {}", target.as_str())
            }
            _ => String::new(),
        };
        if let Some(message) = seeded {
            self.backend.send(id, message, cx);
        }
        if entry.spec.maximized {
            self.backend.maximize(id, cx);
        }
        self.backend.show(id, cx);
        entry.shown = true;

        self.diagnostics.record(format!(
            "{} window shown: {}{}",
            role.name(),
            role.document(),
            detail
        ));
        Some(role)
    }

    /// The native window for `id` is gone. Returns the role that was cleared.
    pub fn handle_closed(&mut self, id: WindowId) -> Option<WindowRole> {
        let role = match self.role_of(id) {
            Some(role) => role,
            None => {
                tracing::debug!(id = id.0, "Closed event for untracked window");
                return None;
            }
        };
        self.windows.remove(&role);
        logging::log_window_event(role.as_str(), id.0, "closed");
        self.diagnostics.record(format!("{} window closed", role.name()));
        Some(role)
    }

    /// Ask the backend to close the window for `role`. The entry is cleared
    /// when the backend reports `Closed`.
    pub fn close(&mut self, role: WindowRole, cx: &mut B::Context) -> bool {
        match self.id_of(role) {
            Some(id) => {
                self.backend.close(id, cx);
                true
            }
            None => false,
        }
    }

    /// Push a message into the window for `role`. False if it isn't open.
    pub fn send(&mut self, role: WindowRole, message: WindowMessage, cx: &mut B::Context) -> bool {
        match self.id_of(role) {
            Some(id) => {
                self.backend.send(id, message, cx);
                true
            }
            None => false,
        }
    }

    pub fn request_snapshot(
        &mut self,
        role: WindowRole,
        cx: &mut B::Context,
    ) -> Option<SnapshotTicket> {
        let id = self.id_of(role)?;
        Some(self.backend.request_snapshot(id, cx))
    }

    pub fn open_dev_tools(&mut self, role: WindowRole, cx: &mut B::Context) -> bool {
        match self.id_of(role) {
            Some(id) => {
                self.backend.open_dev_tools(id, cx);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Recording backend for tests
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::StudioError;
    use std::cell::RefCell;
    use std::collections::{BTreeSet, VecDeque};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum BackendCall {
        Open(WindowId, WindowRole),
        Show(WindowId),
        Focus(WindowId),
        Maximize(WindowId),
        Close(WindowId),
        Send(WindowId, WindowMessage),
        Snapshot(WindowId),
        DevTools(WindowId),
        Quit,
    }

    #[derive(Default)]
    pub struct MockState {
        pub calls: Vec<BackendCall>,
        pub roles: HashMap<WindowId, WindowRole>,
        pub live: BTreeSet<WindowId>,
        /// Lifecycle events the "platform" has produced but nobody consumed yet
        pub pending: VecDeque<LifecycleEvent>,
        pub fail_open: Option<WindowRole>,
        /// None: snapshot requests are never answered
        pub snapshot: Option<std::result::Result<RenderPayload, String>>,
        /// Senders for unanswered snapshot requests, kept alive so they hang
        pub parked: Vec<async_channel::Sender<std::result::Result<RenderPayload, String>>>,
        pub quit: bool,
    }

    /// Records every call and emits Ready on open / Closed on close.
    #[derive(Clone, Default)]
    pub struct MockBackend {
        pub state: Rc<RefCell<MockState>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<BackendCall> {
            self.state.borrow().calls.clone()
        }

        pub fn clear_calls(&self) {
            self.state.borrow_mut().calls.clear();
        }

        pub fn opens_of(&self, role: WindowRole) -> usize {
            self.state
                .borrow()
                .calls
                .iter()
                .filter(|call| matches!(call, BackendCall::Open(_, r) if *r == role))
                .count()
        }

        pub fn sent_to(&self, id: WindowId) -> Vec<WindowMessage> {
            self.state
                .borrow()
                .calls
                .iter()
                .filter_map(|call| match call {
                    BackendCall::Send(target, message) if *target == id => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn take_pending(&self) -> Option<LifecycleEvent> {
            self.state.borrow_mut().pending.pop_front()
        }

        /// Simulate the user closing a window from its title bar
        pub fn user_closes(&self, id: WindowId) {
            let mut state = self.state.borrow_mut();
            state.live.remove(&id);
            state.pending.push_back(LifecycleEvent::closed(id));
        }
    }

    impl WindowBackend for MockBackend {
        type Context = ();

        fn open(&mut self, id: WindowId, spec: &WindowSpec, _cx: &mut ()) -> Result<()> {
            let mut state = self.state.borrow_mut();
            if state.fail_open == Some(spec.role) {
                return Err(StudioError::WindowOpen {
                    role: spec.role.name().to_string(),
                    message: "mock refused".to_string(),
                });
            }
            state.calls.push(BackendCall::Open(id, spec.role));
            state.roles.insert(id, spec.role);
            state.live.insert(id);
            state.pending.push_back(LifecycleEvent::ready(id));
            Ok(())
        }

        fn show(&mut self, id: WindowId, _cx: &mut ()) {
            self.state.borrow_mut().calls.push(BackendCall::Show(id));
        }

        fn focus(&mut self, id: WindowId, _cx: &mut ()) {
            self.state.borrow_mut().calls.push(BackendCall::Focus(id));
        }

        fn maximize(&mut self, id: WindowId, _cx: &mut ()) {
            self.state.borrow_mut().calls.push(BackendCall::Maximize(id));
        }

        fn close(&mut self, id: WindowId, _cx: &mut ()) {
            let mut state = self.state.borrow_mut();
            state.calls.push(BackendCall::Close(id));
            if state.live.remove(&id) {
                state.pending.push_back(LifecycleEvent::closed(id));
            }
        }

        fn send(&mut self, id: WindowId, message: WindowMessage, _cx: &mut ()) {
            self.state
                .borrow_mut()
                .calls
                .push(BackendCall::Send(id, message));
        }

        fn request_snapshot(&mut self, id: WindowId, _cx: &mut ()) -> SnapshotTicket {
            let (tx, rx) = async_channel::bounded(1);
            let mut state = self.state.borrow_mut();
            state.calls.push(BackendCall::Snapshot(id));
            match state.snapshot.clone() {
                Some(result) => {
                    let _ = tx.try_send(result);
                }
                None => state.parked.push(tx),
            }
            rx
        }

        fn open_dev_tools(&mut self, id: WindowId, _cx: &mut ()) {
            self.state.borrow_mut().calls.push(BackendCall::DevTools(id));
        }

        fn open_window_count(&self, _cx: &()) -> usize {
            self.state.borrow().live.len()
        }

        fn quit(&mut self, _cx: &mut ()) {
            let mut state = self.state.borrow_mut();
            state.calls.push(BackendCall::Quit);
            state.quit = true;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
