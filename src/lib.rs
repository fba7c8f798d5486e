//! Blueprint Studio - a multi-window desktop shell for a visual layout designer
//!
//! The shell owns every window, routes signals between window content, and
//! tracks whether the current project has unsaved work. Window content is
//! hosted by gpui in the binary; everything here is toolkit-agnostic apart
//! from [`surface`].

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod menu_bar;
pub mod protocol;
pub mod session;
pub mod shell;
pub mod stdin_commands;
pub mod surface;
pub mod window_manager;
pub mod window_role;
