//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::defaults::*;
use crate::bridge::DEFAULT_BRIDGE_ALLOW_LIST;
use crate::window_role::{WindowRole, WindowSize};

/// User configuration. Every field is optional; accessors supply defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Diagnostics log file (default: ./debug.log)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics_path: Option<String>,
    /// Directory for the JSONL tracing log (default: ~/.blueprint-studio/logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    /// Per-role size overrides, keyed by role name ("code", "color-picker", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_sizes: Option<BTreeMap<WindowRole, WindowSize>>,
    /// Keystroke for "Open Developer Tools" (default: secondary-shift-i)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_tools_accelerator: Option<String>,
    /// Signals the new-project dialog may send (default: ["project-created"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_allow_list: Option<Vec<String>>,
    /// Quit when the last window closes (default: false on macOS, true elsewhere)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quit_on_last_window_closed: Option<bool>,
}

impl Config {
    pub fn diagnostics_path(&self) -> PathBuf {
        expand(
            self.diagnostics_path
                .as_deref()
                .unwrap_or(DEFAULT_DIAGNOSTICS_FILE),
        )
    }

    pub fn log_dir(&self) -> PathBuf {
        expand(self.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR))
    }

    /// Size overrides with unusable (non-positive, non-finite) entries dropped
    pub fn window_sizes(&self) -> Vec<(WindowRole, WindowSize)> {
        let Some(sizes) = &self.window_sizes else {
            return Vec::new();
        };
        sizes
            .iter()
            .filter(|(role, size)| {
                let usable = size.width.is_finite()
                    && size.height.is_finite()
                    && size.width > 0.0
                    && size.height > 0.0;
                if !usable {
                    tracing::warn!(
                        role = role.as_str(),
                        width = size.width,
                        height = size.height,
                        "Ignoring invalid window size override"
                    );
                }
                usable
            })
            .map(|(role, size)| (*role, *size))
            .collect()
    }

    pub fn dev_tools_accelerator(&self) -> &str {
        self.dev_tools_accelerator
            .as_deref()
            .unwrap_or(DEFAULT_DEV_TOOLS_ACCELERATOR)
    }

    pub fn bridge_allow_list(&self) -> Vec<String> {
        match &self.bridge_allow_list {
            Some(list) => list.clone(),
            None => DEFAULT_BRIDGE_ALLOW_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn quit_on_last_window_closed(&self) -> bool {
        self.quit_on_last_window_closed
            .unwrap_or(DEFAULT_QUIT_ON_LAST_WINDOW_CLOSED)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
