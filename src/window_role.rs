//! Window roles and their creation parameters
//!
//! Every window the shell opens belongs to exactly one [`WindowRole`]. The role
//! decides which content document the window loads, its default size, and how
//! it relates to the main window (parented, modal, resizable).

use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// Identifies which window we're tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowRole {
    Main,
    NewProject,
    SaveProject,
    ColorPicker,
    Code,
    Blueprint,
    Output,
}

impl WindowRole {
    pub const ALL: [WindowRole; 7] = [
        WindowRole::Main,
        WindowRole::NewProject,
        WindowRole::SaveProject,
        WindowRole::ColorPicker,
        WindowRole::Code,
        WindowRole::Blueprint,
        WindowRole::Output,
    ];

    /// Get a lowercase string key for config and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowRole::Main => "main",
            WindowRole::NewProject => "new-project",
            WindowRole::SaveProject => "save-project",
            WindowRole::ColorPicker => "color-picker",
            WindowRole::Code => "code",
            WindowRole::Blueprint => "blueprint",
            WindowRole::Output => "output",
        }
    }

    /// Get a human-readable name for logging and titles
    pub fn name(&self) -> &'static str {
        match self {
            WindowRole::Main => "Main",
            WindowRole::NewProject => "New Project",
            WindowRole::SaveProject => "Save Project",
            WindowRole::ColorPicker => "Color Picker",
            WindowRole::Code => "Code",
            WindowRole::Blueprint => "Blueprint",
            WindowRole::Output => "Output",
        }
    }

    /// The content document this role loads
    pub fn document(&self) -> &'static str {
        match self {
            WindowRole::Main => "index.html",
            WindowRole::NewProject => "new-project.html",
            WindowRole::SaveProject => "save-project.html",
            WindowRole::ColorPicker => "color-picker.html",
            WindowRole::Code => "code-window.html",
            WindowRole::Blueprint => "blueprint-window.html",
            WindowRole::Output => "output-window.html",
        }
    }

    /// Every role except Main waits for its content before becoming visible
    pub fn defers_show(&self) -> bool {
        !matches!(self, WindowRole::Main)
    }

    /// Default window size in logical pixels
    pub fn default_size(&self) -> WindowSize {
        let (width, height) = match self {
            WindowRole::Main => (800.0, 600.0),
            WindowRole::NewProject => (500.0, 400.0),
            WindowRole::SaveProject => (400.0, 300.0),
            WindowRole::ColorPicker => (300.0, 200.0),
            WindowRole::Code => (600.0, 400.0),
            WindowRole::Blueprint => (800.0, 600.0),
            WindowRole::Output => (800.0, 600.0),
        };
        WindowSize { width, height }
    }

    pub fn is_modal(&self) -> bool {
        matches!(self, WindowRole::SaveProject | WindowRole::ColorPicker)
    }

    pub fn is_resizable(&self) -> bool {
        !matches!(
            self,
            WindowRole::NewProject
                | WindowRole::SaveProject
                | WindowRole::ColorPicker
                | WindowRole::Code
        )
    }

    pub fn is_maximized(&self) -> bool {
        matches!(self, WindowRole::Main | WindowRole::Blueprint)
    }

    /// Auxiliary windows are children of Main; Output stands alone
    pub fn has_parent(&self) -> bool {
        !matches!(self, WindowRole::Main | WindowRole::Output)
    }
}

impl std::fmt::Display for WindowRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

/// Everything a backend needs to construct a native window for a role
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub role: WindowRole,
    pub title: String,
    pub document: &'static str,
    pub size: WindowSize,
    pub modal: bool,
    pub resizable: bool,
    pub maximized: bool,
    pub parented: bool,
    /// false: created hidden, shown once content reports ready
    pub show_immediately: bool,
}

impl WindowSpec {
    pub fn for_role(role: WindowRole, size: WindowSize) -> Self {
        Self {
            role,
            title: role.name().to_string(),
            document: role.document(),
            size,
            modal: role.is_modal(),
            resizable: role.is_resizable(),
            maximized: role.is_maximized(),
            parented: role.has_parent(),
            show_immediately: !role.defers_show(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_main_shows_immediately() {
        for role in WindowRole::ALL {
            let spec = WindowSpec::for_role(role, role.default_size());
            assert_eq!(spec.show_immediately, role == WindowRole::Main, "{:?}", role);
        }
    }

    #[test]
    fn test_role_keys_are_kebab_case() {
        assert_eq!(WindowRole::ColorPicker.as_str(), "color-picker");
        let json = serde_json::to_string(&WindowRole::SaveProject).unwrap();
        assert_eq!(json, "\"save-project\"");
        let role: WindowRole = serde_json::from_str("\"new-project\"").unwrap();
        assert_eq!(role, WindowRole::NewProject);
    }

    #[test]
    fn test_dialog_roles_are_modal_and_fixed_size() {
        assert!(WindowRole::SaveProject.is_modal());
        assert!(WindowRole::ColorPicker.is_modal());
        assert!(!WindowRole::Code.is_modal());
        assert!(!WindowRole::ColorPicker.is_resizable());
        assert!(WindowRole::Blueprint.is_resizable());
    }

    #[test]
    fn test_output_is_not_parented() {
        assert!(!WindowRole::Output.has_parent());
        assert!(WindowRole::Code.has_parent());
    }
}
