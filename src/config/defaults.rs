//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Application name shown in the app menu and window titles
pub const APP_NAME: &str = "Blueprint Studio";

/// Where the config file lives unless overridden on the command line
pub const DEFAULT_CONFIG_PATH: &str = "~/.blueprint-studio/config.json";

/// Diagnostics file, relative to the working directory
pub const DEFAULT_DIAGNOSTICS_FILE: &str = "debug.log";

/// Directory for the JSONL tracing log
pub const DEFAULT_LOG_DIR: &str = "~/.blueprint-studio/logs";

/// Cmd+Shift+I on macOS, Ctrl+Shift+I elsewhere
pub const DEFAULT_DEV_TOOLS_ACCELERATOR: &str = "secondary-shift-i";

/// macOS apps conventionally stay alive with no windows open
pub const DEFAULT_QUIT_ON_LAST_WINDOW_CLOSED: bool = !cfg!(target_os = "macos");
