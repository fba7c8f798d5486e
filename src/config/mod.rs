//! User settings read from `~/.blueprint-studio/config.json`.
//!
//! The file is optional and so is every field in it; [`Config`] accessors fill
//! in defaults from `defaults`. A file that can't be read or parsed is logged
//! and ignored.

mod defaults;
mod loader;
mod types;

pub use defaults::{
    APP_NAME, DEFAULT_CONFIG_PATH, DEFAULT_DEV_TOOLS_ACCELERATOR, DEFAULT_DIAGNOSTICS_FILE,
};

pub use types::Config;

pub use loader::{load_config, load_config_from, parse_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
