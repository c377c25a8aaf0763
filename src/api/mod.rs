//! Embedding API: the session registry plus a few top-level helpers for
//! hosts that load settings and tracing themselves.

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::Engine;
pub use types::{EngineError, SessionId};

use std::path::Path;

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Load a settings file. Must run before anything reads the settings.
pub fn settings_load_config(path: &Path) -> Result<(), EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
        msg: format!("{}: {e}", path.display()),
    })?;
    recast_core::settings::init_custom(content)
        .map_err(|e| EngineError::Config { msg: e.to_string() })
}

pub fn settings_default_config() -> String {
    recast_core::settings::DEFAULT_SETTINGS_TOML.to_string()
}

pub fn trace_init(log_dir: &Path) {
    crate::trace_init::init_tracing(log_dir);
}
