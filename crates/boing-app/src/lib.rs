//! Application plumbing around the boing core: tick driver, sinks and config loading.

use anyhow::{Context, Result};
use boing_core::StageConfig;
use std::fs;
use std::path::Path;

pub mod driver;
pub mod frames;
pub mod osc;
pub mod sinks;

pub use driver::{RunOptions, run};
pub use frames::render_frame;
pub use osc::OscSink;
pub use sinks::LogSink;

/// Read a JSON stage configuration, or the built-in performance when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<StageConfig> {
    let Some(path) = path else {
        return Ok(StageConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: StageConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
