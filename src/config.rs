//! Plugins directory resolution.
//!
//! The directory holding `registries.yml` comes from `TERMINUS_PLUGINS_DIR`
//! when set, otherwise `<home>/terminus/plugins/`. It is created on demand.

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::{TerminusError, TerminusResult};

/// Environment variable overriding the plugins directory.
pub const PLUGINS_DIR_ENV: &str = "TERMINUS_PLUGINS_DIR";

/// Resolve the plugins directory, creating it if it does not exist.
pub fn plugins_dir() -> TerminusResult<PathBuf> {
    let dir = match env::var(PLUGINS_DIR_ENV) {
        Ok(raw) if !raw.trim().is_empty() => normalize_dir(&raw),
        _ => dirs::home_dir()
            .ok_or(TerminusError::NoHomeDir)?
            .join("terminus")
            .join("plugins"),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Strip trailing path separators from an override value.
fn normalize_dir(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_end_matches(['/', '\\']))
}
