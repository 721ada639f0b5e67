//! Error types for the terminus-plugins CLI.
//!
//! Only broken-environment conditions are errors: a syntactically invalid
//! registry URL or a registries file that cannot be read, parsed or written.
//! Expected conditions (registry already added, registry not found, no
//! plugins matched) are reported through outcome values instead and never
//! abort the command.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type TerminusResult<T> = Result<T, TerminusError>;

#[derive(Debug, Error)]
pub enum TerminusError {
    #[error("{0} is not a valid URL.")]
    InvalidUrl(String),

    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("Unable to {op} plugin registry. {message}")]
    RegistrySave { op: &'static str, message: String },

    #[error("Failed to parse {}: {source}", .path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
