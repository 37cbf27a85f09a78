//! Error types for the switching engine.
//!
//! Every failure names the library, target or file it concerns so the CLI can
//! print it without looking into engine internals.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading a project or switching a library.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("could not find package.json in {} or any parent directory", start.display())]
    ManifestNotFound { start: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("library {name} missing config: {field}")]
    InvalidLibraryConfig { name: String, field: &'static str },

    #[error("library \"{name}\" not found in config")]
    LibraryNotFound { name: String },

    #[error("failed to install {target}: {cause}")]
    InstallFailed { target: String, cause: String },

    #[error("failed to parse {}: {cause}", path.display())]
    AliasConfigParse { path: PathBuf, cause: String },

    #[error("failed to write {}: {source}", path.display())]
    AliasConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, SwitchError>;

impl SwitchError {
    /// Failures that stop the engine from being constructed at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SwitchError::ManifestNotFound { .. }
                | SwitchError::ManifestRead { .. }
                | SwitchError::ManifestParse { .. }
                | SwitchError::InvalidLibraryConfig { .. }
        )
    }
}
