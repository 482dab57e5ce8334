//! Error types for Repoguard
//!
//! Only failures that pre-empt a guard run live here. Policy violations found
//! while evaluating staged files are not errors in this sense; they are
//! accumulated as [`crate::Finding`]s inside a [`crate::Decision`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using Repoguard's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal Repoguard errors.
///
/// Any of these stops the run before a report is produced.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file does not exist.
    #[error("Missing config: {}", .0.display())]
    ConfigMissing(PathBuf),

    /// The configuration file exists but could not be parsed.
    #[error("invalid config {}: {message}", path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    /// No `repos` entry matches the resolved repository root.
    #[error("No repo entry for root: {0}")]
    RepoEntryMissing(String),

    /// A repository-state command could not be run or failed.
    #[error("git error: {0}")]
    Git(String),

    /// I/O error while reading the configuration file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config parse error for the given file.
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable, machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::ConfigMissing(_) => "config_missing",
            Error::ConfigInvalid { .. } => "config_invalid",
            Error::RepoEntryMissing(_) => "repo_entry_missing",
            Error::Git(_) => "git",
            Error::Io(_) => "io",
        }
    }
}
