//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::LoadPhase;

/// Extension install and load errors
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Malformed repository URL: {0}")]
    MalformedRepoUrl(String),

    #[error("Failed to install {url}: {reason}")]
    Install { url: String, reason: String },

    #[error("Extension '{extension}' failed in {phase} phase: {source}")]
    LoadPhase {
        extension: String,
        phase: LoadPhase,
        source: Box<ExtensionError>,
    },

    #[error(
        "Duplicate extension '{name}': already loaded from {}, rejected {}",
        .existing.display(),
        .rejected.display()
    )]
    Duplicate {
        name: String,
        existing: PathBuf,
        rejected: PathBuf,
    },

    #[error("Command '{command}' already registered by extension '{owner}'")]
    CommandConflict { command: String, owner: String },

    #[error("Locale error: {0}")]
    Locale(#[from] LocaleError),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Service unit error: {0}")]
    ServiceUnit(String),

    #[error("Extension panicked: {0}")]
    Panicked(String),

    #[error("Extension not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtensionError {
    /// Phase a load failure happened in, if this is a load failure
    pub fn phase(&self) -> Option<LoadPhase> {
        match self {
            ExtensionError::LoadPhase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// True for both ways an install can fail
    pub fn is_install_error(&self) -> bool {
        matches!(
            self,
            ExtensionError::Install { .. } | ExtensionError::MalformedRepoUrl(_)
        )
    }
}

/// Locale file errors
#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to walk locale directory: {0}")]
    Walk(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Configuration and settings errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
