//! Per-extension load outcomes

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::application::errors::ExtensionError;
use crate::domain::entities::LoadPhase;

/// Result of loading one extension directory
#[derive(Debug)]
pub struct ExtensionOutcome {
    pub name: String,
    pub path: PathBuf,
    /// Number of commands registered on success
    pub result: Result<usize, ExtensionError>,
}

impl ExtensionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&ExtensionError> {
        self.result.as_ref().err()
    }

    pub fn failed_phase(&self) -> Option<LoadPhase> {
        self.error().and_then(ExtensionError::phase)
    }
}

/// Outcome of one pass over an extension root
#[derive(Debug)]
pub struct LoadReport {
    pub root: PathBuf,
    pub outcomes: Vec<ExtensionOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn commands(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    pub fn outcome(&self, name: &str) -> Option<&ExtensionOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} extension(s) loaded, {} failed, {} command(s) registered in {} ms",
            self.succeeded(),
            self.failed(),
            self.commands(),
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}
