//! Extension manifest definition

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::application::errors::ExtensionError;

/// Manifest file name inside an extension directory
pub const MANIFEST_FILE: &str = "extension.yaml";

/// Extension metadata, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionManifest {
    /// Overrides the directory name
    pub name: Option<String>,

    pub version: Option<String>,

    pub description: Option<String>,

    pub author: Option<String>,
}

impl ExtensionManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtensionError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExtensionError::Manifest(format!("Failed to read manifest: {}", e)))?;

        // An empty file is a manifest with nothing declared
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .map_err(|e| ExtensionError::Manifest(format!("Failed to parse manifest: {}", e)))
    }

    /// Read `extension.yaml` from an extension root, if there is one
    pub fn discover(root: &Path) -> Result<Option<Self>, ExtensionError> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    /// Declared name, ignoring blanks
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}
