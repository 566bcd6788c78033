//! Installing extensions from remote git repositories

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::errors::ExtensionError;
use crate::domain::entities::RepoReference;

/// Materializes a remote repository at a local path
#[async_trait]
pub trait RepoCloner: Send + Sync {
    /// Clone `url` into `destination`, which does not exist yet
    async fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), ExtensionError>;
}

/// Clones with the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl RepoCloner for GitCli {
    async fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), ExtensionError> {
        let output = tokio::process::Command::new(&self.program)
            .arg("clone")
            .arg("--quiet")
            .arg(url)
            .arg(destination)
            .output()
            .await
            .map_err(|e| ExtensionError::Install {
                url: url.to_string(),
                reason: format!("Failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} clone exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(ExtensionError::Install {
                url: url.to_string(),
                reason,
            });
        }

        Ok(())
    }
}

/// Installs extension repositories under a target directory
pub struct RepoFetcher {
    cloner: Box<dyn RepoCloner>,
}

impl RepoFetcher {
    pub fn new() -> Self {
        Self::with_cloner(GitCli::default())
    }

    pub fn with_cloner(cloner: impl RepoCloner + 'static) -> Self {
        Self {
            cloner: Box::new(cloner),
        }
    }

    /// Local directory name for `url`
    pub fn derive_name(url: &str) -> Option<String> {
        RepoReference::derive_name(url)
    }

    /// Clone `url` into `target_root/<derived name>` unless it is already there.
    ///
    /// An existing directory counts as installed and is returned unchanged.
    pub async fn install(&self, url: &str, target_root: &Path) -> Result<PathBuf, ExtensionError> {
        let reference = RepoReference::parse(url);
        let Some(name) = reference.derived_name else {
            return Err(ExtensionError::MalformedRepoUrl(url.to_string()));
        };

        let destination = target_root.join(&name);
        if destination.exists() {
            tracing::info!(
                extension = %name,
                path = %destination.display(),
                "Extension already installed"
            );
            return Ok(destination);
        }

        tokio::fs::create_dir_all(target_root)
            .await
            .map_err(|e| ExtensionError::Install {
                url: url.to_string(),
                reason: format!("Failed to create {}: {}", target_root.display(), e),
            })?;

        tracing::info!(url = %url, path = %destination.display(), "Cloning extension");
        if let Err(e) = self.cloner.clone_repo(url, &destination).await {
            if destination.exists() {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&destination).await {
                    tracing::warn!(
                        path = %destination.display(),
                        error = %cleanup,
                        "Failed to remove partial clone"
                    );
                }
            }
            tracing::error!(url = %url, error = %e, "Extension install failed");
            return Err(e);
        }

        tracing::info!(extension = %name, "Extension installed");
        Ok(destination)
    }
}

impl Default for RepoFetcher {
    fn default() -> Self {
        Self::new()
    }
}
