//! One on-disk extension and its load hooks

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::errors::ExtensionError;
use crate::domain::entities::DiscoveryState;
use crate::domain::traits::CommandHandler;
use crate::i18n::{self, TextResourceStore};
use crate::infrastructure::plugins::{ExtensionManifest, ServiceLoader};

/// An extension directory known to the loader
#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    name: String,
    root_path: PathBuf,
    state: DiscoveryState,
    manifest: Option<ExtensionManifest>,
}

impl ExtensionDescriptor {
    pub const LOCALE_DIR: &'static str = "locale";
    pub const SERVICES_DIR: &'static str = "services";

    /// Descriptor named after the directory
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        let name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.display().to_string());

        Self {
            name,
            root_path,
            state: DiscoveryState::Discovered,
            manifest: None,
        }
    }

    /// Descriptor for `root_path`, named by its manifest when it declares a name
    pub fn discover(root_path: impl Into<PathBuf>) -> Result<Self, ExtensionError> {
        let mut descriptor = Self::new(root_path);

        if let Some(manifest) = ExtensionManifest::discover(&descriptor.root_path)? {
            if let Some(name) = manifest.declared_name() {
                descriptor.name = name.to_string();
            }
            descriptor.manifest = Some(manifest);
        }

        Ok(descriptor)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    pub fn manifest(&self) -> Option<&ExtensionManifest> {
        self.manifest.as_ref()
    }

    pub fn locale_dir(&self) -> PathBuf {
        self.root_path.join(Self::LOCALE_DIR)
    }

    pub fn services_dir(&self) -> PathBuf {
        self.root_path.join(Self::SERVICES_DIR)
    }

    pub(crate) fn set_state(&mut self, state: DiscoveryState) {
        self.state = state;
    }

    /// Merge `locale/` into the store under this extension's namespace.
    ///
    /// Returns the number of locales merged; no `locale/` directory means zero.
    pub fn load_locale(&self, store: &mut TextResourceStore) -> Result<usize, ExtensionError> {
        let dir = self.locale_dir();
        if !dir.is_dir() {
            tracing::debug!(extension = %self.name, "No locale directory");
            return Ok(0);
        }

        let locales = i18n::ingest_directory(&dir)?;
        let count = locales.len();
        store.merge(locales, Some(self.name.as_str()));
        Ok(count)
    }

    /// Load every unit in `services/` and collect the handlers they export.
    ///
    /// Files are visited in name order; hidden files and files no loader
    /// supports are skipped.
    pub fn load_services(
        &self,
        loaders: &mut [Box<dyn ServiceLoader>],
    ) -> Result<Vec<Arc<dyn CommandHandler>>, ExtensionError> {
        let dir = self.services_dir();
        if !dir.is_dir() {
            tracing::debug!(extension = %self.name, "No services directory");
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                !path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with('.'))
                    .unwrap_or(true)
            })
            .collect();
        files.sort();

        let mut handlers = Vec::new();
        for path in files {
            let Some(loader) = loaders.iter_mut().find(|l| l.supports(&path)) else {
                tracing::debug!(
                    extension = %self.name,
                    path = %path.display(),
                    "No loader for file, skipping"
                );
                continue;
            };

            let unit = loader.load(&path)?;
            unit.init()?;

            let exported = unit.handlers();
            tracing::debug!(
                extension = %self.name,
                unit = %unit.name(),
                handlers = exported.len(),
                "Service unit loaded"
            );
            handlers.extend(exported);
        }

        Ok(handlers)
    }
}
