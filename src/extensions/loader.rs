//! Extension loader - Drives every extension through discovery, locale,
//! services and registration

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::descriptor::ExtensionDescriptor;
use super::report::{ExtensionOutcome, LoadReport};
use crate::application::errors::ExtensionError;
use crate::application::messaging::CommandParser;
use crate::application::HostContext;
use crate::domain::entities::{DiscoveryState, LoadPhase};
use crate::domain::traits::{COMMAND_PREFIX_KEY, INSTALL_DIR_KEY};
use crate::infrastructure::git::RepoFetcher;
use crate::infrastructure::plugins::{NativeServiceLoader, ServiceLoader};

/// Loader shared with background install tasks
pub type SharedExtensionLoader = Arc<Mutex<ExtensionLoader>>;

/// Loads extensions into the host context, one at a time.
///
/// A failing extension is isolated: it ends up `Failed(phase)` and its
/// siblings load normally.
pub struct ExtensionLoader {
    context: HostContext,
    descriptors: Vec<ExtensionDescriptor>,
    service_loaders: Vec<Box<dyn ServiceLoader>>,
}

impl ExtensionLoader {
    pub const DEFAULT_PREFIX: &'static str = "/";

    /// Loader that understands native service libraries
    pub fn new(context: HostContext) -> Self {
        Self {
            context,
            descriptors: Vec::new(),
            service_loaders: vec![Box::new(NativeServiceLoader::new())],
        }
    }

    /// Add another service loader; loaders are tried in the order added
    pub fn with_service_loader(mut self, loader: impl ServiceLoader + 'static) -> Self {
        self.service_loaders.push(Box::new(loader));
        self
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    /// Extensions in the working set, in load order
    pub fn descriptors(&self) -> &[ExtensionDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.descriptors.iter().find(|d| same_name(d.name(), name))
    }

    /// Configured command prefix, `/` when unset or blank
    pub fn command_prefix(&self) -> String {
        match self.context.settings().get(COMMAND_PREFIX_KEY) {
            Some(prefix) if !prefix.trim().is_empty() => prefix,
            _ => Self::DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn command_parser(&self) -> CommandParser {
        CommandParser::new(self.command_prefix())
    }

    /// Where `install` clones to
    pub fn install_root(&self) -> PathBuf {
        self.context
            .settings()
            .get(INSTALL_DIR_KEY)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.context.extensions_dir().to_path_buf())
    }

    /// Load every subdirectory of `root`, in lexicographic order.
    ///
    /// Returns one outcome per directory. Only an unreadable `root` is an error;
    /// a missing one gives an empty report.
    pub fn load_modules(&mut self, root: impl AsRef<Path>) -> Result<LoadReport, ExtensionError> {
        let root = root.as_ref();
        let started_at = Utc::now();
        let mut outcomes = Vec::new();

        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Extension directory does not exist");
            return Ok(LoadReport {
                root: root.to_path_buf(),
                outcomes,
                started_at,
                finished_at: Utc::now(),
            });
        }

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            // Skip hidden directories
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }

            dirs.push(path);
        }
        dirs.sort();

        for path in dirs {
            outcomes.push(self.load_path(&path));
        }

        let report = LoadReport {
            root: root.to_path_buf(),
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            root = %root.display(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            commands = report.commands(),
            "Extensions loaded"
        );
        Ok(report)
    }

    /// Discover and load the extension at `path`
    pub fn load_path(&mut self, path: &Path) -> ExtensionOutcome {
        let descriptor = match ExtensionDescriptor::discover(path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                let name = ExtensionDescriptor::new(path).name().to_string();
                let error = ExtensionError::LoadPhase {
                    extension: name.clone(),
                    phase: LoadPhase::Discovery,
                    source: Box::new(e),
                };
                tracing::error!(
                    extension = %name,
                    phase = %LoadPhase::Discovery,
                    error = %error,
                    "Extension failed to load"
                );
                return ExtensionOutcome {
                    name,
                    path: path.to_path_buf(),
                    result: Err(error),
                };
            }
        };

        let name = descriptor.name().to_string();
        let result = self.load_one(descriptor);
        ExtensionOutcome {
            name,
            path: path.to_path_buf(),
            result,
        }
    }

    /// Run locale, services and registration for one extension.
    ///
    /// Returns the number of commands registered. Names are compared
    /// case-insensitively, as text namespaces are. A name held by a live
    /// extension in another directory is rejected as a duplicate; a failed
    /// holder is evicted instead. A directory already in the working set is
    /// reused (a no-op when it is registered, a retry otherwise).
    pub fn load_one(&mut self, descriptor: ExtensionDescriptor) -> Result<usize, ExtensionError> {
        let claims_name = |d: &ExtensionDescriptor| {
            same_name(d.name(), descriptor.name()) && d.root_path() != descriptor.root_path()
        };

        if let Some(existing) = self
            .descriptors
            .iter()
            .find(|d| claims_name(d) && !d.state().is_failed())
        {
            let error = ExtensionError::Duplicate {
                name: descriptor.name().to_string(),
                existing: existing.root_path().to_path_buf(),
                rejected: descriptor.root_path().to_path_buf(),
            };
            tracing::warn!(extension = %descriptor.name(), error = %error, "Duplicate extension rejected");
            return Err(error);
        }

        let before = self.descriptors.len();
        self.descriptors.retain(|d| !claims_name(d));
        if self.descriptors.len() < before {
            tracing::debug!(extension = %descriptor.name(), "Evicted failed extension with the same name");
        }

        let index = match self
            .descriptors
            .iter()
            .position(|d| d.root_path() == descriptor.root_path())
        {
            Some(index) => {
                let existing = &self.descriptors[index];
                if existing.state().is_registered() && existing.name() == descriptor.name() {
                    tracing::debug!(extension = %existing.name(), "Extension already loaded");
                    return Ok(self.context.commands().by_extension(existing.name()).count());
                }

                let previous = existing.name().to_string();
                self.forget(&previous);
                self.descriptors[index] = descriptor;
                index
            }
            None => {
                self.descriptors.push(descriptor);
                self.descriptors.len() - 1
            }
        };

        let ExtensionLoader {
            context,
            descriptors,
            service_loaders,
        } = self;
        Self::run_phases(&mut descriptors[index], service_loaders, context)
    }

    fn run_phases(
        descriptor: &mut ExtensionDescriptor,
        loaders: &mut [Box<dyn ServiceLoader>],
        context: &HostContext,
    ) -> Result<usize, ExtensionError> {
        let name = descriptor.name().to_string();

        let locales = match Self::guarded(&name, LoadPhase::Locale, || {
            descriptor.load_locale(&mut context.texts_mut())
        }) {
            Ok(count) => count,
            Err(e) => return Err(Self::fail(descriptor, context, e)),
        };
        descriptor.set_state(DiscoveryState::LocaleLoaded);

        let handlers = match Self::guarded(&name, LoadPhase::Services, || descriptor.load_services(loaders)) {
            Ok(handlers) => handlers,
            Err(e) => return Err(Self::fail(descriptor, context, e)),
        };
        descriptor.set_state(DiscoveryState::ServicesLoaded);

        let commands = match Self::guarded(&name, LoadPhase::Registration, || {
            context.commands_mut().register_all(&name, &handlers)
        }) {
            Ok(count) => count,
            Err(e) => return Err(Self::fail(descriptor, context, e)),
        };
        descriptor.set_state(DiscoveryState::Registered);

        tracing::info!(extension = %name, locales, commands, "Extension loaded");
        Ok(commands)
    }

    /// Run one phase, turning errors and panics into a phase failure
    fn guarded<T>(
        extension: &str,
        phase: LoadPhase,
        f: impl FnOnce() -> Result<T, ExtensionError>,
    ) -> Result<T, ExtensionError> {
        let source = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(payload) => ExtensionError::Panicked(panic_message(payload.as_ref())),
        };

        Err(ExtensionError::LoadPhase {
            extension: extension.to_string(),
            phase,
            source: Box::new(source),
        })
    }

    fn fail(descriptor: &mut ExtensionDescriptor, context: &HostContext, error: ExtensionError) -> ExtensionError {
        let phase = error.phase().unwrap_or(LoadPhase::Discovery);
        descriptor.set_state(DiscoveryState::Failed(phase));
        context.texts_mut().remove_namespace(descriptor.name());

        tracing::error!(
            extension = %descriptor.name(),
            phase = %phase,
            error = %error,
            "Extension failed to load"
        );
        error
    }

    /// Remove an extension's commands and texts, then drop it from the working set
    pub fn unload(&mut self, name: &str) -> Result<usize, ExtensionError> {
        let index = self
            .descriptors
            .iter()
            .position(|d| same_name(d.name(), name))
            .ok_or_else(|| ExtensionError::NotFound(name.to_string()))?;

        let descriptor = self.descriptors.remove(index);
        let removed = self.forget(descriptor.name());
        tracing::info!(extension = %descriptor.name(), commands = removed, "Extension unloaded");
        Ok(removed)
    }

    /// Unload everything, then load `root` again
    pub fn reload(&mut self, root: impl AsRef<Path>) -> Result<LoadReport, ExtensionError> {
        let names: Vec<String> = self.descriptors.iter().map(|d| d.name().to_string()).collect();
        for name in &names {
            self.forget(name);
        }
        self.descriptors.clear();

        tracing::info!(extensions = names.len(), "Reloading extensions");
        self.load_modules(root)
    }

    fn forget(&self, name: &str) -> usize {
        self.context.texts_mut().remove_namespace(name);
        self.context.commands_mut().unregister_extension(name)
    }

    /// Install `url` under the install root without loading it
    pub async fn install(&self, url: &str, fetcher: &RepoFetcher) -> Result<PathBuf, ExtensionError> {
        fetcher.install(url, &self.install_root()).await
    }

    /// Install `url`, then load it. Only install failures are returned as `Err`.
    pub async fn install_and_load(
        &mut self,
        url: &str,
        fetcher: &RepoFetcher,
    ) -> Result<ExtensionOutcome, ExtensionError> {
        let path = self.install(url, fetcher).await?;
        Ok(self.load_path(&path))
    }
}

/// Install and load `url` in the background.
///
/// The clone runs without holding the loader; the lock is only taken to read
/// the install root and to load, so registrations stay serialized.
pub fn spawn_install(
    loader: SharedExtensionLoader,
    fetcher: Arc<RepoFetcher>,
    url: String,
) -> JoinHandle<Result<ExtensionOutcome, ExtensionError>> {
    tokio::spawn(async move {
        let target_root = loader.lock().await.install_root();
        let path = fetcher.install(&url, &target_root).await?;

        let mut loader = loader.lock().await;
        Ok(loader.load_path(&path))
    })
}

/// Extension names share a namespace when they match ignoring case
fn same_name(a: &str, b: &str) -> bool {
    a.to_uppercase() == b.to_uppercase()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
