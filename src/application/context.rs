//! Host context - The shared stores every component works against

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::application::errors::LocaleError;
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::Settings;
use crate::i18n::TextResourceStore;
use crate::infrastructure::config::Config;

/// Created once at startup and passed to the loader and every consumer.
///
/// Cloning is cheap; clones share the same stores.
#[derive(Clone)]
pub struct HostContext {
    settings: Arc<dyn Settings>,
    texts: Arc<RwLock<TextResourceStore>>,
    commands: Arc<RwLock<CommandRegistry>>,
    extensions_dir: PathBuf,
}

impl HostContext {
    pub fn new(
        settings: Arc<dyn Settings>,
        texts: TextResourceStore,
        extensions_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            texts: Arc::new(RwLock::new(texts)),
            commands: Arc::new(RwLock::new(CommandRegistry::new())),
            extensions_dir: extensions_dir.into(),
        }
    }

    /// Build the context from config, loading the host's locale directory if present
    pub fn from_config(config: &Config, settings: Arc<dyn Settings>) -> Result<Self, LocaleError> {
        let mut texts = TextResourceStore::new(&config.bot.locale);
        if config.bot.locale_dir.is_dir() {
            texts.load_directory(&config.bot.locale_dir)?;
        } else {
            tracing::debug!(
                dir = %config.bot.locale_dir.display(),
                "Host locale directory not found"
            );
        }

        Ok(Self::new(settings, texts, &config.extensions.directory))
    }

    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }

    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    pub fn texts(&self) -> RwLockReadGuard<'_, TextResourceStore> {
        self.texts.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn texts_mut(&self) -> RwLockWriteGuard<'_, TextResourceStore> {
        self.texts.write().unwrap_or_else(|e| {
            tracing::warn!("Text store lock was poisoned, recovering");
            e.into_inner()
        })
    }

    pub fn commands(&self) -> RwLockReadGuard<'_, CommandRegistry> {
        self.commands.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn commands_mut(&self) -> RwLockWriteGuard<'_, CommandRegistry> {
        self.commands.write().unwrap_or_else(|e| {
            tracing::warn!("Command registry lock was poisoned, recovering");
            e.into_inner()
        })
    }

    /// Shorthand for resolving a text in the current locale
    pub fn resolve(&self, query: &str) -> String {
        self.texts().resolve(query)
    }
}
