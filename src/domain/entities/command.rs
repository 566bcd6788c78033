use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::errors::ExtensionError;
use crate::domain::traits::CommandHandler;

/// A command registered by an extension
#[derive(Clone)]
pub struct RegisteredCommand {
    pub name: String,
    pub handler: Arc<dyn CommandHandler>,
    /// Owning extension, for provenance and unloading
    pub extension: String,
    pub registered_at: DateTime<Utc>,
}

impl RegisteredCommand {
    pub fn matches(&self, input: &str) -> bool {
        self.name.to_lowercase() == input.to_lowercase()
    }

    pub fn description(&self) -> Option<&str> {
        self.handler.description()
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("handler", &self.handler.name())
            .field("extension", &self.extension)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

/// Command registry filled by the extension loader, kept in registration order
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every command of one extension's handlers.
    ///
    /// All-or-nothing: on a name conflict nothing from `handlers` is registered.
    pub fn register_all(
        &mut self,
        extension: &str,
        handlers: &[Arc<dyn CommandHandler>],
    ) -> Result<usize, ExtensionError> {
        let now = Utc::now();
        let mut pending: Vec<RegisteredCommand> = Vec::new();

        for handler in handlers {
            let names = handler.commands();
            if names.is_empty() {
                tracing::warn!(
                    extension = %extension,
                    handler = %handler.name(),
                    "Handler declares no commands, skipping"
                );
                continue;
            }

            for name in names {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ExtensionError::ServiceUnit(format!(
                        "Handler '{}' declares an empty command name",
                        handler.name()
                    )));
                }

                if let Some(existing) = self.find(&name) {
                    return Err(ExtensionError::CommandConflict {
                        command: name,
                        owner: existing.extension.clone(),
                    });
                }
                if pending.iter().any(|c| c.matches(&name)) {
                    return Err(ExtensionError::CommandConflict {
                        command: name,
                        owner: extension.to_string(),
                    });
                }

                pending.push(RegisteredCommand {
                    name,
                    handler: handler.clone(),
                    extension: extension.to_string(),
                    registered_at: now,
                });
            }
        }

        let count = pending.len();
        self.commands.extend(pending);
        Ok(count)
    }

    /// Case-insensitive lookup
    pub fn find(&self, input: &str) -> Option<&RegisteredCommand> {
        self.commands.iter().find(|c| c.matches(input))
    }

    pub fn by_extension<'a>(&'a self, extension: &'a str) -> impl Iterator<Item = &'a RegisteredCommand> {
        self.commands.iter().filter(move |c| c.extension == extension)
    }

    /// Remove every command owned by `extension`, returning how many were removed
    pub fn unregister_extension(&mut self, extension: &str) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| c.extension != extension);
        before - self.commands.len()
    }

    pub fn all(&self) -> impl Iterator<Item = &RegisteredCommand> {
        self.commands.iter()
    }

    /// `(command, handler, extension)` tuples for the host dispatcher
    pub fn export(&self) -> Vec<(String, Arc<dyn CommandHandler>, String)> {
        self.commands
            .iter()
            .map(|c| (c.name.clone(), c.handler.clone(), c.extension.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;

    struct Echo {
        names: Vec<&'static str>,
    }

    impl CommandHandler for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn commands(&self) -> Vec<String> {
            self.names.iter().map(|s| s.to_string()).collect()
        }

        fn execute(&self, args: &[String]) -> Result<String, CommandError> {
            Ok(args.join(" "))
        }
    }

    fn handler(names: Vec<&'static str>) -> Arc<dyn CommandHandler> {
        Arc::new(Echo { names })
    }

    #[test]
    fn test_register_and_find() {
        let mut registry = CommandRegistry::new();
        let count = registry
            .register_all("echo", &[handler(vec!["echo", "say"])])
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(registry.find("ECHO").unwrap().extension, "echo");
        assert_eq!(registry.find("say").unwrap().handler.name(), "Echo");
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_conflict_registers_nothing() {
        let mut registry = CommandRegistry::new();
        registry.register_all("first", &[handler(vec!["ping"])]).unwrap();

        let err = registry
            .register_all("second", &[handler(vec!["pong"]), handler(vec!["Ping"])])
            .unwrap_err();

        match err {
            ExtensionError::CommandConflict { command, owner } => {
                assert_eq!(command, "Ping");
                assert_eq!(owner, "first");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.len(), 1);
        assert!(registry.find("pong").is_none());
    }

    #[test]
    fn test_unregister_extension_and_export_order() {
        let mut registry = CommandRegistry::new();
        registry.register_all("a", &[handler(vec!["one"])]).unwrap();
        registry.register_all("b", &[handler(vec!["two", "three"])]).unwrap();

        let exported: Vec<String> = registry.export().into_iter().map(|(name, _, _)| name).collect();
        assert_eq!(exported, vec!["one", "two", "three"]);

        assert_eq!(registry.unregister_extension("b"), 2);
        assert_eq!(registry.by_extension("a").count(), 1);
        assert_eq!(registry.len(), 1);
    }
}
