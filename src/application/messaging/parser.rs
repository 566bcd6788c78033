//! Command parser - Splits prefixed input into a command and its arguments

use crate::domain::entities::{CommandRegistry, RegisteredCommand};

/// A command parsed from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Recognizes commands written with the configured prefix
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse `<prefix><name> [args...]`, or `None` for plain text
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let cmd_text = text.trim_start().strip_prefix(&self.command_prefix)?;

        let mut parts = cmd_text.split_whitespace();
        let first = parts.next()?;
        // `/weather@carik_bot` addresses a specific bot in group chats
        let name = first.split('@').next().unwrap_or(first);
        if name.is_empty() {
            return None;
        }

        Some(ParsedCommand {
            name: name.to_string(),
            args: parts.map(|s| s.to_string()).collect(),
        })
    }

    /// Parse `text` and find the registered command it names
    pub fn route<'r>(
        &self,
        text: &str,
        registry: &'r CommandRegistry,
    ) -> Option<(&'r RegisteredCommand, ParsedCommand)> {
        let parsed = self.parse(text)?;
        let command = registry.find(&parsed.name)?;
        Some((command, parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::errors::CommandError;
    use crate::domain::traits::CommandHandler;

    struct Weather;

    impl CommandHandler for Weather {
        fn name(&self) -> &str {
            "Weather"
        }

        fn commands(&self) -> Vec<String> {
            vec!["weather".to_string()]
        }

        fn execute(&self, args: &[String]) -> Result<String, CommandError> {
            Ok(format!("sunny in {}", args.join(" ")))
        }
    }

    #[test]
    fn test_parse_with_default_prefix() {
        let parser = CommandParser::new("/");
        let parsed = parser.parse("/weather Jakarta today").unwrap();

        assert_eq!(parsed.name, "weather");
        assert_eq!(parsed.args, vec!["Jakarta", "today"]);
        assert!(parser.parse("weather Jakarta").is_none());
        assert!(parser.parse("/").is_none());
    }

    #[test]
    fn test_parse_custom_prefix_and_bot_suffix() {
        let parser = CommandParser::new("!");
        let parsed = parser.parse("!weather@carik_bot Bandung").unwrap();

        assert_eq!(parsed.name, "weather");
        assert_eq!(parsed.args, vec!["Bandung"]);
        assert!(parser.parse("/weather").is_none());
    }

    #[test]
    fn test_route_to_registered_command() {
        let mut registry = CommandRegistry::new();
        registry
            .register_all("weather", &[Arc::new(Weather) as Arc<dyn CommandHandler>])
            .unwrap();

        let parser = CommandParser::new("/");
        let (command, parsed) = parser.route("/Weather Jakarta", &registry).unwrap();

        assert_eq!(command.extension, "weather");
        assert_eq!(command.handler.execute(&parsed.args).unwrap(), "sunny in Jakarta");
        assert!(parser.route("/unknown", &registry).is_none());
    }
}
