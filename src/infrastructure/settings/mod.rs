//! Flat `KEY=VALUE` settings file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::ConfigError;
use crate::domain::traits::Settings;

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(.*?)\s*$")
        .expect("valid settings line pattern")
});

static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid settings key pattern"));

/// Settings backed by a `.env` style file
pub struct EnvFileSettings {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl EnvFileSettings {
    /// Settings with no backing file
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load settings from `path`; a missing file gives empty settings
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::parse(&content)
        } else {
            tracing::debug!(path = %path.display(), "Settings file not found, starting empty");
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Settings loaded");
        Ok(Self {
            path: Some(path),
            values: RwLock::new(values),
        })
    }

    /// Parse `KEY=VALUE` lines, skipping blanks and `#` comments
    pub fn parse(content: &str) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();

        for (number, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some(caps) = LINE.captures(line) else {
                tracing::warn!(line = number + 1, "Ignoring malformed settings line");
                continue;
            };

            values.insert(caps[1].to_string(), unquote(&caps[2]).to_string());
        }

        values
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set several keys at once
    pub fn update<I, K, V>(&self, updates: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in updates {
            self.set(key.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    /// Write every value back to the settings file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ConfigError::InvalidValue("settings have no backing file".to_string()))?;

        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        let mut content = String::new();
        for (key, value) in values.iter() {
            if value.is_empty() || value.contains(char::is_whitespace) || value.contains('#') {
                content.push_str(&format!("{}=\"{}\"\n", key, value));
            } else {
                content.push_str(&format!("{}={}\n", key, value));
            }
        }

        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), keys = values.len(), "Settings saved");
        Ok(())
    }
}

impl Settings for EnvFileSettings {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        if !KEY.is_match(key) {
            return Err(ConfigError::InvalidValue(format!("invalid settings key '{}'", key)));
        }
        if value.contains(['\n', '\r', '"']) {
            return Err(ConfigError::InvalidValue(format!(
                "value for '{}' must be a single line without quotes",
                key
            )));
        }

        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let values = EnvFileSettings::parse(
            "# comment\nCOMMAND_PREFIX=!\n\nexport BOT_NAME = \"carik bot\"\nnot a setting\nEMPTY=\n",
        );

        assert_eq!(values.get("COMMAND_PREFIX").map(String::as_str), Some("!"));
        assert_eq!(values.get("BOT_NAME").map(String::as_str), Some("carik bot"));
        assert_eq!(values.get("EMPTY").map(String::as_str), Some(""));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_get_or_default() {
        let settings = EnvFileSettings::in_memory();
        assert_eq!(settings.get_or("COMMAND_PREFIX", "/"), "/");

        settings.set("COMMAND_PREFIX", "!").unwrap();
        assert_eq!(settings.get_or("COMMAND_PREFIX", "/"), "!");
    }

    #[test]
    fn test_set_rejects_invalid_input() {
        let settings = EnvFileSettings::in_memory();
        assert!(settings.set("BAD KEY", "x").is_err());
        assert!(settings.set("GOOD", "two\nlines").is_err());
        assert!(settings.save().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env");

        let settings = EnvFileSettings::load(&path).unwrap();
        settings
            .update([("COMMAND_PREFIX", "!"), ("BOT_NAME", "carik bot")])
            .unwrap();
        settings.save().unwrap();

        let reloaded = EnvFileSettings::load(&path).unwrap();
        assert_eq!(reloaded.get("COMMAND_PREFIX").as_deref(), Some("!"));
        assert_eq!(reloaded.get("BOT_NAME").as_deref(), Some("carik bot"));
    }
}
