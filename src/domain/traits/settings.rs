use crate::application::errors::ConfigError;

/// Settings key holding the command prefix
pub const COMMAND_PREFIX_KEY: &str = "COMMAND_PREFIX";

/// Settings key overriding where extensions are installed
pub const INSTALL_DIR_KEY: &str = "EXTENSIONS_INSTALL_DIR";

/// Flat key/value settings collaborator
pub trait Settings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}
