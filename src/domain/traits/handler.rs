use std::sync::Arc;

use crate::application::errors::{CommandError, ExtensionError};

/// A command handler exported by an extension
pub trait CommandHandler: Send + Sync {
    /// Handler type name, used in logs
    fn name(&self) -> &str;

    /// Command names this handler answers to, without the prefix
    fn commands(&self) -> Vec<String>;

    fn description(&self) -> Option<&str> {
        None
    }

    /// Run the command with its arguments
    fn execute(&self, args: &[String]) -> Result<String, CommandError>;
}

/// One loadable unit from an extension's `services/` directory
pub trait ServiceUnit: Send + Sync {
    fn name(&self) -> &str;

    /// Called once, right after the unit is loaded
    fn init(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Handlers this unit exports
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>>;
}

/// Symbol every native service unit exports
pub const SERVICE_ENTRY_SYMBOL: &[u8] = b"carik_service_unit";

/// Entry point of a native service unit.
///
/// The pointer must come from `Box::into_raw(Box::new(unit) as Box<dyn ServiceUnit>)`.
#[allow(improper_ctypes_definitions)]
pub type ServiceEntryFn = extern "C" fn() -> *mut dyn ServiceUnit;
