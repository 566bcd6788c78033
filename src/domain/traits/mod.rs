//! Domain traits - Contracts for extensions and host collaborators

pub mod handler;
pub mod settings;

pub use handler::{CommandHandler, ServiceEntryFn, ServiceUnit, SERVICE_ENTRY_SYMBOL};
pub use settings::{Settings, COMMAND_PREFIX_KEY, INSTALL_DIR_KEY};
