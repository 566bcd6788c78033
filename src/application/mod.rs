//! Application layer - Shared host state and cross-cutting types
//!
//! This layer contains:
//! - Context: The settings, text store and command registry shared by everything
//! - Errors: Extension, locale, command and config errors
//! - Messaging: Command parsing against the registry

pub mod context;
pub mod errors;
pub mod messaging;

pub use context::HostContext;
