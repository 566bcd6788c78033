//! Domain entities

pub mod command;
pub mod extension;
pub mod repo;

pub use command::{CommandRegistry, RegisteredCommand};
pub use extension::{DiscoveryState, LoadPhase};
pub use repo::RepoReference;
