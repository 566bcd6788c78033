//! Domain layer - Core objects of the extension host
//!
//! This layer contains:
//! - Entities: Registered commands, load phases, repository references
//! - Traits: Contracts extensions and collaborators implement

pub mod entities;
pub mod traits;
