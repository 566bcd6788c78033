//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Host configuration loading
//! - Settings: Flat key/value settings file
//! - Git: Installing extensions from remote repositories
//! - Plugins: Loading extension service units

pub mod config;
pub mod git;
pub mod plugins;
pub mod settings;
