//! carik-loader - Extension loading core of carik-bot
//!
//! Discovers extensions on disk, installs them from git, merges their locale
//! texts into the shared store and registers the command handlers they export.

pub mod application;
pub mod domain;
pub mod extensions;
pub mod i18n;
pub mod infrastructure;
