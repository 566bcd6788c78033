//! Extension system for carik-bot
//!
//! An extension is a directory under the extensions root:
//!
//! ```text
//! extensions/<dir>/extension.yaml      optional manifest
//! extensions/<dir>/locale/<locale>/*   .json, .yaml and .txt texts
//! extensions/<dir>/services/*          service units exporting command handlers
//! ```

pub mod descriptor;
pub mod loader;
pub mod report;

pub use descriptor::ExtensionDescriptor;
pub use loader::{spawn_install, ExtensionLoader, SharedExtensionLoader};
pub use report::{ExtensionOutcome, LoadReport};
