//! Service unit loading for extensions
//!
//! Units are either shared libraries exporting `carik_service_unit` or
//! compiled-in units selected by a `<name>.unit` marker file.
//! An optional `extension.yaml` manifest carries extension metadata.

pub mod loader;
pub mod manifest;

pub use loader::{NativeServiceLoader, ServiceLoader, StaticServiceLoader, UnitFactory};
pub use manifest::{ExtensionManifest, MANIFEST_FILE};
