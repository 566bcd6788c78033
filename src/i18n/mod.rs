//! Localization - Locale directories and the shared text store
//!
//! Host texts live at the top level of each locale; every extension gets its
//! own namespace, queried as `NAMESPACE:KEY`.

pub mod files;
pub mod store;

pub use files::{ingest_directory, LocaleTable, LocaleTexts};
pub use store::{LocaleEntries, ScopedTexts, TextResourceStore};
