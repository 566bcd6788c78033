//! Service unit loaders - Turn files in `services/` into loaded units

use std::collections::HashMap;
use std::path::Path;

use libloading::{Library, Symbol};

use crate::application::errors::ExtensionError;
use crate::domain::traits::{ServiceEntryFn, ServiceUnit, SERVICE_ENTRY_SYMBOL};

/// Loads one kind of service unit file
pub trait ServiceLoader: Send {
    /// Whether this loader handles the file at `path`
    fn supports(&self, path: &Path) -> bool;

    /// Load the unit at `path`
    fn load(&mut self, path: &Path) -> Result<Box<dyn ServiceUnit>, ExtensionError>;
}

/// Loads service units from shared libraries
pub struct NativeServiceLoader {
    libraries: Vec<Library>,
}

impl NativeServiceLoader {
    pub fn new() -> Self {
        Self {
            libraries: Vec::new(),
        }
    }

    /// Number of libraries loaded so far
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl Default for NativeServiceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLoader for NativeServiceLoader {
    fn supports(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("so") | Some("dylib") | Some("dll")
        )
    }

    fn load(&mut self, path: &Path) -> Result<Box<dyn ServiceUnit>, ExtensionError> {
        let library = unsafe {
            Library::new(path)
                .map_err(|e| ExtensionError::ServiceUnit(format!("Failed to load library: {}", e)))?
        };

        let unit = unsafe {
            let entry: Symbol<ServiceEntryFn> = library.get(SERVICE_ENTRY_SYMBOL).map_err(|e| {
                ExtensionError::ServiceUnit(format!("Failed to find entry point: {}", e))
            })?;

            let unit_ptr = entry();
            if unit_ptr.is_null() {
                return Err(ExtensionError::ServiceUnit(format!(
                    "Entry point of {} returned null",
                    path.display()
                )));
            }
            Box::from_raw(unit_ptr)
        };

        tracing::info!(unit = %unit.name(), path = %path.display(), "Loaded native service unit");
        self.libraries.push(library);
        Ok(unit)
    }
}

impl Drop for NativeServiceLoader {
    fn drop(&mut self) {
        // Registered handlers may outlive the loader; their code must stay mapped.
        for library in self.libraries.drain(..) {
            std::mem::forget(library);
        }
    }
}

/// Factory for a compiled-in service unit
pub type UnitFactory = Box<dyn Fn() -> Result<Box<dyn ServiceUnit>, ExtensionError> + Send + Sync>;

/// Compiled-in service units, selected by `<name>.unit` marker files
#[derive(Default)]
pub struct StaticServiceLoader {
    units: HashMap<String, UnitFactory>,
}

impl StaticServiceLoader {
    pub const MARKER_EXTENSION: &'static str = "unit";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn ServiceUnit>, ExtensionError> + Send + Sync + 'static,
    {
        self.units.insert(name.into(), Box::new(factory));
    }

    pub fn with_unit<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn ServiceUnit>, ExtensionError> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ServiceLoader for StaticServiceLoader {
    fn supports(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(Self::MARKER_EXTENSION)
    }

    fn load(&mut self, path: &Path) -> Result<Box<dyn ServiceUnit>, ExtensionError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ExtensionError::ServiceUnit(format!("Invalid unit file: {}", path.display())))?;

        let factory = self
            .units
            .get(name)
            .ok_or_else(|| ExtensionError::ServiceUnit(format!("Unknown compiled-in service unit '{}'", name)))?;

        let unit = factory()?;
        tracing::debug!(unit = %unit.name(), path = %path.display(), "Loaded compiled-in service unit");
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::domain::traits::CommandHandler;

    struct Empty;

    impl ServiceUnit for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
            Vec::new()
        }
    }

    #[test]
    fn test_native_loader_supports_libraries() {
        let loader = NativeServiceLoader::new();
        assert!(loader.supports(Path::new("services/libdice.so")));
        assert!(loader.supports(Path::new("services/dice.dll")));
        assert!(!loader.supports(Path::new("services/dice.unit")));
        assert!(loader.is_empty());
    }

    #[test]
    fn test_native_loader_missing_library() {
        let mut loader = NativeServiceLoader::new();
        let err = loader.load(Path::new("/nonexistent/libnothing.so")).err().unwrap();
        assert!(matches!(err, ExtensionError::ServiceUnit(_)));
    }

    #[test]
    fn test_static_loader_resolves_marker() {
        let mut loader = StaticServiceLoader::new().with_unit("empty", || Ok(Box::new(Empty)));

        assert!(loader.supports(&PathBuf::from("services/empty.unit")));
        let unit = loader.load(Path::new("services/empty.unit")).unwrap();
        assert_eq!(unit.name(), "empty");

        let err = loader.load(Path::new("services/other.unit")).err().unwrap();
        assert!(err.to_string().contains("other"));
        assert_eq!(loader.names(), vec!["empty"]);
    }
}
