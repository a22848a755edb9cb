//! Adapter lookup for package directories

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use tagsmith_core::error::{AdapterError, Result};
use tagsmith_core::types::PackageInfo;

use crate::cargo::CargoAdapter;
use crate::npm::NpmAdapter;
use crate::traits::PackageAdapter;

/// The manifest kinds tagsmith can version, in detection order
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn PackageAdapter>>,
}

impl AdapterRegistry {
    /// npm first, then Cargo
    pub fn new() -> Self {
        Self {
            adapters: vec![Arc::new(NpmAdapter::new()), Arc::new(CargoAdapter::new())],
        }
    }

    /// Adapter for a package type name such as `npm` or `cargo`
    pub fn require(&self, package_type: &str) -> Result<Arc<dyn PackageAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.name() == package_type)
            .cloned()
            .ok_or_else(|| AdapterError::UnsupportedType(package_type.to_string()).into())
    }

    /// Adapter for the manifest in `dir`.
    ///
    /// Only adapters whose manifest file is present are asked; a manifest
    /// that exists but is not a releasable package (a Cargo virtual
    /// workspace, a `package.json` without a version) is passed over.
    pub fn detect(&self, dir: &Path) -> Option<Arc<dyn PackageAdapter>> {
        for adapter in &self.adapters {
            let manifest: PathBuf = dir.join(adapter.manifest_name());
            if !manifest.is_file() {
                continue;
            }
            if adapter.detect(dir) {
                return Some(adapter.clone());
            }
            debug!(manifest = %manifest.display(), "manifest is not a package");
        }
        None
    }

    /// Adapter for a configured package: its declared type, else detection
    pub fn for_package(
        &self,
        dir: &Path,
        package_type: Option<&str>,
    ) -> Result<Arc<dyn PackageAdapter>> {
        match package_type {
            Some(kind) => self.require(kind),
            None => self
                .detect(dir)
                .ok_or_else(|| AdapterError::NoManifest(dir.to_path_buf()).into()),
        }
    }

    /// Read the package in `dir`, recorded at `relative` to the repository root.
    ///
    /// `Ok(None)` when no adapter recognises the directory.
    pub fn read_package(&self, dir: &Path, relative: &Path) -> Result<Option<PackageInfo>> {
        let Some(adapter) = self.detect(dir) else {
            return Ok(None);
        };
        Ok(Some(adapter.get_info(dir)?.with_path(relative)))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
