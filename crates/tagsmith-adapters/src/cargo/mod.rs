//! Cargo package adapter

mod manifest;

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use tagsmith_core::error::{AdapterError, Result};
use tagsmith_core::types::PackageInfo;

use crate::traits::{check_version, PackageAdapter};
pub use manifest::{CargoToml, VersionLocation};

/// Cargo package adapter
pub struct CargoAdapter;

impl CargoAdapter {
    /// Create a new Cargo adapter
    pub fn new() -> Self {
        Self
    }

    /// Get the Cargo.toml path
    fn manifest_path(&self, path: &Path) -> PathBuf {
        path.join("Cargo.toml")
    }
}

impl Default for CargoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageAdapter for CargoAdapter {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn manifest_name(&self) -> &'static str {
        "Cargo.toml"
    }

    fn detect(&self, path: &Path) -> bool {
        // A virtual workspace manifest is not a package
        CargoToml::load(&self.manifest_path(path)).is_ok_and(|toml| toml.package.is_some())
    }

    fn get_info(&self, path: &Path) -> Result<PackageInfo> {
        let manifest_path = self.manifest_path(path);
        let manifest = CargoToml::load(&manifest_path)?;
        let package = manifest.package.ok_or_else(|| AdapterError::ManifestParseError {
            path: manifest_path.clone(),
            reason: "no [package] section found".to_string(),
        })?;
        let (version, _) = CargoToml::resolve_version(&manifest_path)?;

        Ok(PackageInfo::new(package.name, version, "cargo", manifest_path)
            .with_private(package.publish.is_some_and(|p| !p)))
    }

    #[instrument(skip(self), fields(adapter = "cargo"))]
    fn set_version(&self, path: &Path, version: &str) -> Result<()> {
        let manifest_path = self.manifest_path(path);
        check_version(&manifest_path, version)?;

        let (_, location) = CargoToml::resolve_version(&manifest_path)?;
        CargoToml::update_version(&location, version)?;
        debug!(location = ?location, "updated Cargo.toml version");
        Ok(())
    }
}
