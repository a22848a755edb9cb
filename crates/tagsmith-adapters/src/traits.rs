//! Package adapter traits

use std::path::Path;

use tagsmith_core::error::{AdapterError, Result};
use tagsmith_core::types::PackageInfo;

/// Reads and writes the version of one kind of package manifest
pub trait PackageAdapter: Send + Sync {
    /// Get the adapter name (e.g., "npm", "cargo")
    fn name(&self) -> &'static str;

    /// Manifest file name this adapter handles
    fn manifest_name(&self) -> &'static str;

    /// Check if this adapter applies to the given package directory
    fn detect(&self, path: &Path) -> bool;

    /// Get package information from the manifest
    fn get_info(&self, path: &Path) -> Result<PackageInfo>;

    /// Get current version
    fn get_version(&self, path: &Path) -> Result<String> {
        Ok(self.get_info(path)?.version)
    }

    /// Write a new version into the manifest
    fn set_version(&self, path: &Path, version: &str) -> Result<()>;
}

/// Reject versions that are not semantic versions before touching a manifest
pub(crate) fn check_version(manifest: &Path, version: &str) -> Result<()> {
    semver::Version::parse(version).map_err(|e| AdapterError::ManifestUpdateError {
        path: manifest.to_path_buf(),
        reason: format!("'{}' is not a valid version: {}", version, e),
    })?;
    Ok(())
}
