//! npm packages: `package.json`

mod manifest;

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use tagsmith_core::error::Result;
use tagsmith_core::types::PackageInfo;

use crate::traits::{check_version, PackageAdapter};
pub use manifest::PackageJson;

const MANIFEST: &str = "package.json";

/// Versions a `package.json`.
///
/// A manifest without a `version` field, typically a tooling-only monorepo
/// root, is not a package. A workspace root that does carry a version is
/// reported as private.
pub struct NpmAdapter;

impl NpmAdapter {
    pub fn new() -> Self {
        Self
    }

    fn manifest(dir: &Path) -> PathBuf {
        dir.join(MANIFEST)
    }
}

impl Default for NpmAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageAdapter for NpmAdapter {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn manifest_name(&self) -> &'static str {
        MANIFEST
    }

    fn detect(&self, path: &Path) -> bool {
        PackageJson::load(&Self::manifest(path)).is_ok()
    }

    fn get_info(&self, path: &Path) -> Result<PackageInfo> {
        let manifest_path = Self::manifest(path);
        let manifest = PackageJson::load(&manifest_path)?;
        let private = manifest.private.unwrap_or(false) || manifest.workspaces.is_some();

        Ok(PackageInfo::new(manifest.name, manifest.version, self.name(), manifest_path)
            .with_private(private))
    }

    /// Rewrites `version` only when it changes, so a synced package keeps
    /// its file byte for byte
    #[instrument(skip(self), fields(adapter = "npm"))]
    fn set_version(&self, path: &Path, version: &str) -> Result<()> {
        let manifest_path = Self::manifest(path);
        check_version(&manifest_path, version)?;

        let current = PackageJson::load(&manifest_path)?.version;
        if current == version {
            debug!(path = %manifest_path.display(), "package.json already at version");
            return Ok(());
        }

        PackageJson::update_version(&manifest_path, version)?;
        debug!(path = %manifest_path.display(), from = %current, to = %version, "updated package.json");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package(json: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST), json).unwrap();
        temp
    }

    #[test]
    fn test_scoped_package_info_and_bump() {
        let temp = package(r#"{"name": "@acme/ui", "version": "1.4.0", "private": true}"#);
        let adapter = NpmAdapter::new();
        assert!(adapter.detect(temp.path()));

        let info = adapter.get_info(temp.path()).unwrap();
        assert_eq!(info.name, "@acme/ui");
        assert_eq!(info.package_type, "npm");
        assert!(info.private);

        adapter.set_version(temp.path(), "1.5.0").unwrap();
        assert_eq!(adapter.get_version(temp.path()).unwrap(), "1.5.0");
    }

    #[test]
    fn test_unversioned_root_is_not_a_package() {
        let temp = package(r#"{"name": "monorepo", "private": true, "workspaces": ["packages/*"]}"#);
        assert!(!NpmAdapter::new().detect(temp.path()));
    }

    #[test]
    fn test_versioned_workspace_root_is_private() {
        let temp = package(r#"{"name": "monorepo", "version": "0.0.0", "workspaces": ["packages/*"]}"#);
        let info = NpmAdapter::new().get_info(temp.path()).unwrap();
        assert!(info.private);
    }

    #[test]
    fn test_same_version_leaves_file_untouched() {
        let original = "{\n    \"name\": \"ui\",\n    \"version\": \"2.0.0\"\n}\n";
        let temp = package(original);

        NpmAdapter::new().set_version(temp.path(), "2.0.0").unwrap();
        let content = std::fs::read_to_string(temp.path().join(MANIFEST)).unwrap();
        assert_eq!(content, original);
    }

    #[test]
    fn test_rejects_invalid_version() {
        let temp = package(r#"{"name": "ui", "version": "1.0.0"}"#);
        let err = NpmAdapter::new().set_version(temp.path(), "next").unwrap_err();
        assert!(err.to_string().contains("next"));
    }
}
