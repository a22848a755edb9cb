//! Cargo.toml handling

use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml_edit::{value, DocumentMut};

use tagsmith_core::error::{AdapterError, Result};

/// Cargo.toml structure (for reading)
#[derive(Debug, Clone, Deserialize)]
pub struct CargoToml {
    /// Package section
    pub package: Option<Package>,
    /// Workspace section
    pub workspace: Option<Workspace>,
}

/// Package section
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Package version, possibly inherited from the workspace
    #[serde(default)]
    pub version: Option<VersionField>,
    /// Whether to publish
    pub publish: Option<bool>,
}

/// `version = "1.0.0"` or `version.workspace = true`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionField {
    /// Literal version
    Literal(String),
    /// Inherited from `[workspace.package]`
    Inherited {
        /// Always true when present
        workspace: bool,
    },
}

/// Workspace section
#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    /// Workspace members
    pub members: Option<Vec<String>>,
    /// Shared package metadata
    pub package: Option<WorkspacePackage>,
}

/// `[workspace.package]`
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspacePackage {
    /// Shared version
    pub version: Option<String>,
}

/// Where a crate's version is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionLocation {
    /// `[package] version` of the crate's own manifest
    Package(PathBuf),
    /// `[workspace.package] version` of the workspace root manifest
    Workspace(PathBuf),
}

impl CargoToml {
    /// Load Cargo.toml from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        toml::from_str(&content).map_err(|e| {
            AdapterError::ManifestParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Resolve a crate's version and where it is stored, following
    /// `version.workspace = true` up to the workspace root
    pub fn resolve_version(path: &Path) -> Result<(String, VersionLocation)> {
        let manifest = Self::load(path)?;
        let package = manifest.package.ok_or_else(|| no_package(path))?;

        match package.version {
            Some(VersionField::Literal(version)) => {
                Ok((version, VersionLocation::Package(path.to_path_buf())))
            }
            // Cargo defaults a missing version to 0.0.0
            None => Ok(("0.0.0".to_string(), VersionLocation::Package(path.to_path_buf()))),
            Some(VersionField::Inherited { .. }) => {
                let root = find_workspace_root(path)?;
                let version = Self::load(&root)?
                    .workspace
                    .and_then(|w| w.package)
                    .and_then(|p| p.version)
                    .ok_or_else(|| AdapterError::ManifestParseError {
                        path: root.clone(),
                        reason: "[workspace.package] has no version".to_string(),
                    })?;
                Ok((version, VersionLocation::Workspace(root)))
            }
        }
    }

    /// Update version in Cargo.toml (preserves formatting using toml_edit)
    pub fn update_version(location: &VersionLocation, version: &str) -> Result<()> {
        let (path, table_path): (&Path, &[&str]) = match location {
            VersionLocation::Package(path) => (path, &["package"]),
            VersionLocation::Workspace(path) => (path, &["workspace", "package"]),
        };

        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        let mut doc: DocumentMut =
            content
                .parse()
                .map_err(|e: toml_edit::TomlError| AdapterError::ManifestParseError {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        let mut table = doc.as_table_mut();
        for key in table_path {
            table = table
                .get_mut(key)
                .and_then(|item| item.as_table_mut())
                .ok_or_else(|| AdapterError::ManifestUpdateError {
                    path: path.to_path_buf(),
                    reason: format!("no [{}] section found", table_path.join(".")),
                })?;
        }
        table["version"] = value(version);

        std::fs::write(path, doc.to_string()).map_err(|e| {
            AdapterError::ManifestUpdateError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn no_package(path: &Path) -> tagsmith_core::TagsmithError {
    AdapterError::ManifestParseError {
        path: path.to_path_buf(),
        reason: "no [package] section found".to_string(),
    }
    .into()
}

/// Nearest ancestor manifest with a `[workspace]` section
fn find_workspace_root(manifest: &Path) -> Result<PathBuf> {
    for dir in manifest.parent().into_iter().flat_map(Path::ancestors) {
        let candidate = dir.join("Cargo.toml");
        if candidate.exists() && CargoToml::load(&candidate)?.workspace.is_some() {
            return Ok(candidate);
        }
    }

    Err(AdapterError::ManifestParseError {
        path: manifest.to_path_buf(),
        reason: "version is inherited but no workspace root was found".to_string(),
    }
    .into())
}
