//! npm package.json handling

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use tagsmith_core::error::{AdapterError, Result};

/// The package.json fields tagsmith reads
#[derive(Debug, Clone, Deserialize)]
pub struct PackageJson {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Whether package is private
    #[serde(default)]
    pub private: Option<bool>,

    /// Workspace globs of a monorepo root
    #[serde(default)]
    pub workspaces: Option<Value>,
}

impl PackageJson {
    /// Load package.json from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        serde_json::from_str(&content).map_err(|e| {
            AdapterError::ManifestParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Rewrite the `version` field, keeping every other field and the key order
    pub fn update_version(path: &Path, version: &str) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        let mut doc: Value =
            serde_json::from_str(&content).map_err(|e| AdapterError::ManifestParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let Some(object) = doc.as_object_mut() else {
            return Err(AdapterError::ManifestParseError {
                path: path.to_path_buf(),
                reason: "top level is not an object".to_string(),
            }
            .into());
        };
        object.insert("version".to_string(), Value::String(version.to_string()));

        let mut content =
            serde_json::to_string_pretty(&doc).map_err(|e| AdapterError::ManifestUpdateError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        content.push('\n');

        std::fs::write(path, content).map_err(|e| {
            AdapterError::ManifestUpdateError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
