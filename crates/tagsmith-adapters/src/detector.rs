//! Package detection
//!
//! Packages come from the configuration (`[[packages]]`), from
//! `workspace.globs`, or, when neither is set, from the workspace globs of
//! the root `package.json` / `Cargo.toml`. A repository with none of these
//! is treated as a single package at the root.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use tagsmith_core::config::Config;
use tagsmith_core::error::{ConfigError, Result};
use tagsmith_core::types::PackageInfo;

use crate::cargo::CargoToml;
use crate::npm::PackageJson;
use crate::registry::AdapterRegistry;

/// Detect the packages of the repository at `root`
#[instrument(skip_all, fields(root = %root.display()))]
pub fn detect_packages(root: &Path, config: &Config) -> Result<Vec<PackageInfo>> {
    let registry = AdapterRegistry::new();
    let packages = detect_packages_with_registry(root, config, &registry)?;
    debug!(count = packages.len(), "detected packages");
    Ok(packages)
}

/// Detect packages using a custom registry
pub fn detect_packages_with_registry(
    root: &Path,
    config: &Config,
    registry: &AdapterRegistry,
) -> Result<Vec<PackageInfo>> {
    let mut packages: Vec<PackageInfo> = Vec::new();

    for pkg in &config.packages {
        let dir = root.join(&pkg.path);
        let adapter = registry.for_package(&dir, pkg.package_type.as_deref())?;

        let mut info = adapter.get_info(&dir)?.with_path(&pkg.path);
        info.name = pkg.name.clone();
        packages.push(info);
    }

    let globs = if config.workspace.globs.is_empty() && config.packages.is_empty() {
        workspace_globs(root)
    } else {
        config.workspace.globs.clone()
    };

    for pattern in &globs {
        for dir in expand_glob(root, pattern)? {
            let relative = dir.strip_prefix(root).unwrap_or(&dir).to_path_buf();
            if packages.iter().any(|p| p.path == relative) {
                continue;
            }
            match registry.read_package(&dir, &relative) {
                Ok(Some(info)) => packages.push(info),
                Ok(None) => {}
                Err(e) => warn!(path = %dir.display(), error = %e, "skipping unreadable package"),
            }
        }
    }

    if packages.is_empty() && config.packages.is_empty() && globs.is_empty() {
        packages.extend(registry.read_package(root, Path::new(""))?);
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

/// Find one package by name
pub fn find_package(root: &Path, config: &Config, name: &str) -> Result<PackageInfo> {
    detect_packages(root, config)?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ConfigError::UnknownPackage(name.to_string()).into())
}

fn expand_glob(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = root.join(pattern);
    let paths = glob::glob(&full.to_string_lossy()).map_err(|e| ConfigError::InvalidValue {
        field: "workspace.globs".to_string(),
        message: format!("'{}': {}", pattern, e),
    })?;

    let mut dirs: Vec<PathBuf> = paths.flatten().filter(|p| p.is_dir()).collect();
    dirs.sort();
    Ok(dirs)
}

/// Workspace globs declared by the root manifests
fn workspace_globs(root: &Path) -> Vec<String> {
    let mut globs = Vec::new();

    if let Ok(manifest) = PackageJson::load(&root.join("package.json")) {
        let list = match manifest.workspaces {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut map)) => match map.remove("packages") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        globs.extend(list.into_iter().filter_map(|v| v.as_str().map(str::to_string)));
    }

    if let Ok(manifest) = CargoToml::load(&root.join("Cargo.toml")) {
        if let Some(members) = manifest.workspace.and_then(|w| w.members) {
            globs.extend(members);
        }
    }

    globs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_core::config::PackageConfig;
    use tagsmith_core::TagsmithError;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    #[test]
    fn test_detect_empty_dir() {
        let temp = TempDir::new().unwrap();
        let packages = detect_packages(temp.path(), &Config::default()).unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_single_package_at_root() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Cargo.toml", "[package]\nname = \"tool\"\nversion = \"0.1.0\"\n");

        let packages = detect_packages(temp.path(), &Config::default()).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "tool");
        assert_eq!(packages[0].path, PathBuf::new());
    }

    #[test]
    fn test_npm_workspaces() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "package.json",
            r#"{"name": "root", "version": "0.0.0", "private": true, "workspaces": ["packages/*"]}"#,
        );
        write(temp.path(), "packages/ui/package.json", r#"{"name": "ui", "version": "1.0.0"}"#);
        write(temp.path(), "packages/core/package.json", r#"{"name": "core", "version": "2.1.0"}"#);
        write(temp.path(), "packages/notes/README.md", "no manifest");

        let packages = detect_packages(temp.path(), &Config::default()).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["core", "ui"]);
        assert_eq!(packages[1].path, PathBuf::from("packages/ui"));
    }

    #[test]
    fn test_unversioned_members_are_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "package.json", r#"{"name": "root", "private": true, "workspaces": ["packages/*"]}"#);
        write(temp.path(), "packages/ui/package.json", r#"{"name": "ui", "version": "1.0.0"}"#);
        write(temp.path(), "packages/eslint-config/package.json", r#"{"name": "eslint-config"}"#);

        let packages = detect_packages(temp.path(), &Config::default()).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ui"]);
    }

    #[test]
    fn test_config_globs_and_explicit_packages() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "crates/a/Cargo.toml", "[package]\nname = \"a\"\nversion = \"0.1.0\"\n");
        write(temp.path(), "tools/cli/package.json", r#"{"name": "@acme/cli", "version": "3.0.0"}"#);

        let mut config = Config::default();
        config.workspace.globs = vec!["crates/*".to_string()];
        config.packages.push(PackageConfig {
            name: "cli".to_string(),
            path: PathBuf::from("tools/cli"),
            package_type: Some("npm".to_string()),
            changelog: None,
        });

        let packages = detect_packages(temp.path(), &config).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "cli"]);
        assert_eq!(packages[1].version, "3.0.0");

        let cli = find_package(temp.path(), &config, "cli").unwrap();
        assert_eq!(cli.path, PathBuf::from("tools/cli"));

        let err = find_package(temp.path(), &config, "web").unwrap_err();
        assert!(matches!(err, TagsmithError::Config(ConfigError::UnknownPackage(_))));
    }

    #[test]
    fn test_explicit_package_without_manifest() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.packages.push(PackageConfig {
            name: "ghost".to_string(),
            path: PathBuf::from("ghost"),
            package_type: None,
            changelog: None,
        });

        let err = detect_packages(temp.path(), &config).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
