//! Core types for tagsmith

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Category a pull request is filed under in the changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrCategory {
    /// New functionality
    Features,
    /// Bug fixes
    Bugfixes,
    /// Dependency updates
    Dependencies,
    /// CI, build and tooling
    Infrastructure,
    /// Documentation
    Documentation,
    /// Refactoring, style and performance
    Refactoring,
    /// Anything else
    Other,
}

impl PrCategory {
    /// All categories, in tie-break priority order
    pub const PRIORITY: [PrCategory; 7] = [
        Self::Features,
        Self::Bugfixes,
        Self::Dependencies,
        Self::Infrastructure,
        Self::Documentation,
        Self::Refactoring,
        Self::Other,
    ];

    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Features => "features",
            Self::Bugfixes => "bugfixes",
            Self::Dependencies => "dependencies",
            Self::Infrastructure => "infrastructure",
            Self::Documentation => "documentation",
            Self::Refactoring => "refactoring",
            Self::Other => "other",
        }
    }

    /// Changelog heading for the category
    pub fn title(&self) -> &'static str {
        match self {
            Self::Features => "Features",
            Self::Bugfixes => "Bug Fixes",
            Self::Dependencies => "Dependencies",
            Self::Infrastructure => "Infrastructure",
            Self::Documentation => "Documentation",
            Self::Refactoring => "Refactoring",
            Self::Other => "Other Changes",
        }
    }

    /// Fallback emoji when no configured commit type maps to the category
    pub fn default_emoji(&self) -> &'static str {
        match self {
            Self::Features => "✨",
            Self::Bugfixes => "🐛",
            Self::Dependencies => "📦",
            Self::Infrastructure => "🏗️",
            Self::Documentation => "📚",
            Self::Refactoring => "♻️",
            Self::Other => "🔀",
        }
    }
}

impl std::fmt::Display for PrCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PrCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "features" | "feature" => Ok(Self::Features),
            "bugfixes" | "bugfix" | "fixes" => Ok(Self::Bugfixes),
            "dependencies" | "deps" => Ok(Self::Dependencies),
            "infrastructure" | "infra" => Ok(Self::Infrastructure),
            "documentation" | "docs" => Ok(Self::Documentation),
            "refactoring" | "refactor" => Ok(Self::Refactoring),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown PR category: {}", s)),
        }
    }
}

/// Package information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Current version from the manifest
    pub version: String,
    /// Package type (npm, cargo)
    pub package_type: String,
    /// Package directory, relative to the repository root
    pub path: PathBuf,
    /// Path to the package manifest
    pub manifest_path: PathBuf,
    /// Whether this is a private package
    pub private: bool,
}

impl PackageInfo {
    /// Create new package info
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        package_type: impl Into<String>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        let manifest_path = manifest_path.into();
        let path = manifest_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        Self {
            name: name.into(),
            version: version.into(),
            package_type: package_type.into(),
            path,
            manifest_path,
            private: false,
        }
    }

    /// Set the package directory
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set whether private
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}
