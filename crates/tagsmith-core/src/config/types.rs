//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::PrCategory;

/// Main configuration for tagsmith
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Versioning configuration
    pub versioning: VersioningConfig,

    /// Changelog configuration
    pub changelog: ChangelogConfig,

    /// Commit message rules and type metadata
    pub commit_rules: CommitRulesConfig,

    /// Explicitly configured packages
    pub packages: Vec<PackageConfig>,

    /// Workspace discovery configuration
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Find an explicitly configured package by name
    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Versioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Tag format, with `{package}` and `{version}` placeholders
    pub tag_format: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            tag_format: "{package}@{version}".to_string(),
        }
    }
}

impl VersioningConfig {
    /// Render the tag name for a package version
    pub fn format_tag(&self, package: &str, version: &str) -> String {
        self.tag_format
            .replace("{package}", package)
            .replace("{version}", version)
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file name, relative to the package directory
    pub file_name: PathBuf,

    /// Template name (default, compact)
    pub template: String,

    /// Repository URL used for commit and PR links
    pub repo_url: Option<String>,

    /// Document title
    pub title: String,

    /// Whether to include release dates in version headers
    pub include_dates: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from("CHANGELOG.md"),
            template: "default".to_string(),
            repo_url: None,
            title: "Changelog".to_string(),
            include_dates: true,
        }
    }
}

/// Commit rules: allowed types with their display metadata, scopes and length bands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRulesConfig {
    /// Allowed commit types, in changelog display order
    pub types: Vec<CommitTypeConfig>,

    /// Scopes allowed in addition to the repository's package names
    pub extra_scopes: Vec<String>,

    /// Minimum description length
    pub description_min: usize,

    /// Maximum description length
    pub description_max: usize,

    /// Minimum length of each body line
    pub body_min: usize,

    /// Maximum length of each body line
    pub body_max: usize,
}

impl Default for CommitRulesConfig {
    fn default() -> Self {
        use PrCategory::*;

        let types = vec![
            CommitTypeConfig::new("feat", "Features", "✨", "brightgreen", Features, true),
            CommitTypeConfig::new("fix", "Bug Fixes", "🐛", "red", Bugfixes, true),
            CommitTypeConfig::new("perf", "Performance", "⚡", "orange", Refactoring, true),
            CommitTypeConfig::new("refactor", "Refactoring", "♻️", "yellow", Refactoring, true),
            CommitTypeConfig::new("docs", "Documentation", "📚", "blue", Documentation, false),
            CommitTypeConfig::new("style", "Styles", "💄", "ff69b4", Refactoring, false),
            CommitTypeConfig::new("test", "Tests", "🧪", "lightgrey", Other, false),
            CommitTypeConfig::new("build", "Build", "🏗️", "purple", Infrastructure, true),
            CommitTypeConfig::new("ci", "CI", "👷", "9cf", Infrastructure, false),
            CommitTypeConfig::new("chore", "Chores", "🔧", "inactive", Infrastructure, false),
            CommitTypeConfig::new("revert", "Reverts", "⏪", "critical", Other, true),
            CommitTypeConfig::new("deps", "Dependencies", "📦", "informational", Dependencies, false),
        ];

        Self {
            types,
            extra_scopes: Vec::new(),
            description_min: 3,
            description_max: 100,
            body_min: 0,
            body_max: 200,
        }
    }
}

impl CommitRulesConfig {
    /// Look up a commit type by name
    pub fn type_config(&self, name: &str) -> Option<&CommitTypeConfig> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Names of all allowed types, in display order
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Display rank of a type; unknown types sort after every configured one
    /// and `deps` always sorts last.
    pub fn type_order(&self, name: &str) -> usize {
        if name == "deps" {
            return usize::MAX;
        }
        self.types
            .iter()
            .position(|t| t.name == name)
            .unwrap_or(self.types.len())
    }

    /// Whether the type may carry a breaking change
    pub fn breaking_allowed(&self, name: &str) -> bool {
        self.type_config(name).is_some_and(|t| t.breaking_allowed)
    }

    /// Heading label for a type, falling back to the type name
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.type_config(name).map_or(name, |t| t.label.as_str())
    }

    /// Emoji for a type
    pub fn emoji(&self, name: &str) -> &str {
        self.type_config(name).map_or("🔀", |t| t.emoji.as_str())
    }

    /// Badge colour for a type
    pub fn badge_color(&self, name: &str) -> &str {
        self.type_config(name)
            .map_or("lightgrey", |t| t.badge_color.as_str())
    }

    /// Emoji for a PR category, taken from the first type mapped to it
    pub fn category_emoji(&self, category: PrCategory) -> &str {
        self.types
            .iter()
            .find(|t| t.category == category)
            .map_or(category.default_emoji(), |t| t.emoji.as_str())
    }
}

/// Configuration for a commit type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitTypeConfig {
    /// Type name as written in the commit subject
    pub name: String,
    /// Section heading in the changelog
    pub label: String,
    /// Emoji shown next to the heading
    #[serde(default)]
    pub emoji: String,
    /// shields.io badge colour
    #[serde(default = "default_badge_color")]
    pub badge_color: String,
    /// PR category this type counts towards
    #[serde(default = "default_category")]
    pub category: PrCategory,
    /// Whether `!` / BREAKING CHANGE is accepted on this type
    #[serde(default)]
    pub breaking_allowed: bool,
}

impl CommitTypeConfig {
    /// Create a commit type definition
    pub fn new(
        name: &str,
        label: &str,
        emoji: &str,
        badge_color: &str,
        category: PrCategory,
        breaking_allowed: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            emoji: emoji.to_string(),
            badge_color: badge_color.to_string(),
            category,
            breaking_allowed,
        }
    }
}

fn default_badge_color() -> String {
    "lightgrey".to_string()
}

fn default_category() -> PrCategory {
    PrCategory::Other
}

/// Package-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name
    pub name: String,

    /// Path to package (relative to repo root)
    pub path: PathBuf,

    /// Package type (npm, cargo)
    #[serde(rename = "type", default)]
    pub package_type: Option<String>,

    /// Changelog file override, relative to the package directory
    #[serde(default)]
    pub changelog: Option<PathBuf>,
}

/// Workspace discovery configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Glob patterns of package directories (e.g. `packages/*`)
    pub globs: Vec<String>,
}
