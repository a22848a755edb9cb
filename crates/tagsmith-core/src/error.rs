//! Error types for tagsmith

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TagsmithError
pub type Result<T> = std::result::Result<T, TagsmithError>;

/// Main error type for tagsmith operations
#[derive(Debug, Error)]
pub enum TagsmithError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// Adapter-related errors
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Unknown package requested
    #[error("Package '{0}' is not configured or discovered in this repository")]
    UnknownPackage(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// A commit hash did not resolve
    #[error("Commit '{hash}' could not be resolved: {reason}")]
    CommitLookup { hash: String, reason: String },

    /// Output of a git command could not be interpreted
    #[error("Unexpected output from `{command}`: {reason}")]
    MalformedOutput { command: String, reason: String },

    /// A git subprocess exited unsuccessfully
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Version string is not a valid semantic version
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Manifest version moved ahead of the tag history
    #[error(
        "Version drift for '{package}': manifest is at {manifest_version} but the last tag is \
         {tagged_version} and the computed target is {target_version}"
    )]
    Drift {
        package: String,
        manifest_version: String,
        tagged_version: String,
        target_version: String,
    },

    /// Semver error
    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Commit message failed rule validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown template name
    #[error("Unknown changelog template '{0}'")]
    UnknownTemplate(String),

    /// Failed to write changelog
    #[error("Failed to write changelog {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A commit message that broke one or more rules
#[derive(Debug, Error)]
#[error("Commit '{subject}' violates {} rule(s): {}", .violations.len(), .violations.join("; "))]
pub struct ValidationError {
    /// Subject line of the offending commit
    pub subject: String,
    /// Human-readable rule violations
    pub violations: Vec<String>,
}

/// Adapter-related errors
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Package manifest not found
    #[error("Package manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    /// Failed to parse manifest
    #[error("Failed to parse manifest {path}: {reason}")]
    ManifestParseError { path: PathBuf, reason: String },

    /// Failed to update manifest
    #[error("Failed to update manifest {path}: {reason}")]
    ManifestUpdateError { path: PathBuf, reason: String },

    /// Unsupported package type
    #[error("Unsupported package type: {0}")]
    UnsupportedType(String),

    /// No adapter recognised the directory
    #[error("No package manifest found in {0}")]
    NoManifest(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Operation called in the wrong phase
    #[error("Changelog for '{package}' is not ready: {message}")]
    State { package: String, message: String },

    /// One or more packages failed during a batch run
    #[error("{failed} of {total} package(s) failed")]
    BatchFailed { failed: usize, total: usize },
}

impl TagsmithError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
