//! Version strategy types

use serde::{Deserialize, Serialize};

/// Version components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionComponents {
    /// Major version
    pub major: u64,
    /// Minor version
    pub minor: u64,
    /// Patch version
    pub patch: u64,
    /// Pre-release identifier
    pub prerelease: Option<String>,
    /// Build metadata
    pub build: Option<String>,
}

impl VersionComponents {
    /// Create new version components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Set prerelease
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Convert to string representation
    pub fn to_version_string(&self) -> String {
        let mut v = format!("{}.{}.{}", self.major, self.minor, self.patch);

        if let Some(pre) = &self.prerelease {
            v.push('-');
            v.push_str(pre);
        }

        if let Some(build) = &self.build {
            v.push('+');
            v.push_str(build);
        }

        v
    }
}

impl std::fmt::Display for VersionComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_version_string())
    }
}

impl From<&semver::Version> for VersionComponents {
    fn from(version: &semver::Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            prerelease: (!version.pre.is_empty()).then(|| version.pre.to_string()),
            build: (!version.build.is_empty()).then(|| version.build.to_string()),
        }
    }
}

/// Outcome of a version decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Major version bump (breaking changes)
    Major,
    /// Minor version bump (new features)
    Minor,
    /// Patch version bump (everything else)
    Patch,
    /// The manifest already carries the computed target
    Synced,
    /// No bump
    None,
}

impl BumpType {
    /// Whether the changelog gets a version header for this outcome
    pub fn labels_release(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for BumpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Synced => write!(f, "synced"),
            Self::None => write!(f, "none"),
        }
    }
}

/// What the decision engine needs to know about a commit
pub trait BumpSignal {
    /// Conventional commit type (`feat`, `fix`, ...)
    fn commit_type(&self) -> &str;

    /// Whether the commit carries a breaking change
    fn is_breaking(&self) -> bool;
}

impl<T: BumpSignal + ?Sized> BumpSignal for &T {
    fn commit_type(&self) -> &str {
        (**self).commit_type()
    }

    fn is_breaking(&self) -> bool {
        (**self).is_breaking()
    }
}
