//! tagsmith changelog - commit analysis and changelog rendering
//!
//! This crate parses commits, resolves pull requests from merge commits,
//! validates messages against the commit rules and renders per-package
//! changelogs through [`PackageChangelog`].

pub mod formatter;
pub mod orchestrator;
pub mod parser;
pub mod pr;
pub mod reader;
pub mod rules;
pub mod types;

pub use formatter::{ChangelogTemplate, CompactTemplate, DefaultTemplate, TemplateOptions, TemplateRegistry};
pub use orchestrator::{PackageChangelog, PackageTarget};
pub use parser::{CommitParser, ConventionalParser};
pub use pr::PrResolver;
pub use reader::GitCommitReader;
pub use rules::{CommitRuleEngine, RuleKind, RuleViolation};
pub use types::{ChangelogData, CommitMessage, ParsedCommit, PrInfo, PrStats, VersionContent, UNRELEASED};
