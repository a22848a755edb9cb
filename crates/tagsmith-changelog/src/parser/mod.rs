//! Commit parsing

mod conventional;

pub use conventional::{ConventionalParser, DEPENDENCY_SCOPES};
pub(crate) use conventional::DEPENDENCY_BOTS;

use crate::types::CommitMessage;

/// Trait for commit parsers
pub trait CommitParser: Send + Sync {
    /// Parse a raw commit message. Never fails; unrecognised text degrades
    /// to the `other` type.
    fn parse(&self, raw: &str) -> CommitMessage;
}
