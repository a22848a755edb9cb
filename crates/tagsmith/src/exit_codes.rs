//! Exit codes for the CLI

use tagsmith_core::error::{ChangelogError, GitError, TagsmithError, WorkflowError};

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Version error, including manifest drift
pub const VERSION_ERROR: i32 = 4;

/// Commit message validation error
pub const VALIDATION_ERROR: i32 = 5;

/// Some packages of a batch run failed
pub const BATCH_ERROR: i32 = 6;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }

    match err.downcast_ref::<TagsmithError>() {
        Some(TagsmithError::Config(_)) => CONFIG_ERROR,
        Some(TagsmithError::Git(_)) => GIT_ERROR,
        Some(TagsmithError::Version(_)) => VERSION_ERROR,
        Some(TagsmithError::Changelog(ChangelogError::Validation(_))) => VALIDATION_ERROR,
        Some(TagsmithError::Workflow(WorkflowError::BatchFailed { .. })) => BATCH_ERROR,
        _ => ERROR,
    }
}
