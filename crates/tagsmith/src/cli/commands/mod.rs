//! CLI commands

mod changelog;
mod init;
mod lint;
mod packages;
mod version;

pub use changelog::ChangelogCommand;
pub use init::InitCommand;
pub use lint::LintCommand;
pub use packages::PackagesCommand;
pub use version::VersionCommand;
