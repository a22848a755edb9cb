//! Version command

use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{info, warn};

use tagsmith_adapters::AdapterRegistry;
use tagsmith_core::error::{TagsmithError, WorkflowError};
use tagsmith_core::PackageInfo;
use tagsmith_strategies::VersionData;

use crate::cli::output::{self, version_style};
use crate::cli::{Cli, OutputFormat, RepoContext};

/// GitHub Actions output listing the packages to release
const DEPLOY_OUTPUT: &str = "packages-to-deploy";

/// Decide the next version of one or all packages
#[derive(Debug, Args)]
pub struct VersionCommand {
    /// Package name (optional in single-package repositories)
    #[arg(short, long, conflicts_with = "all")]
    pub package: Option<String>,

    /// Start of the commit range (defaults to the package's newest tag)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the commit range
    #[arg(long, default_value = "HEAD")]
    pub to: String,

    /// Decide without writing the new version into manifests
    #[arg(long)]
    pub dry_run: bool,

    /// Process every package of the repository
    #[arg(long)]
    pub all: bool,
}

/// Decision for one package, as reported to the user
#[derive(Debug, Serialize)]
struct PackageReport {
    package: String,
    #[serde(flatten)]
    version: VersionData,
    commit_count: usize,
    tag: Option<String>,
    manifest_updated: bool,
}

impl PackageReport {
    /// Whether CI should release this package
    fn deploys(&self) -> bool {
        self.version.bump_type.labels_release()
    }
}

/// Outcome of one package in a batch
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchEntry {
    Done(PackageReport),
    Failed { package: String, error: String },
}

impl VersionCommand {
    /// Execute the version command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(package = ?self.package, all = self.all, dry_run = self.dry_run, "executing version command");
        let ctx = RepoContext::load(cli)?;
        let registry = AdapterRegistry::new();

        if self.all {
            return self.execute_batch(&ctx, &registry, cli);
        }

        let package = ctx.package_or_single(self.package.as_deref())?;
        let report = self.decide(&ctx, &registry, &package)?;
        write_deploy_output([&report])?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_report(&report, cli),
        }
        Ok(())
    }

    fn execute_batch(
        &self,
        ctx: &RepoContext,
        registry: &AdapterRegistry,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        let packages = ctx.packages()?;
        let total = packages.len();
        let mut entries = Vec::with_capacity(total);

        for package in &packages {
            match self.decide(ctx, registry, package) {
                Ok(report) => entries.push(BatchEntry::Done(report)),
                Err(e) => {
                    warn!(package = %package.name, error = %e, "package failed, continuing batch");
                    entries.push(BatchEntry::Failed {
                        package: package.name.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        let reports: Vec<&PackageReport> = entries
            .iter()
            .filter_map(|e| match e {
                BatchEntry::Done(r) => Some(r),
                BatchEntry::Failed { .. } => None,
            })
            .collect();
        write_deploy_output(reports.iter().copied())?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
            OutputFormat::Text => {
                for entry in &entries {
                    match entry {
                        BatchEntry::Done(report) => print_report(report, cli),
                        BatchEntry::Failed { package, error } => {
                            output::error(&format!("{}: {}", style(package).bold(), error))
                        }
                    }
                    if !cli.quiet {
                        println!();
                    }
                }
            }
        }

        let failed = total - reports.len();
        if failed > 0 {
            return Err(TagsmithError::from(WorkflowError::BatchFailed { failed, total }).into());
        }
        Ok(())
    }

    fn decide(
        &self,
        ctx: &RepoContext,
        registry: &AdapterRegistry,
        package: &PackageInfo,
    ) -> anyhow::Result<PackageReport> {
        let start = Instant::now();
        let template = ctx.template(None)?;
        let mut changelog = ctx.changelog_for(package, template);
        let version = changelog.set_range(self.from.as_deref(), &self.to)?.clone();
        let commit_count = changelog.commit_count()?;

        let mut manifest_updated = false;
        if version.should_bump && !self.dry_run {
            let adapter = registry.require(&package.package_type)?;
            adapter.set_version(&ctx.root().join(&package.path), &version.target_version)?;
            manifest_updated = true;
            info!(package = %package.name, version = %version.target_version, "manifest updated");
        }

        let tag = version.bump_type.labels_release().then(|| {
            ctx.config
                .versioning
                .format_tag(&package.name, &version.target_version)
        });

        info!(
            package = %package.name,
            bump = %version.bump_type,
            commit_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "version decided"
        );

        Ok(PackageReport {
            package: package.name.clone(),
            version,
            commit_count,
            tag,
            manifest_updated,
        })
    }
}

fn write_deploy_output<'a>(
    reports: impl IntoIterator<Item = &'a PackageReport>,
) -> anyhow::Result<()> {
    let deploy: Vec<&str> = reports
        .into_iter()
        .filter(|r| r.deploys())
        .map(|r| r.package.as_str())
        .collect();
    if output::github_output(DEPLOY_OUTPUT, &serde_json::to_string(&deploy)?)? {
        info!(count = deploy.len(), "wrote {} to GITHUB_OUTPUT", DEPLOY_OUTPUT);
    }
    Ok(())
}

fn print_report(report: &PackageReport, cli: &Cli) {
    let version = &report.version;
    if cli.quiet {
        println!("{} {}", report.package, version.target_version);
        return;
    }

    println!("{}", output::header(&report.package));
    println!("{}", output::key_value("Current version", &version.current_version));
    println!(
        "{}",
        output::key_value(
            "Next version",
            &version_style().apply_to(&version.target_version).to_string()
        )
    );
    println!(
        "{}",
        output::key_value("Bump type", &style(version.bump_type).yellow().to_string())
    );
    println!("{}", output::key_value("Commits analyzed", &report.commit_count.to_string()));
    if let Some(tag) = &report.tag {
        println!(
            "{}",
            output::key_value("Tag", &output::tag_style().apply_to(tag).to_string())
        );
    }
    println!("{}", output::key_value("Reason", &version.reason));

    if report.manifest_updated {
        output::success("Manifest updated");
    } else if version.should_bump {
        output::info("Dry run, manifest left unchanged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_strategies::BumpType;

    fn report(package: &str, bump_type: BumpType) -> PackageReport {
        PackageReport {
            package: package.to_string(),
            version: VersionData {
                current_version: "1.0.0".to_string(),
                bump_type,
                should_bump: bump_type != BumpType::None && bump_type != BumpType::Synced,
                target_version: "1.1.0".to_string(),
                reason: "test".to_string(),
            },
            commit_count: 1,
            tag: None,
            manifest_updated: false,
        }
    }

    #[test]
    fn test_synced_packages_still_deploy() {
        assert!(report("ui", BumpType::Minor).deploys());
        assert!(report("ui", BumpType::Synced).deploys());
        assert!(!report("ui", BumpType::None).deploys());
    }

    #[test]
    fn test_report_json_is_flat() {
        let json = serde_json::to_value(report("ui", BumpType::Minor)).unwrap();
        assert_eq!(json["package"], "ui");
        assert_eq!(json["bump_type"], "minor");
        assert_eq!(json["target_version"], "1.1.0");
        assert_eq!(json["should_bump"], true);
    }

    #[test]
    fn test_failed_entry_json() {
        let entry = BatchEntry::Failed {
            package: "core".to_string(),
            error: "Version drift".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["package"], "core");
        assert_eq!(json["error"], "Version drift");
    }
}
