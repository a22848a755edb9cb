//! Repository context shared by the commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use tagsmith_adapters::{detect_packages, find_package};
use tagsmith_changelog::{
    ChangelogTemplate, PackageChangelog, PackageTarget, TemplateOptions, TemplateRegistry,
};
use tagsmith_core::config::{load_config, load_config_or_default, Config};
use tagsmith_core::PackageInfo;
use tagsmith_git::GitRepo;

use crate::cli::Cli;

/// Configuration, repository and packages of the working directory
pub struct RepoContext {
    /// Loaded configuration
    pub config: Config,
    /// Where the configuration came from, if a file was found
    pub config_path: Option<PathBuf>,
    /// Git repository
    pub repo: GitRepo,
}

impl RepoContext {
    /// Discover the repository and load its configuration
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        let repo = GitRepo::discover(&cwd)?;
        let (config, config_path) = load_cli_config(cli, &cwd)?;
        debug!(root = %repo.path().display(), "repository context loaded");

        Ok(Self {
            config,
            config_path,
            repo,
        })
    }

    /// Repository working directory
    pub fn root(&self) -> &Path {
        self.repo.path()
    }

    /// All packages of the repository, sorted by name
    pub fn packages(&self) -> anyhow::Result<Vec<PackageInfo>> {
        Ok(detect_packages(self.root(), &self.config)?)
    }

    /// A single package by name
    pub fn package(&self, name: &str) -> anyhow::Result<PackageInfo> {
        Ok(find_package(self.root(), &self.config, name)?)
    }

    /// The named package, or the only package of a single-package repository
    pub fn package_or_single(&self, name: Option<&str>) -> anyhow::Result<PackageInfo> {
        if let Some(name) = name {
            return self.package(name);
        }

        let mut packages = self.packages()?;
        match packages.len() {
            1 => Ok(packages.remove(0)),
            0 => anyhow::bail!("No packages found in {}", self.root().display()),
            _ => {
                let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
                anyhow::bail!(
                    "Repository has {} packages ({}); pick one with --package",
                    names.len(),
                    names.join(", ")
                )
            }
        }
    }

    /// Changelog template by name, defaulting to the configured one
    pub fn template(&self, name: Option<&str>) -> anyhow::Result<Arc<dyn ChangelogTemplate>> {
        let options = TemplateOptions::from_config(
            &self.config.changelog,
            Arc::new(self.config.commit_rules.clone()),
        );
        let registry = TemplateRegistry::new(options);
        Ok(registry.get(name.unwrap_or(&self.config.changelog.template))?)
    }

    /// Orchestrator for one package
    pub fn changelog_for(
        &self,
        package: &PackageInfo,
        template: Arc<dyn ChangelogTemplate>,
    ) -> PackageChangelog<&GitRepo> {
        let target = PackageTarget::new(&package.name, &package.path)
            .with_manifest_version(&package.version);
        PackageChangelog::new(&self.repo, target, &self.config, template)
    }

    /// Changelog file of a package: the per-package override or `changelog.file_name`
    pub fn changelog_path(&self, package: &PackageInfo) -> PathBuf {
        let file = self
            .config
            .package(&package.name)
            .and_then(|p| p.changelog.clone())
            .unwrap_or_else(|| self.config.changelog.file_name.clone());
        self.root().join(&package.path).join(file)
    }
}

/// Load the configuration named by `--config`, or the nearest one above `dir`
pub fn load_cli_config(cli: &Cli, dir: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    match &cli.config {
        Some(path) => Ok((load_config(path)?, Some(path.clone()))),
        None => Ok(load_config_or_default(dir)?),
    }
}
