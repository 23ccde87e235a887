//! Best-effort bulk package operations
//!
//! Each spec is attempted on its own. A spec whose package-manager call exits
//! non-zero lands in `failed` and the batch moves on; any other error (the
//! executable could not even be started) aborts the batch.

use super::environment::{EnvironmentGateway, EnvironmentHandle, Tool};
use crate::config::is_package_manager;
use crate::error::PepsinError;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File the bootstrap script is written to before it runs
const BOOTSTRAP_SCRIPT: &str = "get_pip.py";

/// Outcome of a batch operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl InstallationResult {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    Install,
    Upgrade,
    Uninstall,
}

impl BatchAction {
    /// Header written to the failure log
    pub fn failure_title(&self) -> &'static str {
        match self {
            BatchAction::Install => "Module Installation Failed",
            BatchAction::Upgrade => "Module Upgrade Failed",
            BatchAction::Uninstall => "Unable to uninstall",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            BatchAction::Install => "install",
            BatchAction::Upgrade => "upgrade",
            BatchAction::Uninstall => "uninstall",
        }
    }
}

/// Explicit specs followed by the usable lines of a requirements file
///
/// A missing requirements file is reported and otherwise ignored.
pub fn collect_specs(root: &Path, specs: &[String], requirements: Option<&str>) -> Result<Vec<String>> {
    let mut collected: Vec<String> = specs
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(file) = requirements.filter(|f| !f.is_empty()) {
        let path = root.join(file);
        if !path.is_file() {
            eprintln!("{} {} does not exist", "Warning:".yellow(), file);
        } else {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            collected.extend(parse_requirements(&content));
        }
    }

    Ok(collected)
}

/// Non-blank, non-comment lines of a requirements file
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

impl EnvironmentGateway {
    pub async fn install_many(
        &self,
        handle: &EnvironmentHandle,
        specs: &[String],
    ) -> Result<InstallationResult> {
        let result = self.process_batch(handle, BatchAction::Install, specs).await?;
        self.finish(BatchAction::Install, result)
    }

    /// Upgrade specs; the package manager itself is upgraded via its bootstrap script
    pub async fn upgrade_many(
        &self,
        handle: &EnvironmentHandle,
        specs: &[String],
    ) -> Result<InstallationResult> {
        let (managers, rest): (Vec<String>, Vec<String>) =
            specs.iter().cloned().partition(|s| is_package_manager(s));

        let mut result = InstallationResult::default();
        if !managers.is_empty() {
            if let Err(e) = self.bootstrap_package_manager(handle).await {
                if PepsinError::find(&e).is_some() {
                    eprintln!("{} {:#}", "Unable to upgrade pip:".red(), e);
                    result.failed.extend(managers);
                } else {
                    eprintln!("{} {:#}", "Warning: Unable to upgrade pip:".yellow(), e);
                }
            }
        }

        let batch = self.process_batch(handle, BatchAction::Upgrade, &rest).await?;
        result.succeeded.extend(batch.succeeded);
        result.failed.extend(batch.failed);
        self.finish(BatchAction::Upgrade, result)
    }

    pub async fn uninstall_many(
        &self,
        handle: &EnvironmentHandle,
        specs: &[String],
    ) -> Result<InstallationResult> {
        let mut removable = Vec::new();
        for spec in specs {
            if is_package_manager(spec) {
                eprintln!("{} Unable to uninstall pip", "Warning:".yellow());
            } else {
                removable.push(spec.clone());
            }
        }
        let result = self
            .process_batch(handle, BatchAction::Uninstall, &removable)
            .await?;
        self.finish(BatchAction::Uninstall, result)
    }

    async fn process_batch(
        &self,
        handle: &EnvironmentHandle,
        action: BatchAction,
        specs: &[String],
    ) -> Result<InstallationResult> {
        let mut result = InstallationResult::default();

        for spec in specs {
            let outcome = match action {
                BatchAction::Install => self.install_one(handle, spec).await,
                BatchAction::Upgrade => self.upgrade_one(handle, spec).await,
                BatchAction::Uninstall => self.uninstall_one(handle, spec).await,
            };

            match outcome {
                Ok(()) => {
                    // The package manager is never tracked as a project library
                    if !is_package_manager(spec) {
                        result.succeeded.push(spec.clone());
                    }
                }
                Err(e) => match PepsinError::find(&e) {
                    Some(PepsinError::ProcessExecution { .. }) => {
                        eprintln!("{} {}", format!("Unable to {}", action.verb()).red(), spec);
                        warn!(spec = %spec, error = %e, "batch item failed");
                        result.failed.push(spec.clone());
                    }
                    _ => return Err(e),
                },
            }
        }

        Ok(result)
    }

    /// Log whatever failed across the whole operation, once
    fn finish(&self, action: BatchAction, result: InstallationResult) -> Result<InstallationResult> {
        if !result.is_clean() {
            append_failure_log(self.failure_log(), action.failure_title(), &result.failed)?;
        }

        debug!(
            action = action.verb(),
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "batch finished"
        );
        Ok(result)
    }

    /// Download the bootstrap script and run it with the environment interpreter
    ///
    /// Network failures come back as plain errors, a failing script as
    /// `ProcessExecution`.
    async fn bootstrap_package_manager(&self, handle: &EnvironmentHandle) -> Result<()> {
        let url = self.bootstrap_url().clone();
        println!("{} {}", "Downloading".cyan(), url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("pepsin/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let response = client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }
        let script = response.text().await?;

        let script_path: PathBuf = self.root().join(BOOTSTRAP_SCRIPT);
        tokio::fs::write(&script_path, script)
            .await
            .with_context(|| format!("Failed to write {}", script_path.display()))?;

        let outcome = self
            .run(handle, Tool::Interpreter, &[BOOTSTRAP_SCRIPT])
            .await;
        let _ = tokio::fs::remove_file(&script_path).await;
        outcome
    }
}

/// Append a timestamped block of failed specs to the failure log
pub fn append_failure_log(path: &Path, title: &str, failed: &[String]) -> Result<()> {
    let stamp = chrono::Local::now().format("%d %B %Y | %H:%M:%S");
    let mut block = format!("\n# {} {}", title, stamp);
    for spec in failed {
        block.push('\n');
        block.push_str(spec);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(block.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
