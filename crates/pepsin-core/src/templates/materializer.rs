//! Deferred file materialization from templates
//!
//! Jobs run in insertion order after a command's business logic succeeds.
//! There is no rollback: a failing job leaves earlier jobs' files in place.

use super::source::TemplateSource;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z0-9_]+)").expect("placeholder pattern is valid"));

/// One file to produce from a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateJob {
    /// Lookup key into the template source
    pub source_id: String,
    pub context: BTreeMap<String, String>,
    /// Destination, relative to the project root
    pub target: PathBuf,
    pub overwrite: bool,
}

impl TemplateJob {
    pub fn new(source_id: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            context: BTreeMap::new(),
            target: target.into(),
            overwrite: false,
        }
    }

    /// Target named after the template itself
    pub fn same_name(source_id: impl Into<String>) -> Self {
        let source_id = source_id.into();
        let target = PathBuf::from(&source_id);
        Self::new(source_id, target)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Replace `$key` tokens whose key is in `context`; others stay verbatim
pub fn render(template: &str, context: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Ordered queue of template jobs against one root and source
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
    source: TemplateSource,
    jobs: Vec<TemplateJob>,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>, source: TemplateSource) -> Self {
        Self {
            root: root.into(),
            source,
            jobs: Vec::new(),
        }
    }

    pub fn add(&mut self, jobs: impl IntoIterator<Item = TemplateJob>) {
        self.jobs.extend(jobs);
    }

    pub fn jobs(&self) -> &[TemplateJob] {
        &self.jobs
    }

    /// Apply every job in order, returning the files actually written
    pub async fn apply_all(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for job in &self.jobs {
            if let Some(path) = self.apply(job).await? {
                written.push(path);
            }
        }
        Ok(written)
    }

    async fn apply(&self, job: &TemplateJob) -> Result<Option<PathBuf>> {
        let target_path = self.root.join(&job.target);

        // Ensure parent directories exist
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        if !job.overwrite && exists(&target_path).await {
            debug!(target = %target_path.display(), "kept existing file");
            return Ok(None);
        }

        let template = self.source.read(&job.source_id).await?;
        fs::write(&target_path, render(&template, &job.context))
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        debug!(template = %job.source_id, target = %target_path.display(), "template written");
        Ok(Some(target_path))
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}
