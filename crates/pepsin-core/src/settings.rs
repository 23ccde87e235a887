//! Tool settings resolved once at startup
//!
//! Defaults are overridden by environment variables, the same way the
//! template location can be redirected for development.

use crate::runtime::Platform;
use crate::templates::TemplateSource;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Name of the project config file in the working directory
pub const CONFIG_FILE: &str = "pepsin.yaml";

/// Name of the append-only failure log in the working directory
pub const FAILURE_LOG: &str = "pepsin.failed.log";

/// Where the package-manager bootstrap script is downloaded from
pub const DEFAULT_BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

/// Module run by the interpreter to provision an environment
pub const DEFAULT_ENVIRONMENT_TOOL: &str = "virtualenv";

/// Environment directory used when the project config names none
pub const DEFAULT_ENVIRONMENT_DIR: &str = "venv";

pub const TEMPLATE_DIR_ENV: &str = "PEPSIN_TEMPLATE_DIR";
pub const BOOTSTRAP_URL_ENV: &str = "PEPSIN_BOOTSTRAP_URL";
pub const PYTHON_ENV: &str = "PEPSIN_PYTHON";

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_file: String,
    pub failure_log: String,
    pub template_source: TemplateSource,
    pub bootstrap_url: Url,
    /// Interpreter used to provision environments; `None` means the platform default
    pub base_interpreter: Option<PathBuf>,
    pub environment_tool: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: CONFIG_FILE.to_string(),
            failure_log: FAILURE_LOG.to_string(),
            template_source: TemplateSource::Builtin,
            bootstrap_url: Url::parse(DEFAULT_BOOTSTRAP_URL).expect("default bootstrap URL is valid"),
            base_interpreter: None,
            environment_tool: DEFAULT_ENVIRONMENT_TOOL.to_string(),
        }
    }
}

impl Settings {
    /// Defaults layered with `PEPSIN_*` environment overrides
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(dir) = lookup(TEMPLATE_DIR_ENV).filter(|v| !v.is_empty()) {
            settings.template_source = TemplateSource::local(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(BOOTSTRAP_URL_ENV).filter(|v| !v.is_empty()) {
            settings.bootstrap_url = parse_bootstrap_url(&raw)?;
        }

        if let Some(python) = lookup(PYTHON_ENV).filter(|v| !v.is_empty()) {
            settings.base_interpreter = Some(PathBuf::from(python));
        }

        Ok(settings)
    }

    /// Interpreter used outside any environment
    pub fn base_interpreter(&self, platform: Platform) -> PathBuf {
        self.base_interpreter
            .clone()
            .unwrap_or_else(|| PathBuf::from(platform.system_executables().0))
    }
}

fn parse_bootstrap_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid bootstrap URL: {}", raw))?;
    if url.scheme() != "https" {
        anyhow::bail!(
            "Bootstrap URL must use https, got {} ({})",
            url.scheme(),
            raw
        );
    }
    Ok(url)
}

/// Everything a command needs to know about where it runs
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory all project paths are relative to
    pub root: PathBuf,
    pub settings: Settings,
    pub platform: Platform,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>, settings: Settings, platform: Platform) -> Self {
        Self {
            root: root.into(),
            settings,
            platform,
        }
    }

    /// Context for the current process: cwd, env settings, host platform
    pub fn from_env() -> Result<Self> {
        let root = std::env::current_dir().context("Failed to read working directory")?;
        Ok(Self::new(root, Settings::from_env()?, Platform::current()))
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path(&self.settings.config_file)
    }

    pub fn failure_log_path(&self) -> PathBuf {
        self.path(&self.settings.failure_log)
    }
}
