//! Isolated environment provisioning and subprocess delegation

use super::platform::Platform;
use crate::error::PepsinError;
use crate::settings::Context;
use anyhow::{Context as _, Result};
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};
use url::Url;

/// Marker variable pointing at the active environment root
pub const ENVIRONMENT_MARKER: &str = "VIRTUAL_ENV";

/// Resolved executables plus the variables that activate an environment
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentHandle {
    pub interpreter: PathBuf,
    pub package_manager: PathBuf,
    /// Variables set on every child process (`PATH`, `VIRTUAL_ENV`)
    pub overlay: Vec<(String, OsString)>,
    /// Environment root, `None` for the system interpreter
    pub root: Option<PathBuf>,
}

impl EnvironmentHandle {
    /// Handle on the system-wide interpreter, without any overlay
    pub fn system(platform: Platform) -> Self {
        let (interpreter, package_manager) = platform.system_executables();
        Self {
            interpreter: PathBuf::from(interpreter),
            package_manager: PathBuf::from(package_manager),
            overlay: Vec::new(),
            root: None,
        }
    }

    /// Handle on an environment rooted at `env_root`
    ///
    /// The inherited `PATH` is appended verbatim after the script dir, so
    /// roots containing the separator character are accepted.
    pub fn for_environment(platform: Platform, env_root: &Path) -> Self {
        let script_dir = env_root.join(platform.script_dir());

        let mut path = script_dir.clone().into_os_string();
        if let Some(current) = std::env::var_os("PATH").filter(|p| !p.is_empty()) {
            path.push(platform.path_separator().to_string());
            path.push(current);
        }

        Self {
            interpreter: script_dir.join(platform.executable_name("python")),
            package_manager: script_dir.join(platform.executable_name("pip")),
            overlay: vec![
                ("PATH".to_string(), path),
                (
                    ENVIRONMENT_MARKER.to_string(),
                    env_root.as_os_str().to_os_string(),
                ),
            ],
            root: Some(env_root.to_path_buf()),
        }
    }
}

/// Which executable of a handle a command line targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Interpreter,
    PackageManager,
}

/// Runs interpreter and package-manager commands from the project root
#[derive(Debug, Clone)]
pub struct EnvironmentGateway {
    root: PathBuf,
    platform: Platform,
    base_interpreter: PathBuf,
    environment_tool: String,
    failure_log: PathBuf,
    bootstrap_url: Url,
}

impl EnvironmentGateway {
    pub fn new(ctx: &Context) -> Self {
        Self {
            root: ctx.root.clone(),
            platform: ctx.platform,
            base_interpreter: ctx.settings.base_interpreter(ctx.platform),
            environment_tool: ctx.settings.environment_tool.clone(),
            failure_log: ctx.failure_log_path(),
            bootstrap_url: ctx.settings.bootstrap_url.clone(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Append-only log receiving batch failures
    pub fn failure_log(&self) -> &Path {
        &self.failure_log
    }

    pub fn bootstrap_url(&self) -> &Url {
        &self.bootstrap_url
    }

    /// Provision `dir_name` if it is not a directory yet, then return its handle
    pub async fn ensure_environment(&self, dir_name: &str) -> Result<EnvironmentHandle> {
        let env_root = self.root.join(dir_name);

        if env_root.is_dir() {
            debug!(dir = %env_root.display(), "environment already present");
        } else {
            println!(
                "{} {}",
                "Creating environment".cyan(),
                dir_name.bold()
            );
            let mut command = TokioCommand::new(&self.base_interpreter);
            command
                .arg("-m")
                .arg(&self.environment_tool)
                .arg(dir_name)
                .current_dir(&self.root);
            execute(command, &self.base_interpreter)
                .await
                .with_context(|| format!("Failed to provision environment {}", dir_name))?;
            info!(dir = %env_root.display(), "environment provisioned");
        }

        Ok(EnvironmentHandle::for_environment(self.platform, &env_root))
    }

    /// Run one of the handle's executables with `args` under its overlay
    pub async fn run<S: AsRef<str>>(
        &self,
        handle: &EnvironmentHandle,
        tool: Tool,
        args: &[S],
    ) -> Result<()> {
        let program = match tool {
            Tool::Interpreter => &handle.interpreter,
            Tool::PackageManager => &handle.package_manager,
        };

        let mut command = TokioCommand::new(program);
        command
            .args(args.iter().map(AsRef::as_ref))
            .current_dir(&self.root)
            .envs(handle.overlay.iter().map(|(k, v)| (k.as_str(), v.as_os_str())));

        debug!(
            program = %program.display(),
            args = ?args.iter().map(AsRef::as_ref).collect::<Vec<_>>(),
            "running"
        );
        execute(command, program).await
    }

    pub async fn install_one(&self, handle: &EnvironmentHandle, spec: &str) -> Result<()> {
        self.run(handle, Tool::PackageManager, &["install", spec])
            .await
    }

    pub async fn upgrade_one(&self, handle: &EnvironmentHandle, spec: &str) -> Result<()> {
        self.run(handle, Tool::PackageManager, &["install", "--upgrade", spec])
            .await
    }

    pub async fn uninstall_one(&self, handle: &EnvironmentHandle, spec: &str) -> Result<()> {
        self.run(handle, Tool::PackageManager, &["uninstall", spec, "-y"])
            .await
    }
}

/// Spawn with inherited stdio and map a non-zero exit to `ProcessExecution`
async fn execute(mut command: TokioCommand, program: &Path) -> Result<()> {
    let status = command
        .status()
        .await
        .with_context(|| format!("Failed to start {}", program.display()))?;

    if status.success() {
        Ok(())
    } else {
        Err(PepsinError::ProcessExecution {
            program: program.display().to_string(),
            exit_code: status.code(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_handle_has_no_overlay() {
        let handle = EnvironmentHandle::system(Platform::Posix);
        assert_eq!(handle.interpreter, PathBuf::from("python3"));
        assert_eq!(handle.package_manager, PathBuf::from("pip3"));
        assert!(handle.overlay.is_empty());
        assert!(handle.root.is_none());
    }

    fn overlay_value(handle: &EnvironmentHandle, key: &str) -> String {
        handle
            .overlay
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.to_string_lossy().into_owned())
            .unwrap()
    }

    #[test]
    fn test_environment_handle_prepends_script_dir() {
        let root = PathBuf::from("/work/venv");
        let handle = EnvironmentHandle::for_environment(Platform::Posix, &root);

        assert_eq!(handle.interpreter, root.join("bin").join("python"));
        assert_eq!(handle.package_manager, root.join("bin").join("pip"));

        let path = overlay_value(&handle, "PATH");
        let script_dir = root.join("bin").to_string_lossy().into_owned();
        assert!(path == script_dir || path.starts_with(&format!("{}:", script_dir)));

        assert_eq!(overlay_value(&handle, ENVIRONMENT_MARKER), "/work/venv");
    }

    #[test]
    fn test_root_containing_path_separator_is_accepted() {
        let root = PathBuf::from("/tmp/a:b/venv");
        let handle = EnvironmentHandle::for_environment(Platform::Posix, &root);

        assert_eq!(handle.interpreter, root.join("bin").join("python"));
        assert!(overlay_value(&handle, "PATH").starts_with("/tmp/a:b/venv/bin"));
        assert_eq!(overlay_value(&handle, ENVIRONMENT_MARKER), "/tmp/a:b/venv");
    }

    #[test]
    fn test_windows_environment_layout() {
        let root = PathBuf::from("C:/work/venv");
        let handle = EnvironmentHandle::for_environment(Platform::Windows, &root);

        assert_eq!(
            handle.package_manager,
            root.join("Scripts").join("pip.exe")
        );
        let path = overlay_value(&handle, "PATH");
        let script_dir = root.join("Scripts").to_string_lossy().into_owned();
        assert!(path == script_dir || path.starts_with(&format!("{};", script_dir)));
    }
}
