//! End-to-end command scenarios against a throwaway project directory
//!
//! `venv/bin/python` and `venv/bin/pip` are small shell scripts that record
//! their arguments, so no real interpreter or network is involved.

#![cfg(unix)]

use pepsin_core::config::{ConfigStore, ConfigUpdate};
use pepsin_core::prompt::ScriptedReader;
use pepsin_core::runtime::{EnvironmentGateway, EnvironmentHandle};
use pepsin_core::{cli, Context, Platform, Settings};
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

const FAKE_PIP: &str = r#"#!/bin/sh
root="$(dirname "$0")/../.."
echo "$@" >> "$root/pip.calls"
for arg in "$@"; do
  if [ "$arg" = "bogus-pkg-xyz" ]; then
    exit 1
  fi
done
exit 0
"#;

const FAKE_PYTHON: &str = r#"#!/bin/sh
root="$(dirname "$0")/../.."
echo "$@" >> "$root/python.calls"
for arg in "$@"; do
  if [ "$arg" = "boom" ]; then
    exit 3
  fi
done
exit 0
"#;

fn write_executable(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Project root with a ready-made fake environment in `venv/`
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("venv").join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    write_executable(&bin.join("pip"), FAKE_PIP);
    write_executable(&bin.join("python"), FAKE_PYTHON);
    dir
}

fn context(dir: &TempDir) -> Context {
    Context::new(dir.path(), Settings::default(), Platform::Posix)
}

/// Context whose bootstrap download can never connect
fn offline_context(dir: &TempDir) -> Context {
    let mut settings = Settings::default();
    settings.bootstrap_url = url::Url::parse("https://127.0.0.1:1/get-pip.py").unwrap();
    Context::new(dir.path(), settings, Platform::Posix)
}

fn store(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join("pepsin.yaml"))
}

fn calls(dir: &TempDir, tool: &str) -> Option<String> {
    std::fs::read_to_string(dir.path().join(format!("{}.calls", tool))).ok()
}

async fn pepsin(dir: &TempDir, tokens: &[&str]) -> i32 {
    let argv: Vec<String> = std::iter::once("pepsin")
        .chain(tokens.iter().copied())
        .map(String::from)
        .collect();
    cli::execute(&argv, &context(dir), &mut ScriptedReader::default())
        .await
        .unwrap()
}

fn with_scripts(dir: &TempDir, scripts: &[(&str, &str)]) {
    let scripts: BTreeMap<String, String> = scripts
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let store = store(dir);
    let mut config = store.load().unwrap();
    store
        .update(
            &mut config,
            ConfigUpdate::new().environment_dir("venv").scripts(scripts),
        )
        .unwrap();
}

#[tokio::test]
async fn test_bulk_install_isolates_failures() {
    let dir = project();
    let gateway = EnvironmentGateway::new(&context(&dir));
    let handle = EnvironmentHandle::for_environment(Platform::Posix, &dir.path().join("venv"));

    let specs = vec!["good".to_string(), "bogus-pkg-xyz".to_string()];
    let result = gateway.install_many(&handle, &specs).await.unwrap();

    assert_eq!(result.succeeded, vec!["good"]);
    assert_eq!(result.failed, vec!["bogus-pkg-xyz"]);
    let log = std::fs::read_to_string(dir.path().join("pepsin.failed.log")).unwrap();
    assert!(log.contains("Module Installation Failed"));
    assert!(log.contains("bogus-pkg-xyz"));
    assert!(!log.contains("\ngood"));
}

#[tokio::test]
async fn test_install_command_records_only_successes() {
    let dir = project();

    let code = pepsin(&dir, &["install", "good", "bogus-pkg-xyz"]).await;

    assert_eq!(code, 0);
    assert_eq!(store(&dir).load().unwrap().libraries, vec!["good"]);
    assert_eq!(
        calls(&dir, "pip").unwrap(),
        "install good\ninstall bogus-pkg-xyz\n"
    );
    assert!(dir.path().join("pepsin.failed.log").exists());
}

#[tokio::test]
async fn test_reinstall_replaces_pinned_version() {
    let dir = project();

    pepsin(&dir, &["install", "flask==2.0", "requests"]).await;
    pepsin(&dir, &["i", "flask==3.0"]).await;

    assert_eq!(
        store(&dir).load().unwrap().libraries,
        vec!["flask==3.0", "requests"]
    );
}

#[tokio::test]
async fn test_install_without_arguments_uses_config_libraries() {
    let dir = project();
    let store = store(&dir);
    let mut config = store.load().unwrap();
    store
        .update(
            &mut config,
            ConfigUpdate::new()
                .environment_dir("venv")
                .libraries(["django", "celery==5.3"]),
        )
        .unwrap();

    assert_eq!(pepsin(&dir, &["install"]).await, 0);

    assert_eq!(
        calls(&dir, "pip").unwrap(),
        "install django\ninstall celery==5.3\n"
    );
}

#[tokio::test]
async fn test_install_reads_requirements_file() {
    let dir = project();
    std::fs::write(
        dir.path().join("requirements.txt"),
        "# web\nflask\n\nrequests==2.31\n",
    )
    .unwrap();

    pepsin(&dir, &["add", "-r", "requirements.txt"]).await;

    assert_eq!(
        store(&dir).load().unwrap().libraries,
        vec!["flask", "requests==2.31"]
    );
}

#[tokio::test]
async fn test_uninstall_removes_successes_and_keeps_pip() {
    let dir = project();
    let store = store(&dir);
    let mut config = store.load().unwrap();
    store
        .update(
            &mut config,
            ConfigUpdate::new()
                .environment_dir("venv")
                .libraries(["flask", "requests"]),
        )
        .unwrap();

    let code = pepsin(&dir, &["uninstall", "flask", "pip"]).await;

    assert_eq!(code, 0);
    assert_eq!(store.load().unwrap().libraries, vec!["requests"]);
    assert_eq!(calls(&dir, "pip").unwrap(), "uninstall flask -y\n");
}

#[tokio::test]
async fn test_upgrade_alias_upgrades_specs() {
    let dir = project();

    pepsin(&dir, &["update", "flask"]).await;

    assert_eq!(calls(&dir, "pip").unwrap(), "install --upgrade flask\n");
    assert_eq!(store(&dir).load().unwrap().libraries, vec!["flask"]);
}

#[tokio::test]
async fn test_unreachable_bootstrap_skips_pip_and_upgrades_the_rest() {
    let dir = project();
    let gateway = EnvironmentGateway::new(&offline_context(&dir));
    let handle = EnvironmentHandle::for_environment(Platform::Posix, &dir.path().join("venv"));

    let specs = vec!["pip".to_string(), "flask".to_string()];
    let result = gateway.upgrade_many(&handle, &specs).await.unwrap();

    assert_eq!(result.succeeded, vec!["flask"]);
    assert!(result.failed.is_empty());
    assert_eq!(calls(&dir, "pip").unwrap(), "install --upgrade flask\n");
    assert!(calls(&dir, "python").is_none());
    assert!(!dir.path().join("get_pip.py").exists());
    assert!(!dir.path().join("pepsin.failed.log").exists());
}

#[tokio::test]
async fn test_upgrade_command_with_pip_records_other_libraries() {
    let dir = project();
    let argv: Vec<String> = ["pepsin", "upgrade", "pip", "flask"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let code = cli::execute(&argv, &offline_context(&dir), &mut ScriptedReader::default())
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(store(&dir).load().unwrap().libraries, vec!["flask"]);
    assert_eq!(calls(&dir, "pip").unwrap(), "install --upgrade flask\n");
}

#[tokio::test]
async fn test_run_executes_module_script() {
    let dir = project();
    with_scripts(&dir, &[("start", "app.main")]);

    let code = pepsin(&dir, &["run", "start", "--port", "8000"]).await;

    assert_eq!(code, 0);
    assert_eq!(calls(&dir, "python").unwrap(), "-m app.main --port 8000\n");
}

#[tokio::test]
async fn test_run_missing_script_spawns_nothing() {
    let dir = project();
    with_scripts(&dir, &[("start", "app.main")]);

    let code = pepsin(&dir, &["run", "missing"]).await;

    assert_eq!(code, 1);
    assert!(calls(&dir, "python").is_none());
}

#[tokio::test]
async fn test_run_failing_script_carries_exit_code() {
    let dir = project();
    with_scripts(&dir, &[("explode", "tools/explode.py boom")]);

    let code = pepsin(&dir, &["run", "explode"]).await;

    assert_eq!(code, 3);
    assert_eq!(calls(&dir, "python").unwrap(), "tools/explode.py boom\n");
}

#[tokio::test]
async fn test_pip_passes_arguments_through() {
    let dir = project();
    with_scripts(&dir, &[]);

    assert_eq!(pepsin(&dir, &["pip", "list", "--outdated"]).await, 0);

    assert_eq!(calls(&dir, "pip").unwrap(), "list --outdated\n");
}

#[tokio::test]
async fn test_init_without_input_keeps_existing_entry_point() {
    let dir = project();
    let package = dir.path().join("package");
    std::fs::create_dir_all(&package).unwrap();
    std::fs::write(package.join("main.py"), "print('mine')\n").unwrap();

    let code = pepsin(&dir, &["init", "--no-input"]).await;

    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(package.join("main.py")).unwrap(),
        "print('mine')\n"
    );
    assert!(package.join("__init__.py").exists());
    assert!(dir.path().join(".gitignore").exists());

    let readme = std::fs::read_to_string(dir.path().join("Readme.MD")).unwrap();
    assert!(readme.starts_with("# package"));
    assert!(readme.contains("MIT"));

    let config = store(&dir).load().unwrap();
    assert_eq!(config.name, "package");
    assert_eq!(config.license, "MIT");
    assert_eq!(config.environment_dir, "venv");
    assert!(calls(&dir, "python").is_none());
}

#[tokio::test]
async fn test_init_prompts_for_metadata() {
    let dir = project();
    let argv: Vec<String> = ["pepsin", "init"].iter().map(|s| s.to_string()).collect();
    let mut reader = ScriptedReader::new(["demo", "Ada", "", "Apache-2.0"]);

    let code = cli::execute(&argv, &context(&dir), &mut reader).await.unwrap();

    assert_eq!(code, 0);
    assert_eq!(reader.prompts.len(), 4);
    let config = store(&dir).load().unwrap();
    assert_eq!(config.name, "demo");
    assert_eq!(config.author, "Ada");
    assert_eq!(config.license, "Apache-2.0");
    assert!(dir.path().join("demo/main.py").exists());

    let readme = std::fs::read_to_string(dir.path().join("Readme.MD")).unwrap();
    assert!(readme.contains("email@email.com"));
}

#[tokio::test]
async fn test_unknown_command_is_reported_not_raised() {
    let dir = project();
    assert_eq!(pepsin(&dir, &["deploy"]).await, 1);
}
