//! Read-modify-write access to the project config file
//!
//! Every mutation rewrites the whole mapping. The new content is written to a
//! sibling file and renamed over the original so a crash never leaves a
//! truncated config behind.

pub mod project;

pub use project::{is_package_manager, spec_name, ConfigUpdate, ProjectConfig};

use crate::error::PepsinError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on one config file path
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the config; a missing or blank file yields defaults
    pub fn load(&self) -> Result<ProjectConfig> {
        if !self.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(ProjectConfig::default());
        }

        let malformed = |reason: String| PepsinError::MalformedConfig {
            path: self.path.clone(),
            reason,
        };

        let value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| malformed(e.to_string()))?;
        if !value.is_mapping() {
            return Err(malformed("top level is not a mapping".to_string()).into());
        }

        Ok(serde_yaml::from_value(value).map_err(|e| malformed(e.to_string()))?)
    }

    /// Apply a partial update and rewrite the file
    pub fn update(&self, config: &mut ProjectConfig, update: ConfigUpdate) -> Result<()> {
        update.apply(config);
        self.save(config)
    }

    /// Drop exact library matches and rewrite the file
    pub fn remove_libraries<S: AsRef<str>>(
        &self,
        config: &mut ProjectConfig,
        specs: &[S],
    ) -> Result<()> {
        config.remove_libraries(specs);
        self.save(config)
    }

    /// Write `seed` only when no config file exists yet; returns the current config
    pub fn ensure_initialized(&self, seed: ConfigUpdate) -> Result<ProjectConfig> {
        let mut config = self.load()?;
        if !self.exists() {
            debug!(path = %self.path.display(), "initializing project config");
            self.update(&mut config, seed)?;
        }
        Ok(config)
    }

    fn save(&self, config: &ProjectConfig) -> Result<()> {
        let content = serde_yaml::to_string(config).context("Failed to serialize config")?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, content)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), libraries = config.libraries.len(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("pepsin.yaml"))
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_update_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut config = store.load().unwrap();
        store
            .update(
                &mut config,
                ConfigUpdate::new().name("demo").libraries(["flask==2.0"]),
            )
            .unwrap();
        store
            .update(&mut config, ConfigUpdate::new().libraries(["flask==3.0"]))
            .unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.name, "demo");
        assert_eq!(reloaded.libraries, vec!["flask==3.0"]);
        assert!(!dir.path().join("pepsin.yaml.tmp").exists());
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let seed = || ConfigUpdate::new().name("demo").environment_dir("venv");

        store.ensure_initialized(seed()).unwrap();
        let first = std::fs::read(store.path()).unwrap();

        store.ensure_initialized(seed()).unwrap();
        let second = std::fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_ensure_initialized_leaves_existing_file_alone() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "name: kept\n").unwrap();

        let config = store
            .ensure_initialized(ConfigUpdate::new().name("seed"))
            .unwrap();

        assert_eq!(config.name, "kept");
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "name: kept\n");
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "name: demo\npython: '3.12'\n").unwrap();

        let mut config = store.load().unwrap();
        store
            .update(&mut config, ConfigUpdate::new().libraries(["flask"]))
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("python: '3.12'"));
        assert!(content.contains("- flask"));
    }

    #[test]
    fn test_remove_libraries_persists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut config = store.load().unwrap();
        store
            .update(&mut config, ConfigUpdate::new().libraries(["flask", "requests"]))
            .unwrap();

        store.remove_libraries(&mut config, &["flask"]).unwrap();

        assert_eq!(store.load().unwrap().libraries, vec!["requests"]);
    }

    #[test]
    fn test_non_mapping_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "- just\n- a list\n").unwrap();

        let err = store.load().unwrap_err();
        let domain = PepsinError::find(&err).expect("domain error");
        assert_eq!(domain.kind(), "MalformedConfigError");
    }

    #[test]
    fn test_unparseable_yaml_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "name: [unclosed\n").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(
            PepsinError::find(&err),
            Some(PepsinError::MalformedConfig { .. })
        ));
    }
}
