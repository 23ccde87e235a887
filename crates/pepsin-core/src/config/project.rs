//! Project state persisted in `pepsin.yaml`

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Package manager names that are never recorded or removed
pub const PACKAGE_MANAGER_NAMES: &[&str] = &["pip", "pip3"];

/// The project mapping stored next to the sources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient")]
    pub author: String,

    #[serde(default, deserialize_with = "lenient")]
    pub license: String,

    /// Environment directory, relative to the project root
    #[serde(rename = "venv", default, deserialize_with = "lenient")]
    pub environment_dir: String,

    /// `name` or `name==version`, unique by name
    #[serde(default, deserialize_with = "lenient")]
    pub libraries: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub scripts: BTreeMap<String, String>,

    /// Keys this tool does not manage, kept across rewrites
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Older files store empty fields as `''` or `null`
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(T::default()),
        serde_yaml::Value::String(s) if s.is_empty() => Ok(T::default()),
        other => T::deserialize(other).map_err(serde::de::Error::custom),
    }
}

/// Name part of a package spec (`flask==3.0` -> `flask`)
pub fn spec_name(spec: &str) -> &str {
    spec.split("==").next().unwrap_or(spec).trim()
}

/// Whether a spec names the package manager itself
pub fn is_package_manager(spec: &str) -> bool {
    PACKAGE_MANAGER_NAMES.contains(&spec_name(spec))
}

impl ProjectConfig {
    /// Merge specs into `libraries`, replacing any entry with the same name
    ///
    /// A replaced entry keeps its position; new names are appended in order.
    pub fn merge_libraries<S: AsRef<str>>(&mut self, specs: &[S]) {
        for spec in specs {
            let spec = spec.as_ref().trim();
            if spec.is_empty() {
                continue;
            }
            let name = spec_name(spec);

            match self
                .libraries
                .iter()
                .position(|existing| spec_name(existing) == name)
            {
                Some(index) => {
                    self.libraries[index] = spec.to_string();
                    // Drop any later duplicates a hand-edited file may carry
                    let mut seen = false;
                    self.libraries.retain(|existing| {
                        if spec_name(existing) != name {
                            return true;
                        }
                        let keep = !seen;
                        seen = true;
                        keep
                    });
                }
                None => self.libraries.push(spec.to_string()),
            }
        }
    }

    /// Remove exact matches from `libraries`
    pub fn remove_libraries<S: AsRef<str>>(&mut self, specs: &[S]) {
        self.libraries
            .retain(|existing| !specs.iter().any(|s| s.as_ref() == existing));
    }

    /// Command string for a named script
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}

/// Partial set of fields applied by [`super::ConfigStore::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub name: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    pub environment_dir: Option<String>,
    pub scripts: Option<BTreeMap<String, String>>,
    /// Specs merged into `libraries` by name
    pub libraries: Vec<String>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn environment_dir(mut self, dir: impl Into<String>) -> Self {
        self.environment_dir = Some(dir.into());
        self
    }

    pub fn scripts(mut self, scripts: BTreeMap<String, String>) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub fn libraries<S: Into<String>>(mut self, specs: impl IntoIterator<Item = S>) -> Self {
        self.libraries = specs.into_iter().map(Into::into).collect();
        self
    }

    /// Apply the library diff then the scalar fields
    pub fn apply(self, config: &mut ProjectConfig) {
        config.merge_libraries(&self.libraries);
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(author) = self.author {
            config.author = author;
        }
        if let Some(license) = self.license {
            config.license = license;
        }
        if let Some(dir) = self.environment_dir {
            config.environment_dir = dir;
        }
        if let Some(scripts) = self.scripts {
            config.scripts = scripts;
        }
    }
}
