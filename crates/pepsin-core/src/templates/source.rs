//! Where template files are read from

use crate::error::PepsinError;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Templates compiled into the binary, keyed by source id
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (".gitignore", include_str!("../../templates/gitignore")),
    ("Readme.MD", include_str!("../../templates/Readme.MD")),
    ("main.py", include_str!("../../templates/main.py")),
    ("__init__.py", include_str!("../../templates/__init__.py")),
];

/// Template source - either the built-in set or a local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    /// Ids the built-in set can serve
    pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
        BUILTIN_TEMPLATES.iter().map(|(id, _)| *id)
    }

    /// Read a template's raw text, failing with `TemplateNotFound` on a miss
    pub async fn read(&self, source_id: &str) -> Result<String> {
        match self {
            TemplateSource::Builtin => BUILTIN_TEMPLATES
                .iter()
                .find(|(id, _)| *id == source_id)
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| {
                    anyhow::Error::from(PepsinError::TemplateNotFound {
                        path: Path::new("<builtin>").join(source_id),
                    })
                }),
            TemplateSource::Local(dir) => {
                let path = dir.join(source_id);
                if !is_plain_relative(source_id) || !path.is_file() {
                    return Err(PepsinError::TemplateNotFound { path }.into());
                }
                fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read template {}", path.display()))
            }
        }
    }
}

/// Reject ids that would escape the template directory
fn is_plain_relative(source_id: &str) -> bool {
    Path::new(source_id)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_builtin_templates_resolve() {
        for id in TemplateSource::builtin_ids() {
            assert!(TemplateSource::Builtin.read(id).await.is_ok(), "{}", id);
        }
        let readme = TemplateSource::Builtin.read("Readme.MD").await.unwrap();
        assert!(readme.contains("$name"));
    }

    #[tokio::test]
    async fn test_builtin_miss_is_template_not_found() {
        let err = TemplateSource::Builtin.read("setup.cfg").await.unwrap_err();
        assert_eq!(PepsinError::find(&err).unwrap().kind(), "TemplateNotFoundError");
    }

    #[tokio::test]
    async fn test_local_source_reads_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Readme.MD"), "# local $name").unwrap();
        let source = TemplateSource::local(dir.path().to_path_buf());

        assert_eq!(source.read("Readme.MD").await.unwrap(), "# local $name");
        assert!(source.read("missing.txt").await.is_err());
        assert!(source.read("../Readme.MD").await.is_err());
    }
}
