use crate::{ImporterError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storage::{models::derive_task_id, repository::task::TaskDefinition};

pub const MANIFEST_FILE_NAME: &str = "task.yml";

/// On-disk description of one task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskManifest {
    pub name: String,
    pub category: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub flag: String,
    /// Relative to the directory holding the manifest.
    #[serde(default)]
    pub attachment: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: TaskManifest,
    pub dir: PathBuf,
    pub path: PathBuf,
}

impl LoadedManifest {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ImporterError::io(path, e))?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let manifest: TaskManifest =
            serde_yaml::from_str(content).map_err(|source| ImporterError::Manifest {
                path: path.display().to_string(),
                source,
            })?;

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            manifest,
            dir,
            path: path.to_path_buf(),
        })
    }

    pub fn attachment_path(&self) -> Option<PathBuf> {
        self.manifest
            .attachment
            .as_ref()
            .map(|attachment| self.dir.join(attachment))
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment_path().is_some_and(|path| path.is_file())
    }

    pub fn to_definition(&self) -> TaskDefinition {
        let manifest = &self.manifest;
        TaskDefinition {
            task_id: derive_task_id(&manifest.name),
            name: manifest.name.clone(),
            category: manifest.category.clone(),
            author: manifest.author.clone(),
            description: manifest
                .description
                .clone()
                .filter(|description| !description.trim().is_empty()),
            flag: manifest.flag.clone(),
            has_attachment: self.has_attachment(),
        }
    }
}

/// Every `task.yml` below `root`, sorted by path.
pub async fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| ImporterError::io(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ImporterError::io(&dir, e))?
        {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.file_name().is_some_and(|name| name == MANIFEST_FILE_NAME) {
                manifests.push(path);
            }
        }
    }

    manifests.sort();
    Ok(manifests)
}

pub async fn load_all(root: &Path) -> Result<Vec<LoadedManifest>> {
    let mut loaded = Vec::new();
    for path in discover(root).await? {
        tracing::debug!("Loading manifest {}", path.display());
        loaded.push(LoadedManifest::load(&path).await?);
    }
    Ok(loaded)
}
