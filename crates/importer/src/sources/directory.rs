use crate::manifest::{self, LoadedManifest};
use crate::traits::{ImportContext, ImportSummary, TaskImporter};
use crate::validator::{ManifestValidator, ValidationReport};
use crate::Result;
use std::path::PathBuf;
use storage::repository::task::TaskRepository;
use tracing::info;

/// Imports every `task.yml` found under a directory tree.
pub struct DirectoryImporter {
    root: PathBuf,
}

impl DirectoryImporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load and validate without touching the database.
    pub async fn prepare(&self) -> Result<(Vec<LoadedManifest>, ValidationReport)> {
        info!("Scanning {} for task manifests", self.root.display());
        let manifests = manifest::load_all(&self.root).await?;
        info!("Found {} task manifest(s)", manifests.len());

        let report = ManifestValidator::validate(&manifests)?;
        report.log_warnings();

        Ok((manifests, report))
    }
}

#[async_trait::async_trait]
impl TaskImporter for DirectoryImporter {
    async fn import(&self, context: &ImportContext) -> Result<ImportSummary> {
        let (manifests, _) = self.prepare().await?;
        let definitions: Vec<_> = manifests.iter().map(LoadedManifest::to_definition).collect();

        let stored = TaskRepository::new(&context.pool)
            .upsert_all(&definitions)
            .await?;

        let mut summary = ImportSummary::default();
        for (task, created) in stored {
            if created {
                summary.created += 1;
                info!("Created task '{}' ({}), closed until opened", task.name, task.task_id);
            } else {
                summary.updated += 1;
                info!("Updated task '{}' ({})", task.name, task.task_id);
            }
        }

        Ok(summary)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
