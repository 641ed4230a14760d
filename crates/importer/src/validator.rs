use crate::manifest::LoadedManifest;
use crate::{ImporterError, Result};
use std::collections::HashMap;
use tracing::warn;

pub struct ManifestValidator;

impl ManifestValidator {
    pub fn validate(manifests: &[LoadedManifest]) -> Result<ValidationReport> {
        let report = Self::report(manifests);

        if !report.errors.is_empty() {
            Err(ImporterError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }

    pub fn report(manifests: &[LoadedManifest]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen_names = HashMap::new();

        for loaded in manifests {
            let manifest = &loaded.manifest;
            let location = loaded.path.display();

            for (field, value) in [
                ("name", &manifest.name),
                ("category", &manifest.category),
                ("author", &manifest.author),
                ("flag", &manifest.flag),
            ] {
                if value.trim().is_empty() {
                    report
                        .errors
                        .push(format!("{}: {} is required", location, field));
                }
            }

            if let Some(first) = seen_names.insert(manifest.name.as_str(), &loaded.path) {
                report.errors.push(format!(
                    "{}: duplicate task name '{}' (already defined in {})",
                    location,
                    manifest.name,
                    first.display()
                ));
            }

            if let Some(attachment) = loaded.attachment_path() {
                if !attachment.is_file() {
                    report.errors.push(format!(
                        "{}: attachment not found: {}",
                        location,
                        attachment.display()
                    ));
                }
            }

            if manifest
                .description
                .as_deref()
                .is_none_or(|d| d.trim().is_empty())
            {
                report
                    .warnings
                    .push(format!("{}: task '{}' has no description", location, manifest.name));
            }
        }

        report
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TaskManifest;
    use std::path::PathBuf;

    fn loaded(dir: &str, name: &str) -> LoadedManifest {
        LoadedManifest {
            manifest: TaskManifest {
                name: name.to_string(),
                category: "crypto".to_string(),
                author: "theoremoon".to_string(),
                description: Some("RSA again".to_string()),
                flag: "CTF{x}".to_string(),
                attachment: None,
            },
            dir: PathBuf::from(dir),
            path: PathBuf::from(dir).join("task.yml"),
        }
    }

    #[test]
    fn test_valid_manifests() {
        let report = ManifestValidator::validate(&[loaded("a", "one"), loaded("b", "two")]).unwrap();
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_names_are_errors() {
        let report = ManifestValidator::report(&[loaded("a", "same"), loaded("b", "same")]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("duplicate task name 'same'"));
        assert!(ManifestValidator::validate(&[loaded("a", "same"), loaded("b", "same")]).is_err());
    }

    #[test]
    fn test_empty_fields_are_errors() {
        let mut manifest = loaded("a", "one");
        manifest.manifest.flag = " ".to_string();
        manifest.manifest.author = String::new();

        let report = ManifestValidator::report(&[manifest]);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_missing_attachment_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = loaded(dir.path().to_str().unwrap(), "one");
        manifest.manifest.attachment = Some(PathBuf::from("dist.zip"));

        let report = ManifestValidator::report(std::slice::from_ref(&manifest));
        assert_eq!(report.errors.len(), 1);

        std::fs::write(dir.path().join("dist.zip"), "zip").unwrap();
        let report = ManifestValidator::report(&[manifest]);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_missing_description_is_warning() {
        let mut manifest = loaded("a", "one");
        manifest.manifest.description = None;

        let report = ManifestValidator::validate(&[manifest]).unwrap();
        assert_eq!(report.warnings.len(), 1);
    }
}
