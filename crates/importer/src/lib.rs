pub mod error;
pub mod manifest;
pub mod sources;
pub mod traits;
pub mod validator;

pub use error::{ImporterError, Result};
pub use manifest::{LoadedManifest, TaskManifest};
pub use sources::directory::DirectoryImporter;
pub use traits::{ImportContext, ImportSummary, TaskImporter};
pub use validator::{ManifestValidator, ValidationReport};
