//! Loading of project-local skill contracts.
//!
//! The local skills directory holds one `*.json` contract per file. Files are
//! read in file-name order; anything unreadable or invalid is reported and
//! skipped, so a single broken file never blocks the rest.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SkillRegistryError};
use crate::events::{EventSink, RegistryEvent};
use crate::types::SkillContract;
use crate::validator::validate_skill_contract;

/// File extension recognised as a skill contract.
pub const CONTRACT_EXTENSION: &str = "json";

/// Loads and validates contracts from a directory.
#[derive(Clone)]
pub struct LocalSkillLoader {
    sink: Arc<dyn EventSink>,
}

impl LocalSkillLoader {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Load every valid contract in `dir`.
    ///
    /// A missing directory yields an empty list. A directory that exists but
    /// cannot be listed is an `IO_ERROR`.
    pub async fn load(&self, dir: &Path) -> Result<Vec<SkillContract>> {
        let files = match contract_files(dir).await {
            Ok(files) => files,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.sink.emit(RegistryEvent::LocalDirMissing { dir: dir.to_path_buf() });
                return Ok(Vec::new());
            }
            Err(source) => return Err(SkillRegistryError::Io { path: dir.to_path_buf(), source }),
        };

        let mut contracts = Vec::with_capacity(files.len());
        for file in files {
            if let Some(contract) = self.load_file(&file).await {
                contracts.push(contract);
            }
        }

        Ok(contracts)
    }

    async fn load_file(&self, file: &Path) -> Option<SkillContract> {
        let parsed = match tokio::fs::read_to_string(file).await {
            Ok(content) => serde_json::from_str::<serde_json::Value>(&content).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let raw = match parsed {
            Ok(raw) => raw,
            Err(error) => {
                self.sink.emit(RegistryEvent::LocalFileUnreadable { file: file.to_path_buf(), error });
                return None;
            }
        };

        match validate_skill_contract(&raw) {
            Ok(contract) => Some(contract),
            Err(violations) => {
                self.sink.emit(RegistryEvent::InvalidLocalFile {
                    file: file.to_path_buf(),
                    errors: violations.into_iter().map(|v| v.message).collect(),
                });
                None
            }
        }
    }
}

/// `*.json` entries directly inside `dir`, sorted by file name.
async fn contract_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == CONTRACT_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::events::{EventLevel, RecordingSink};
    use crate::types::SkillSource;
    use crate::types::fixtures::raw_entry;
    use std::fs;
    use tempfile::TempDir;

    fn create_contract_file(dir: &Path, file_name: &str, id: &str) {
        fs::write(dir.join(file_name), serde_json::to_string_pretty(&raw_entry(id, "LOCAL")).unwrap()).unwrap();
    }

    fn loader() -> (LocalSkillLoader, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        (LocalSkillLoader::new(sink.clone()), sink)
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("skills");
        let (loader, sink) = loader();

        let contracts = loader.load(&missing).await.unwrap();
        assert!(contracts.is_empty());
        assert_eq!(sink.events(), vec![RegistryEvent::LocalDirMissing { dir: missing }]);
    }

    #[tokio::test]
    async fn test_loads_json_files_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        create_contract_file(temp_dir.path(), "b-skill.json", "zeta");
        create_contract_file(temp_dir.path(), "a-skill.json", "alpha");
        fs::write(temp_dir.path().join("README.md"), "# not a contract").unwrap();
        let (loader, sink) = loader();

        let contracts = loader.load(temp_dir.path()).await.unwrap();
        let ids: Vec<_> = contracts.iter().map(|c| c.skill_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert!(contracts.iter().all(|c| c.source() == SkillSource::Local));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        create_contract_file(temp_dir.path(), "good.json", "good");
        fs::write(temp_dir.path().join("broken.json"), "{ \"skill_id\": ").unwrap();
        let (loader, sink) = loader();

        let contracts = loader.load(temp_dir.path()).await.unwrap();
        assert_eq!(contracts.len(), 1);

        let errors = sink.at_level(EventLevel::Error);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            RegistryEvent::LocalFileUnreadable { file, .. } => assert!(file.ends_with("broken.json")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_contract_is_skipped_with_field_messages() {
        let temp_dir = TempDir::new().unwrap();
        let mut raw = raw_entry("custom", "LOCAL");
        raw.as_object_mut().unwrap().remove("constraints");
        fs::write(temp_dir.path().join("custom.json"), raw.to_string()).unwrap();
        let (loader, sink) = loader();

        let contracts = loader.load(temp_dir.path()).await.unwrap();
        assert!(contracts.is_empty());
        match &sink.events()[0] {
            RegistryEvent::InvalidLocalFile { file, errors } => {
                assert!(file.ends_with("custom.json"));
                assert_eq!(errors, &vec!["constraints is required".to_string()]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicates_are_left_to_the_resolver() {
        let temp_dir = TempDir::new().unwrap();
        create_contract_file(temp_dir.path(), "one.json", "same");
        create_contract_file(temp_dir.path(), "two.json", "same");
        let (loader, _) = loader();

        let contracts = loader.load(temp_dir.path()).await.unwrap();
        assert_eq!(contracts.len(), 2);
    }

    #[tokio::test]
    async fn test_path_that_is_a_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("skills");
        fs::write(&file, "not a directory").unwrap();
        let (loader, _) = loader();

        let err = loader.load(&file).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
