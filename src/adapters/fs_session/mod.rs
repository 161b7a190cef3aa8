// Filesystem session adapter - Session state lives entirely in directory structure

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::{FileNameRules, OutputNamer, UploadValidator};
use crate::ports::*;

/// Directory-backed session store.
///
/// Layout under the storage root:
///
/// ```text
/// uploads/<session>/<uuid>-<name>
/// outputs/<session>/
/// archives/trimmed_videos_<session>.zip
/// ```
pub struct FsSessionAdapter {
    root: PathBuf,
}

impl FsSessionAdapter {
    /// Create new session adapter rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    fn outputs_dir(&self) -> PathBuf {
        self.root.join("outputs")
    }

    fn upload_dir(&self, session_id: &SessionId) -> PathBuf {
        self.uploads_dir().join(session_id.to_string())
    }

    fn output_dir(&self, session_id: &SessionId) -> PathBuf {
        self.outputs_dir().join(session_id.to_string())
    }

    async fn remove_dir_if_present(path: &Path) -> Result<bool, DomainError> {
        match fs::remove_dir_all(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to delete directory {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn remove_file_if_present(path: &Path) -> Result<bool, DomainError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[async_trait]
impl SessionPort for FsSessionAdapter {
    async fn create_session(&self) -> Result<Session, DomainError> {
        let id = SessionId::generate();
        let session = Session {
            id,
            created_at: Utc::now(),
            upload_dir: self.upload_dir(&id),
            output_dir: self.output_dir(&id),
        };

        for dir in [&session.output_dir, &session.upload_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                DomainError::Storage(format!(
                    "Failed to create session directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    async fn find_session(&self, session_id: &SessionId) -> Result<Option<Session>, DomainError> {
        let output_dir = self.output_dir(session_id);
        let metadata = match fs::metadata(&output_dir).await {
            Ok(metadata) if metadata.is_dir() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "Failed to inspect session directory {}: {}",
                    output_dir.display(),
                    e
                )))
            }
        };

        // Birth time is not recorded on every filesystem
        let created_at: DateTime<Utc> = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::from)
            .map_err(|e| {
                DomainError::Storage(format!(
                    "Failed to read creation time of {}: {}",
                    output_dir.display(),
                    e
                ))
            })?;

        Ok(Some(Session {
            id: *session_id,
            created_at,
            upload_dir: self.upload_dir(session_id),
            output_dir,
        }))
    }

    async fn store_upload(
        &self,
        session_id: &SessionId,
        original_name: &str,
        body: UploadBody,
    ) -> Result<UploadedFile, DomainError> {
        let upload_dir = self.upload_dir(session_id);
        fs::create_dir_all(&upload_dir).await.map_err(|e| {
            DomainError::Storage(format!("Failed to create upload directory: {}", e))
        })?;

        let storage_name = format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            UploadValidator::storage_component(original_name)
        );
        let storage_path = upload_dir.join(storage_name);

        match body {
            UploadBody::Path(source) => {
                fs::copy(&source, &storage_path).await.map_err(|e| {
                    DomainError::Storage(format!(
                        "Failed to store upload {}: {}",
                        source.display(),
                        e
                    ))
                })?;
            }
            UploadBody::Bytes(bytes) => {
                fs::write(&storage_path, bytes).await.map_err(|e| {
                    DomainError::Storage(format!("Failed to store upload {}: {}", original_name, e))
                })?;
            }
        }

        debug!(
            session_id = %session_id,
            original = original_name,
            path = %storage_path.display(),
            "Upload stored"
        );

        Ok(UploadedFile {
            original_name: original_name.to_string(),
            storage_path,
            session_id: *session_id,
        })
    }

    async fn output_file(
        &self,
        session_id: &SessionId,
        file_name: &str,
    ) -> Result<PathBuf, DomainError> {
        if !FileNameRules::is_single_component(file_name) {
            return Err(DomainError::NotFound(format!("File not found: {}", file_name)));
        }

        let path = self.output_dir(session_id).join(file_name);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            Ok(_) => Err(DomainError::NotFound(format!("File not found: {}", file_name))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DomainError::NotFound(format!("File not found: {}", file_name)))
            }
            Err(e) => Err(DomainError::Storage(format!(
                "Failed to inspect {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn archive_dir(&self) -> PathBuf {
        self.root.join("archives")
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), DomainError> {
        let archive = self.archive_dir().join(OutputNamer::archive_name(session_id));

        let removed_outputs = Self::remove_dir_if_present(&self.output_dir(session_id)).await?;
        let removed_uploads = Self::remove_dir_if_present(&self.upload_dir(session_id)).await?;
        let removed_archive = Self::remove_file_if_present(&archive).await?;

        if removed_outputs || removed_uploads || removed_archive {
            info!(session_id = %session_id, "Session deleted");
        } else {
            warn!(session_id = %session_id, "Cleanup requested for unknown session");
        }
        Ok(())
    }
}
