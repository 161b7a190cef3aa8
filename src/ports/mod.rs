// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::ProgressCallback;

/// Port for media metadata inspection
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Total container duration in seconds; `DomainError::Probe` when the file
    /// is unreadable or not a recognized media container
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError>;
}

/// Port for the transcoding engine's transform capability
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Policy this executor was configured with
    fn policy(&self) -> TrimPolicy;

    /// Produce `job.output` holding `job.window` of `job.input`.
    ///
    /// Progress fractions are reported to `progress` while the engine runs;
    /// failures surface as `DomainError::Encode`.
    async fn transform(
        &self,
        job: &TrimJob,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<OutputReport, DomainError>;
}

/// Port for session-scoped storage
#[async_trait]
pub trait SessionPort: Send + Sync {
    /// Allocate a new session with an empty output directory
    async fn create_session(&self) -> Result<Session, DomainError>;

    /// Look up an existing session; `None` when its output directory is absent
    async fn find_session(&self, session_id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Store an upload under a collision-resistant name
    async fn store_upload(
        &self,
        session_id: &SessionId,
        original_name: &str,
        body: UploadBody,
    ) -> Result<UploadedFile, DomainError>;

    /// Path of an existing output file; `DomainError::NotFound` otherwise
    async fn output_file(
        &self,
        session_id: &SessionId,
        file_name: &str,
    ) -> Result<PathBuf, DomainError>;

    /// Directory holding archives
    fn archive_dir(&self) -> PathBuf;

    /// Remove every artifact of a session; deleting an absent session succeeds
    async fn delete_session(&self, session_id: &SessionId) -> Result<(), DomainError>;
}
