// Session interactor - Archive, retrieval and cleanup of a session's outputs

use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::output::{ArchiveBuilder, FileResponse, RangeFileServer};
use crate::ports::*;

/// Interactor for everything that happens to a session after processing
pub struct SessionInteractor {
    session_port: Arc<dyn SessionPort>,
    archive_builder: ArchiveBuilder,
}

impl SessionInteractor {
    /// Create new session interactor with injected ports
    pub fn new(session_port: Arc<dyn SessionPort>) -> Self {
        Self {
            session_port,
            archive_builder: ArchiveBuilder::new(),
        }
    }

    /// Zip the session's output directory.
    ///
    /// Must only be called once processing of the session has finished.
    /// Re-archiving replaces the previous archive.
    pub async fn create_archive(&self, session_id: &SessionId) -> Result<ArchiveInfo, DomainError> {
        let session = self.require_session(session_id).await?;

        let file_name = OutputNamer::archive_name(session_id);
        let path = self.session_port.archive_dir().join(&file_name);
        let entries = self.archive_builder.build(&session.output_dir, &path).await?;

        info!(session_id = %session_id, archive = %file_name, entries, "Session archived");
        Ok(ArchiveInfo {
            session_id: *session_id,
            retrieval_path: OutputNamer::archive_retrieval_path(&file_name),
            file_name,
            path,
            entries,
        })
    }

    /// Serve a generated output, honoring a single byte range
    pub async fn retrieve_output(
        &self,
        session_id: &SessionId,
        file_name: &str,
        range: Option<&str>,
    ) -> Result<FileResponse, DomainError> {
        let path = self.session_port.output_file(session_id, file_name).await?;
        RangeFileServer::serve(&path, range).await
    }

    /// Serve an archive by file name, always in full
    pub async fn retrieve_archive(&self, file_name: &str) -> Result<FileResponse, DomainError> {
        if !FileNameRules::is_single_component(file_name) || !file_name.ends_with(".zip") {
            return Err(DomainError::NotFound(format!("Archive not found: {}", file_name)));
        }
        RangeFileServer::serve_full(&self.session_port.archive_dir().join(file_name)).await
    }

    /// Remove every artifact of the session; repeating it is harmless
    pub async fn cleanup(&self, session_id: &SessionId) -> Result<(), DomainError> {
        self.session_port.delete_session(session_id).await
    }

    async fn require_session(&self, session_id: &SessionId) -> Result<Session, DomainError> {
        self.session_port
            .find_session(session_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Session not found: {}", session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FsSessionAdapter;
    use tempfile::TempDir;

    async fn session_with_outputs(root: &TempDir) -> (SessionInteractor, Session) {
        let store = Arc::new(FsSessionAdapter::new(root.path()));
        let session = store.create_session().await.unwrap();
        std::fs::write(session.output_dir.join("trimmed_1.mp4"), vec![1u8; 1000]).unwrap();
        std::fs::write(session.output_dir.join("trimmed_3.mp4"), vec![3u8; 10]).unwrap();
        (SessionInteractor::new(store), session)
    }

    #[tokio::test]
    async fn test_archive_then_retrieve() {
        let root = TempDir::new().unwrap();
        let (sessions, session) = session_with_outputs(&root).await;

        let archive = sessions.create_archive(&session.id).await.unwrap();
        assert_eq!(archive.entries, 2);
        assert_eq!(archive.file_name, format!("trimmed_videos_{}.zip", session.id));
        assert_eq!(archive.retrieval_path, format!("/download-zip/{}", archive.file_name));

        let response = sessions.retrieve_archive(&archive.file_name).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/zip");
    }

    #[tokio::test]
    async fn test_archive_unknown_session_is_not_found() {
        let root = TempDir::new().unwrap();
        let sessions = SessionInteractor::new(Arc::new(FsSessionAdapter::new(root.path())));
        let err = sessions.create_archive(&SessionId::generate()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_retrieve_output_with_range() {
        let root = TempDir::new().unwrap();
        let (sessions, session) = session_with_outputs(&root).await;

        let response = sessions
            .retrieve_output(&session.id, "trimmed_1.mp4", Some("bytes=0-99"))
            .await
            .unwrap();
        assert_eq!(response.status, 206);
        assert_eq!(response.content_range.as_deref(), Some("bytes 0-99/1000"));

        let err = sessions
            .retrieve_output(&session.id, "trimmed_2.mp4", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_retrieve_archive_rejects_odd_names() {
        let root = TempDir::new().unwrap();
        let (sessions, _) = session_with_outputs(&root).await;
        for name in ["../secret.zip", "trimmed_1.mp4", "absent.zip", ""] {
            let err = sessions.retrieve_archive(name).await.unwrap_err();
            assert!(matches!(err, DomainError::NotFound(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_cleanup_removes_archive_and_is_idempotent() {
        let root = TempDir::new().unwrap();
        let (sessions, session) = session_with_outputs(&root).await;
        let archive = sessions.create_archive(&session.id).await.unwrap();

        sessions.cleanup(&session.id).await.unwrap();
        assert!(!archive.path.exists());
        assert!(!session.output_dir.exists());
        sessions.cleanup(&session.id).await.unwrap();

        let err = sessions.create_archive(&session.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
