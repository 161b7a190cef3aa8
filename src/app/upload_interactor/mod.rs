// Upload interactor - Validates a batch of files and stores it in a new session

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the upload use case
pub struct UploadInteractor {
    session_port: Arc<dyn SessionPort>,
    limits: UploadLimits,
}

impl UploadInteractor {
    /// Create new upload interactor with injected ports
    pub fn new(session_port: Arc<dyn SessionPort>, limits: UploadLimits) -> Self {
        Self {
            session_port,
            limits,
        }
    }

    /// Accept `sources` into a fresh session.
    ///
    /// Every file is validated before the session is allocated, so a
    /// rejected request leaves nothing behind.
    pub async fn upload(&self, sources: Vec<UploadSource>) -> Result<UploadReceipt, DomainError> {
        UploadValidator::validate_count(sources.len(), &self.limits)?;
        for source in &sources {
            let size = Self::source_size(source).await?;
            UploadValidator::validate_file(
                &source.original_name,
                source.content_type.as_deref(),
                size,
                &self.limits,
            )?;
        }

        let session = self.session_port.create_session().await?;

        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            match self
                .session_port
                .store_upload(&session.id, &source.original_name, source.body)
                .await
            {
                Ok(file) => files.push(file),
                Err(err) => {
                    if let Err(cleanup) = self.session_port.delete_session(&session.id).await {
                        warn!(session_id = %session.id, error = %cleanup, "Failed to discard partial upload");
                    }
                    return Err(err);
                }
            }
        }

        info!(session_id = %session.id, files = files.len(), "Upload accepted");
        Ok(UploadReceipt {
            session_id: session.id,
            files,
        })
    }

    async fn source_size(source: &UploadSource) -> Result<u64, DomainError> {
        match &source.body {
            UploadBody::Bytes(bytes) => Ok(bytes.len() as u64),
            UploadBody::Path(path) => match tokio::fs::metadata(path).await {
                Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
                _ => Err(DomainError::Validation(format!(
                    "Upload source is not a readable file: {}",
                    path.display()
                ))),
            },
        }
    }
}
