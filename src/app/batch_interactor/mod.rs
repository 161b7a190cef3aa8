// Batch interactor - Drives probe, plan and execute across one batch

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::progress::{LoggingProgress, ProgressCallback, ProgressTracker};
use crate::ports::*;

/// Result of one file's trip through the pipeline
enum FileOutcome {
    Processed(ProcessedFile),
    Skipped { kind: &'static str, reason: String },
}

/// Interactor for the process use case.
///
/// Files are handled strictly one at a time, in request order. A file that
/// cannot be probed, planned or encoded is skipped and the batch carries on.
/// Output names follow the file's position in the request, so a skipped file
/// leaves a gap in the numbering (`trimmed_1`, `trimmed_3`).
pub struct BatchInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    session_port: Arc<dyn SessionPort>,
    progress: Vec<Arc<dyn ProgressCallback>>,
}

impl BatchInteractor {
    /// Create new batch interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        session_port: Arc<dyn SessionPort>,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            session_port,
            progress: Vec::new(),
        }
    }

    /// Also report engine progress of every file to `callback`
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress.push(callback);
        self
    }

    /// Run the batch to completion
    pub async fn process(&self, request: TrimRequest) -> Result<BatchReport, DomainError> {
        let Some(session) = self.session_port.find_session(&request.session_id).await? else {
            return Err(DomainError::NotFound(format!(
                "Session not found: {}",
                request.session_id
            )));
        };
        Self::validate_ownership(&request, &session)?;

        self.enter(BatchPhase::Pending, &session.id, None);
        info!(
            session_id = %session.id,
            files = request.files.len(),
            policy = %self.execute_port.policy(),
            start_cut = request.start_cut,
            end_cut = request.end_cut,
            base_name = %request.base_name,
            "Batch started"
        );

        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for (index, file) in request.files.iter().enumerate() {
            match self.process_file(&session, &request, index, file).await? {
                FileOutcome::Processed(result) => processed.push(result),
                FileOutcome::Skipped { kind, reason } => {
                    warn!(
                        session_id = %session.id,
                        index = index + 1,
                        file = %file.original_name,
                        kind,
                        reason = %reason,
                        "Skipping file"
                    );
                    skipped.push(SkippedFile {
                        position: index + 1,
                        original_name: file.original_name.clone(),
                        kind: kind.to_string(),
                        reason,
                    });
                }
            }
        }

        self.enter(BatchPhase::Completed, &session.id, None);
        info!(
            session_id = %session.id,
            processed = processed.len(),
            skipped = skipped.len(),
            "Batch completed"
        );

        Ok(BatchReport {
            session_id: session.id,
            processed,
            skipped,
        })
    }

    async fn process_file(
        &self,
        session: &Session,
        request: &TrimRequest,
        index: usize,
        file: &UploadedFile,
    ) -> Result<FileOutcome, DomainError> {
        // Named before any check so the number always matches the position
        let output_name = OutputNamer::output_name(&request.base_name, index, &file.original_name);

        let present = tokio::fs::metadata(&file.storage_path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !present {
            return Ok(FileOutcome::Skipped {
                kind: "missing_upload",
                reason: format!("Upload no longer exists: {}", file.storage_path.display()),
            });
        }

        self.enter(BatchPhase::Probing, &session.id, Some(index));
        let duration = match self.probe_port.probe_duration(&file.storage_path).await {
            Ok(duration) => duration,
            Err(err) => return Self::contain(err),
        };

        self.enter(BatchPhase::Planning, &session.id, Some(index));
        let window = match TrimPlanner::plan(duration, request.start_cut, request.end_cut) {
            Ok(window) => window,
            Err(err) => return Self::contain(err),
        };
        debug!(file = %file.original_name, duration, window = %window, "Planned trim window");

        self.enter(BatchPhase::Executing, &session.id, Some(index));
        let job = TrimJob {
            input: file.storage_path.clone(),
            output: session.output_dir.join(&output_name),
            window,
        };
        let report = match self
            .execute_port
            .transform(&job, self.tracker_for(&output_name))
            .await
        {
            Ok(report) => report,
            Err(err) => return Self::contain(err),
        };

        info!(
            session_id = %session.id,
            index = index + 1,
            file = %file.original_name,
            output = %output_name,
            bytes = report.file_size,
            elapsed_ms = report.processing_time.as_millis() as u64,
            "File trimmed"
        );

        Ok(FileOutcome::Processed(ProcessedFile {
            original_name: file.original_name.clone(),
            retrieval_path: OutputNamer::retrieval_path(&session.id, &output_name),
            output_name,
            output_path: report.output_path,
            session_id: session.id,
        }))
    }

    /// Per-file failures become skips; anything else aborts the batch
    fn contain(err: DomainError) -> Result<FileOutcome, DomainError> {
        if err.is_per_file() {
            Ok(FileOutcome::Skipped {
                kind: err.kind(),
                reason: err.to_string(),
            })
        } else {
            Err(err)
        }
    }

    /// Every referenced upload must live directly in this session's upload directory
    fn validate_ownership(request: &TrimRequest, session: &Session) -> Result<(), DomainError> {
        for file in &request.files {
            let owned = file.session_id == session.id
                && file.storage_path.parent() == Some(session.upload_dir.as_path());
            if !owned {
                return Err(DomainError::Validation(format!(
                    "File {} does not belong to session {}",
                    file.original_name, session.id
                )));
            }
        }
        Ok(())
    }

    fn tracker_for(&self, output_name: &str) -> Arc<dyn ProgressCallback> {
        let tracker = ProgressTracker::new(output_name);
        tracker.add_callback(Arc::new(LoggingProgress::new(output_name)));
        for callback in &self.progress {
            tracker.add_callback(Arc::clone(callback));
        }
        Arc::new(tracker)
    }

    fn enter(&self, phase: BatchPhase, session_id: &SessionId, index: Option<usize>) {
        match index {
            Some(index) => debug!(session_id = %session_id, index = index + 1, phase = %phase, "Batch phase"),
            None => debug!(session_id = %session_id, phase = %phase, "Batch phase"),
        }
    }
}
