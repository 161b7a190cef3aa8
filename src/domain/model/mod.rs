// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::rules::{BaseNameSanitizer, CutParser};

/// Opaque, unguessable session identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Draw a fresh identifier from the random v4 namespace
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller.
    ///
    /// Anything that is not a UUID cannot name a session, so it is reported
    /// as not found rather than as a malformed request.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| DomainError::NotFound(format!("Session not found: {}", raw)))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A server-side scope grouping one batch's uploads and outputs
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Body of a file offered for upload
#[derive(Debug, Clone)]
pub enum UploadBody {
    /// Existing local file, copied into the session
    Path(PathBuf),
    /// Bytes already received in memory
    Bytes(Vec<u8>),
}

/// A file offered for upload, before validation
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub original_name: String,
    pub content_type: Option<String>,
    pub body: UploadBody,
}

impl UploadSource {
    /// Upload an existing local file under its own file name
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            original_name,
            content_type: None,
            body: UploadBody::Path(path),
        }
    }

    /// Upload in-memory bytes under a caller-supplied name
    pub fn from_bytes(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            body: UploadBody::Bytes(bytes),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// An accepted upload stored inside a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// User-supplied name, untrusted
    pub original_name: String,
    /// Server-assigned, collision-resistant location
    pub storage_path: PathBuf,
    pub session_id: SessionId,
}

/// Result of an accepted upload request
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub session_id: SessionId,
    pub files: Vec<UploadedFile>,
}

/// A batch processing request
#[derive(Debug, Clone)]
pub struct TrimRequest {
    pub session_id: SessionId,
    /// Order defines output numbering
    pub files: Vec<UploadedFile>,
    pub start_cut: f64,
    pub end_cut: f64,
    pub base_name: String,
}

impl TrimRequest {
    /// Build a request from already-numeric cuts; negative or non-finite cuts become 0
    pub fn new(
        session_id: SessionId,
        files: Vec<UploadedFile>,
        start_cut: f64,
        end_cut: f64,
        base_name: Option<&str>,
    ) -> Self {
        Self {
            session_id,
            files,
            start_cut: CutParser::normalize(start_cut),
            end_cut: CutParser::normalize(end_cut),
            base_name: BaseNameSanitizer::sanitize(base_name),
        }
    }

    /// Build a request from raw request fields; absent or non-numeric cuts become 0
    pub fn from_raw(
        session_id: SessionId,
        files: Vec<UploadedFile>,
        start_cut: Option<&str>,
        end_cut: Option<&str>,
        base_name: Option<&str>,
    ) -> Self {
        Self {
            session_id,
            files,
            start_cut: CutParser::parse(start_cut),
            end_cut: CutParser::parse(end_cut),
            base_name: BaseNameSanitizer::sanitize(base_name),
        }
    }
}

/// Absolute `[start, end)` interval, in seconds, retained from a source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    /// Output duration implied by the window
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TrimWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}

/// One unit of work handed to the transcoding engine
#[derive(Debug, Clone)]
pub struct TrimJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub window: TrimWindow,
}

/// What the engine reports after a successful transform
#[derive(Debug, Clone)]
pub struct OutputReport {
    pub output_path: PathBuf,
    pub file_size: u64,
    pub processing_time: Duration,
}

/// Quality policy of the trim executor, fixed by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    /// Decode and re-encode with post-input seeking; frame accurate
    #[default]
    #[serde(alias = "re-encode")]
    Reencode,
    /// Copy encoded streams with pre-input seeking; keyframe accurate
    #[serde(alias = "stream-copy", alias = "streamcopy")]
    Copy,
}

impl TrimPolicy {
    /// Parse policy from string
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_lowercase().as_str() {
            "reencode" | "re-encode" => Ok(TrimPolicy::Reencode),
            "copy" | "stream-copy" | "streamcopy" => Ok(TrimPolicy::Copy),
            other => Err(DomainError::Config(format!(
                "Invalid trim policy: {}. Valid policies: reencode, copy",
                other
            ))),
        }
    }
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimPolicy::Reencode => write!(f, "reencode"),
            TrimPolicy::Copy => write!(f, "copy"),
        }
    }
}

/// A successfully trimmed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedFile {
    pub original_name: String,
    pub output_name: String,
    pub output_path: PathBuf,
    pub session_id: SessionId,
    pub retrieval_path: String,
}

/// A file the batch left out, kept for diagnostics only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    /// 1-based position in the request
    pub position: usize,
    pub original_name: String,
    pub kind: String,
    pub reason: String,
}

/// Terminal result of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub session_id: SessionId,
    pub processed: Vec<ProcessedFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Phases a batch moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Pending,
    Probing,
    Planning,
    Executing,
    Completed,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchPhase::Pending => "pending",
            BatchPhase::Probing => "probing",
            BatchPhase::Planning => "planning",
            BatchPhase::Executing => "executing",
            BatchPhase::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// A generated session archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveInfo {
    pub session_id: SessionId,
    pub file_name: String,
    pub path: PathBuf,
    pub entries: usize,
    pub retrieval_path: String,
}
