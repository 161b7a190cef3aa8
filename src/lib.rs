//! trimx-batch library
//!
//! Session-scoped batch video trimming: uploads are stored in a session,
//! trimmed one at a time through an external ffmpeg engine, and delivered
//! individually (with byte-range support) or as a single zip archive.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use adapters::{AppConfig, ConfigOverrides};
pub use app::{AppContainer, DefaultAppContainer};
pub use domain::errors::DomainError;
pub use domain::model::{
    ArchiveInfo, BatchReport, ProcessedFile, SessionId, TrimPolicy, TrimRequest, UploadSource,
};
