//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` as an external process and reads the container duration
//! from its JSON output.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::adapters::exec_ffmpeg::diagnostic_tail;
use crate::domain::errors::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe_path: String,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout: None,
        }
    }

    /// Bound each probe invocation
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract the duration from `ffprobe -of json` output
    pub fn parse_duration(stdout: &[u8]) -> Result<f64, DomainError> {
        let output: FfprobeOutput = serde_json::from_slice(stdout)
            .map_err(|e| DomainError::Probe(format!("Unreadable ffprobe output: {}", e)))?;

        let raw = output
            .format
            .and_then(|format| format.duration)
            .ok_or_else(|| DomainError::Probe("Container reports no duration".to_string()))?;

        let duration: f64 = raw
            .trim()
            .parse()
            .map_err(|_| DomainError::Probe(format!("Invalid duration: {}", raw)))?;

        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::Probe(format!("Invalid duration: {}", raw)));
        }
        Ok(duration)
    }

    async fn run(&self, file_path: &Path) -> Result<f64, DomainError> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "json"])
            .arg(file_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::Probe(format!("Failed to run {}: {}", self.ffprobe_path, e))
            })?;

        if !output.status.success() {
            return Err(DomainError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                diagnostic_tail(&String::from_utf8_lossy(&output.stderr))
            )));
        }

        Self::parse_duration(&output.stdout)
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        let duration = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(file_path))
                .await
                .map_err(|_| {
                    DomainError::Probe(format!("ffprobe timed out after {}s", limit.as_secs()))
                })??,
            None => self.run(file_path).await?,
        };

        debug!(file = %file_path.display(), duration, "Probed media duration");
        Ok(duration)
    }
}
