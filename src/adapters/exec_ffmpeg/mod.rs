//! FFmpeg execution adapter
//!
//! Runs `ffmpeg` as an external process under the configured trim policy,
//! streaming `-progress` output to a [`ProgressCallback`] and enforcing an
//! optional per-file deadline.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::{FfmpegProgressParser, ProgressCallback};
use crate::engine::{build_args, EncoderSettings};
use crate::ports::*;

/// Lines of engine diagnostics kept in error messages
const DIAGNOSTIC_LINES: usize = 12;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    ffmpeg_path: String,
    policy: TrimPolicy,
    settings: EncoderSettings,
    timeout: Option<Duration>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(ffmpeg_path: impl Into<String>, policy: TrimPolicy, settings: EncoderSettings) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            policy,
            settings,
            timeout: None,
        }
    }

    /// Bound each transform; an expired deadline kills the engine
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(
        &self,
        args: Vec<String>,
        expected_seconds: f64,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<(), DomainError> {
        let mut child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::Encode(format!("Failed to spawn {}: {}", self.ffmpeg_path, e)))?;

        // Drain stderr concurrently so a full pipe cannot stall the engine
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).to_string()
            })
        });

        let stdout_task = child.stdout.take().map(|stdout| {
            let progress = Arc::clone(&progress);
            tokio::spawn(async move {
                let mut parser = FfmpegProgressParser::new(expected_seconds);
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(fraction) = parser.feed_line(&line) {
                        progress.on_progress(fraction);
                    }
                }
            })
        });

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::Encode(format!("Failed to wait for ffmpeg: {}", e)))?;

        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        let diagnostics = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(DomainError::Encode(format!(
                "ffmpeg exited with {}: {}",
                status,
                diagnostic_tail(&diagnostics)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    fn policy(&self) -> TrimPolicy {
        self.policy
    }

    async fn transform(
        &self,
        job: &TrimJob,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<OutputReport, DomainError> {
        let args = build_args(self.policy, job, &self.settings);
        debug!(policy = %self.policy, args = ?args, "Launching ffmpeg");

        let started = Instant::now();
        progress.on_start(&format!("{} {}", self.policy, job.window));

        let run = self.run(args, job.window.duration(), Arc::clone(&progress));
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => Err(DomainError::Encode(format!(
                    "ffmpeg timed out after {}s",
                    limit.as_secs()
                ))),
            },
            None => run.await,
        };

        if let Err(err) = result {
            progress.on_error(&err.to_string());
            // A failed run may leave a truncated file behind
            if let Err(e) = tokio::fs::remove_file(&job.output).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %job.output.display(), error = %e, "Failed to remove partial output");
                }
            }
            return Err(err);
        }

        let file_size = tokio::fs::metadata(&job.output)
            .await
            .map(|metadata| metadata.len())
            .map_err(|e| DomainError::Encode(format!("ffmpeg produced no output: {}", e)))?;

        progress.on_complete();
        Ok(OutputReport {
            output_path: job.output.clone(),
            file_size,
            processing_time: started.elapsed(),
        })
    }
}

/// Last lines of engine stderr, joined for an error message
pub(crate) fn diagnostic_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return "no diagnostic output".to_string();
    }
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::NoOpProgressCallback;
    use std::path::PathBuf;

    #[test]
    fn test_diagnostic_tail() {
        assert_eq!(diagnostic_tail(""), "no diagnostic output");
        let many: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = diagnostic_tail(&many);
        assert!(tail.starts_with("line 18"));
        assert!(tail.ends_with("line 29"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_encode_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let adapter = FFmpegAdapter::new(
            "/nonexistent/ffmpeg-binary",
            TrimPolicy::Copy,
            EncoderSettings::default(),
        );
        let job = TrimJob {
            input: temp.path().join("in.mp4"),
            output: temp.path().join("out.mp4"),
            window: TrimWindow { start: 0.0, end: 1.0 },
        };
        let err = adapter
            .transform(&job, Arc::new(NoOpProgressCallback))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Encode(_)));
        assert_eq!(adapter.policy(), TrimPolicy::Copy);
        assert!(!PathBuf::from(&job.output).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deadline_kills_stalled_engine() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        // Writes a partial output to the last argument, then stalls
        let script = temp.path().join("ffmpeg");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\necho partial > \"$last\"\nexec sleep 30\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let adapter = FFmpegAdapter::new(
            script.to_string_lossy(),
            TrimPolicy::Reencode,
            EncoderSettings::default(),
        )
        .with_timeout(Some(Duration::from_secs(1)));
        let job = TrimJob {
            input: temp.path().join("in.mp4"),
            output: temp.path().join("out.mp4"),
            window: TrimWindow { start: 0.0, end: 1.0 },
        };

        let started = Instant::now();
        let err = adapter
            .transform(&job, Arc::new(NoOpProgressCallback))
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(&err, DomainError::Encode(message) if message.contains("timed out")));
        assert!(err.is_per_file());
        assert!(!job.output.exists());
    }
}
