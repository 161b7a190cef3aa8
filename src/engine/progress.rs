//! Progress tracking for long-running engine invocations

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Minimum spacing between progress updates forwarded to callbacks
const UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Receives progress of a single transform
pub trait ProgressCallback: Send + Sync {
    /// Called when the engine is launched
    fn on_start(&self, operation: &str);

    /// Called with the completed fraction, in `[0, 1]`
    fn on_progress(&self, fraction: f64);

    /// Called when the engine reports success
    fn on_complete(&self);

    /// Called when the engine fails
    fn on_error(&self, error: &str);
}

/// Progress phases
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum ProgressPhase {
    Initializing,
    Processing,
    Complete,
    Failed,
}

/// Snapshot of a tracked operation
#[derive(Debug, Clone, Serialize)]
pub struct ProgressInfo {
    pub phase: ProgressPhase,
    /// Completed fraction (0.0 - 1.0)
    pub fraction: f64,
    pub operation: String,
    pub elapsed: Duration,
    pub eta: Option<Duration>,
}

/// Progress tracker with thread-safe, throttled fan-out to callbacks
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressTrackerInner>>,
    callbacks: Arc<Mutex<Vec<Arc<dyn ProgressCallback>>>>,
}

struct ProgressTrackerInner {
    info: ProgressInfo,
    start_time: Instant,
    last_update: Option<Instant>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(operation: &str) -> Self {
        let inner = ProgressTrackerInner {
            info: ProgressInfo {
                phase: ProgressPhase::Initializing,
                fraction: 0.0,
                operation: operation.to_string(),
                elapsed: Duration::ZERO,
                eta: None,
            },
            start_time: Instant::now(),
            last_update: None,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a progress callback
    pub fn add_callback(&self, callback: Arc<dyn ProgressCallback>) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(callback);
        }
    }

    /// Get current progress information
    pub fn info(&self) -> Option<ProgressInfo> {
        self.inner.lock().ok().map(|inner| inner.info.clone())
    }

    fn notify_callbacks<F>(&self, f: F)
    where
        F: Fn(&dyn ProgressCallback),
    {
        if let Ok(callbacks) = self.callbacks.lock() {
            for callback in callbacks.iter() {
                f(callback.as_ref());
            }
        }
    }
}

impl ProgressCallback for ProgressTracker {
    fn on_start(&self, operation: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Processing;
            inner.info.operation = operation.to_string();
            inner.info.fraction = 0.0;
            inner.start_time = Instant::now();
            inner.last_update = None;
        }

        self.notify_callbacks(|cb| cb.on_start(operation));
    }

    fn on_progress(&self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            return;
        };

        let forward = match self.inner.lock() {
            Ok(mut inner) => {
                let now = Instant::now();
                // Fractions never move backwards
                if fraction > inner.info.fraction {
                    inner.info.fraction = fraction;
                }
                inner.info.elapsed = now.duration_since(inner.start_time);

                let fraction = inner.info.fraction;
                if fraction > 0.0 && fraction < 1.0 {
                    let total = inner.info.elapsed.as_secs_f64() / fraction;
                    inner.info.eta = Some(Duration::from_secs_f64(
                        (total - inner.info.elapsed.as_secs_f64()).max(0.0),
                    ));
                }

                let due = inner
                    .last_update
                    .map_or(true, |last| now.duration_since(last) >= UPDATE_INTERVAL);
                if due {
                    inner.last_update = Some(now);
                }
                due.then_some(fraction)
            }
            Err(_) => None,
        };

        if let Some(fraction) = forward {
            self.notify_callbacks(|cb| cb.on_progress(fraction));
        }
    }

    fn on_complete(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Complete;
            inner.info.fraction = 1.0;
            inner.info.eta = None;
            inner.info.elapsed = inner.start_time.elapsed();
        }

        self.notify_callbacks(|cb| cb.on_complete());
    }

    fn on_error(&self, error: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Failed;
            inner.info.eta = None;
        }

        self.notify_callbacks(|cb| cb.on_error(error));
    }
}

/// Logs progress through `tracing`
pub struct LoggingProgress {
    label: String,
}

impl LoggingProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressCallback for LoggingProgress {
    fn on_start(&self, operation: &str) {
        tracing::debug!(file = %self.label, operation, "engine started");
    }

    fn on_progress(&self, fraction: f64) {
        tracing::debug!(file = %self.label, percent = fraction * 100.0, "engine progress");
    }

    fn on_complete(&self) {
        tracing::debug!(file = %self.label, "engine finished");
    }

    fn on_error(&self, error: &str) {
        tracing::debug!(file = %self.label, error, "engine failed");
    }
}

/// No-op progress callback for when progress tracking is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _operation: &str) {}
    fn on_progress(&self, _fraction: f64) {}
    fn on_complete(&self) {}
    fn on_error(&self, _error: &str) {}
}

/// Incremental parser for ffmpeg's `-progress` key/value output.
///
/// ```text
/// frame=100
/// out_time_us=3333333
/// progress=continue
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegProgressParser {
    total_seconds: f64,
    out_time_seconds: f64,
}

impl FfmpegProgressParser {
    /// `total_seconds` is the expected output duration
    pub fn new(total_seconds: f64) -> Self {
        Self {
            total_seconds,
            out_time_seconds: 0.0,
        }
    }

    /// Feed one line; returns a fraction at each block boundary (`progress=` line)
    pub fn feed_line(&mut self, line: &str) -> Option<f64> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();

        match key.trim() {
            // out_time_ms is in microseconds despite the name
            "out_time_us" | "out_time_ms" => {
                if let Ok(micros) = value.parse::<i64>() {
                    self.out_time_seconds = micros.max(0) as f64 / 1_000_000.0;
                }
                None
            }
            "progress" if value == "end" => Some(1.0),
            "progress" => Some(self.fraction()),
            _ => None,
        }
    }

    /// Completed fraction so far, clamped to `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total_seconds <= 0.0 {
            return 0.0;
        }
        (self.out_time_seconds / self.total_seconds).clamp(0.0, 1.0)
    }
}
