// TOML config adapter - Layered configuration: CLI > Env > File > Defaults

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::TrimPolicy;
use crate::domain::rules::UploadLimits;
use crate::engine::EncoderSettings;

/// Files searched when no explicit config path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["config/trimx-batch.toml", "trimx_batch.toml"];

/// Table holding this crate's keys inside a config file
const CONFIG_SECTION: &str = "trimx_batch";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scratch storage holding uploads, outputs and archives
    pub storage_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Fixed for the deployment, never chosen per request
    pub policy: TrimPolicy,
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
    /// Deadline applied separately to a file's probe and to its transform,
    /// so one file may take up to twice this long; 0 disables it
    pub file_timeout_secs: u64,
    pub max_files: usize,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: std::env::temp_dir().join("trimx-batch"),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            policy: TrimPolicy::Reencode,
            crf: 23,
            preset: "fast".to_string(),
            audio_bitrate: "128k".to_string(),
            file_timeout_secs: 600,
            max_files: 20,
            max_file_size: 500 * 1024 * 1024,
            allowed_extensions: ["mp4", "mov", "avi", "mkv", "webm"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub storage_root: Option<PathBuf>,
    pub policy: Option<TrimPolicy>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
}

impl AppConfig {
    /// Resolve the full hierarchy.
    ///
    /// `explicit_path` must exist when given; otherwise the default locations
    /// are tried and a missing file simply leaves the defaults in place.
    pub fn load(explicit_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, DomainError> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match DEFAULT_CONFIG_PATHS
                .iter()
                .map(Path::new)
                .find(|path| path.exists())
            {
                Some(path) => Self::from_file(path)?,
                None => {
                    debug!("No configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        let env: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with("TRIMX_"))
            .collect();
        config.apply_env(&env)?;
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        if !path.exists() {
            return Err(DomainError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("Failed to read config file: {}", e)))?;
        info!("Loading configuration from: {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; keys live under `[trimx_batch]`
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        let mut parsed: toml::Table = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;

        match parsed.remove(CONFIG_SECTION) {
            Some(section) => section
                .try_into()
                .map_err(|e| DomainError::Config(format!("Invalid [{}] section: {}", CONFIG_SECTION, e))),
            None => Ok(Self::default()),
        }
    }

    /// Apply `TRIMX_*` environment variables
    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<(), DomainError> {
        let mut env_overrides = 0;

        for (key, value) in env {
            let value = value.trim();
            match key.as_str() {
                "TRIMX_STORAGE_ROOT" => self.storage_root = PathBuf::from(value),
                "TRIMX_FFMPEG_PATH" => self.ffmpeg_path = value.to_string(),
                "TRIMX_FFPROBE_PATH" => self.ffprobe_path = value.to_string(),
                "TRIMX_POLICY" => self.policy = TrimPolicy::parse(value)?,
                "TRIMX_CRF" => self.crf = parse_env(key, value)?,
                "TRIMX_PRESET" => self.preset = value.to_string(),
                "TRIMX_AUDIO_BITRATE" => self.audio_bitrate = value.to_string(),
                "TRIMX_FILE_TIMEOUT_SECS" => self.file_timeout_secs = parse_env(key, value)?,
                "TRIMX_LOG_LEVEL" => self.log_level = value.to_string(),
                "TRIMX_LOG_JSON" => self.log_json = parse_env(key, value)?,
                _ => continue,
            }
            debug!("Found environment override: {} = {}", key, value);
            env_overrides += 1;
        }

        if env_overrides > 0 {
            info!("Applied {} environment variable overrides", env_overrides);
        }
        Ok(())
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(root) = &overrides.storage_root {
            self.storage_root = root.clone();
        }
        if let Some(policy) = overrides.policy {
            self.policy = policy;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        if let Some(json) = overrides.log_json {
            self.log_json = json;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.crf > 51 {
            return Err(DomainError::Config("CRF value cannot exceed 51".to_string()));
        }
        if self.max_files == 0 {
            return Err(DomainError::Config("max_files must be at least 1".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(DomainError::Config("max_file_size must be positive".to_string()));
        }
        if self.allowed_extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(DomainError::Config(
                "allowed_extensions cannot be empty".to_string(),
            ));
        }
        if self.ffmpeg_path.trim().is_empty() || self.ffprobe_path.trim().is_empty() {
            return Err(DomainError::Config(
                "ffmpeg_path and ffprobe_path must be set".to_string(),
            ));
        }
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(DomainError::Config(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                other
            ))),
        }
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.max_files,
            max_file_size: self.max_file_size,
            allowed_extensions: self.allowed_extensions.clone(),
        }
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            crf: self.crf,
            preset: self.preset.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
        }
    }

    pub fn file_timeout(&self) -> Option<Duration> {
        (self.file_timeout_secs > 0).then(|| Duration::from_secs(self.file_timeout_secs))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DomainError::Config(format!("Invalid value for {}: {}", key, e)))
}
