// Domain rules - Business logic and policies

use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Name used when the caller gives no usable output base name
pub const DEFAULT_BASE_NAME: &str = "trimmed";

/// Extension used for outputs whose original name carries none
pub const DEFAULT_OUTPUT_EXTENSION: &str = ".mp4";

/// Computes the retained window for a source of known duration
pub struct TrimPlanner;

impl TrimPlanner {
    /// Plan the window `[start_cut, duration - end_cut)`.
    ///
    /// Fails with [`DomainError::InfeasibleTrim`] when the absolute end time
    /// does not lie strictly after the start cut, zero-length sources included.
    /// Only a non-finite duration is a [`DomainError::Probe`].
    pub fn plan(duration: f64, start_cut: f64, end_cut: f64) -> Result<TrimWindow, DomainError> {
        if !duration.is_finite() {
            return Err(DomainError::Probe(format!(
                "Unusable media duration: {}",
                duration
            )));
        }

        let start = CutParser::normalize(start_cut);
        let end = duration - CutParser::normalize(end_cut);

        if end <= start {
            return Err(DomainError::InfeasibleTrim {
                duration,
                start,
                end,
            });
        }

        Ok(TrimWindow { start, end })
    }
}

/// Interprets user-supplied cut amounts
pub struct CutParser;

impl CutParser {
    /// Absent, non-numeric, non-finite or negative input yields 0
    pub fn parse(raw: Option<&str>) -> f64 {
        raw.and_then(|value| value.trim().parse::<f64>().ok())
            .map(Self::normalize)
            .unwrap_or(0.0)
    }

    pub fn normalize(seconds: f64) -> f64 {
        if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            0.0
        }
    }
}

/// Cleans the caller's output base name
pub struct BaseNameSanitizer;

impl BaseNameSanitizer {
    /// Blank or absent names become [`DEFAULT_BASE_NAME`]; characters that could
    /// escape the output directory or break a filename are replaced with `_`.
    pub fn sanitize(raw: Option<&str>) -> String {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return DEFAULT_BASE_NAME.to_string();
        }

        let cleaned: String = trimmed
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        // A name made only of dots would resolve to `.` or `..`
        if cleaned.chars().all(|c| c == '.') {
            return DEFAULT_BASE_NAME.to_string();
        }

        cleaned
    }
}

/// Derives deterministic output file names
pub struct OutputNamer;

impl OutputNamer {
    /// `{base}_{index + 1}{ext}` where `ext` comes from the original name.
    ///
    /// The number is the file's position in the request, not the count of
    /// successes, so a skipped file leaves a gap in the numbering.
    pub fn output_name(base_name: &str, index: usize, original_name: &str) -> String {
        format!(
            "{}_{}{}",
            base_name,
            index + 1,
            Self::extension_of(original_name)
        )
    }

    /// Lower-cased extension with leading dot, or [`DEFAULT_OUTPUT_EXTENSION`]
    pub fn extension_of(original_name: &str) -> String {
        Path::new(original_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string())
    }

    /// Retrieval path of an output file
    pub fn retrieval_path(session_id: &SessionId, output_name: &str) -> String {
        format!("/download/{}/{}", session_id, output_name)
    }

    /// Archive file name for a session
    pub fn archive_name(session_id: &SessionId) -> String {
        format!("trimmed_videos_{}.zip", session_id)
    }

    /// Retrieval path of an archive
    pub fn archive_retrieval_path(file_name: &str) -> String {
        format!("/download-zip/{}", file_name)
    }
}

/// Limits an upload request must respect
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

/// Business rules for accepting uploads
pub struct UploadValidator;

impl UploadValidator {
    /// Validate the request-level shape: at least one file, at most `max_files`
    pub fn validate_count(count: usize, limits: &UploadLimits) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::Validation("No files uploaded".to_string()));
        }
        if count > limits.max_files {
            return Err(DomainError::Validation(format!(
                "Too many files: {} (maximum {})",
                count, limits.max_files
            )));
        }
        Ok(())
    }

    /// Validate one file's name, declared content type and size
    pub fn validate_file(
        original_name: &str,
        content_type: Option<&str>,
        size: u64,
        limits: &UploadLimits,
    ) -> Result<(), DomainError> {
        if original_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Uploaded file has no name".to_string(),
            ));
        }

        let extension = Path::new(original_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let extension_allowed = limits
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&extension));
        if !extension_allowed {
            return Err(DomainError::Validation(format!(
                "Invalid file type: {} (allowed: {})",
                original_name,
                limits.allowed_extensions.join(", ")
            )));
        }

        if let Some(content_type) = content_type {
            let essence = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_lowercase();
            if !essence.starts_with("video/") {
                return Err(DomainError::Validation(format!(
                    "Invalid content type for {}: {}",
                    original_name, content_type
                )));
            }
        }

        if size > limits.max_file_size {
            return Err(DomainError::Validation(format!(
                "File too large: {} ({} bytes, maximum {})",
                original_name, size, limits.max_file_size
            )));
        }

        Ok(())
    }

    /// Reduce an untrusted name to a safe single path component for storage
    pub fn storage_component(original_name: &str) -> String {
        let base = Path::new(original_name.trim())
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.trim_matches('.').is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }
}

/// Checks names a caller uses to address stored files
pub struct FileNameRules;

impl FileNameRules {
    /// True when `name` is exactly one normal path component
    pub fn is_single_component(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.contains('\\')
            && !name.contains('\0')
    }
}

#[cfg(test)]
mod tests;
