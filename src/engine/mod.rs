//! Transcoding engine policies
//!
//! Each policy turns a [`TrimJob`] into the ffmpeg argument list that trims
//! it. Both policies reset timestamps to zero and move the index to the file
//! head so the output streams progressively.

use serde::{Deserialize, Serialize};

use crate::domain::model::{TrimJob, TrimPolicy};

pub mod copy;
pub mod progress;
pub mod reencode;

pub use copy::StreamCopyClipper;
pub use reencode::ReencodeClipper;

/// Encoder settings used by the re-encode policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Constant rate factor (0-51, lower is higher quality)
    pub crf: u8,
    /// x264 preset (ultrafast ... veryslow)
    pub preset: String,
    /// AAC bitrate, ffmpeg notation
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: "fast".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// Build the ffmpeg arguments for `job` under `policy`
pub fn build_args(policy: TrimPolicy, job: &TrimJob, settings: &EncoderSettings) -> Vec<String> {
    match policy {
        TrimPolicy::Reencode => ReencodeClipper::new(settings.clone()).build_args(job),
        TrimPolicy::Copy => StreamCopyClipper::new().build_args(job),
    }
}

/// Seconds with millisecond precision, as ffmpeg time options take them
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds.max(0.0))
}

/// Flags shared by both policies, placed just before the output path.
///
/// `+faststart` only exists for the ISO family; Matroska and WebM already
/// put their index where a progressive reader expects it.
pub(crate) fn output_flags(job: &TrimJob) -> Vec<String> {
    let mut flags = vec!["-avoid_negative_ts".to_string(), "make_zero".to_string()];
    let iso_family = job
        .output
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map_or(true, |ext| matches!(ext.as_str(), "mp4" | "mov" | "m4v"));
    if iso_family {
        flags.push("-movflags".to_string());
        flags.push("+faststart".to_string());
    }
    flags.extend(["-progress", "pipe:1", "-nostats"].iter().map(|s| s.to_string()));
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrimWindow;
    use std::path::PathBuf;

    fn job() -> TrimJob {
        TrimJob {
            input: PathBuf::from("in.mp4"),
            output: PathBuf::from("out.mp4"),
            window: TrimWindow { start: 1.0, end: 9.0 },
        }
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(1.0), "1.000");
        assert_eq!(format_seconds(8.12345), "8.123");
        assert_eq!(format_seconds(-0.5), "0.000");
    }

    #[test]
    fn test_build_args_dispatches_on_policy() {
        let settings = EncoderSettings::default();
        let reencode = build_args(TrimPolicy::Reencode, &job(), &settings);
        let copy = build_args(TrimPolicy::Copy, &job(), &settings);
        assert!(reencode.contains(&"libx264".to_string()));
        assert!(copy.contains(&"copy".to_string()));
        for args in [&reencode, &copy] {
            assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
            assert!(args.windows(2).any(|w| w[0] == "-avoid_negative_ts" && w[1] == "make_zero"));
            assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "+faststart"));
        }
    }

    #[test]
    fn test_faststart_only_for_iso_outputs() {
        let mut mkv = job();
        mkv.output = PathBuf::from("out.mkv");
        let args = output_flags(&mkv);
        assert!(!args.contains(&"-movflags".to_string()));
        assert!(args.contains(&"make_zero".to_string()));
    }
}
