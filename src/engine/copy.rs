//! Stream copy policy

use crate::domain::model::TrimJob;
use crate::engine::{format_seconds, output_flags};

/// Stream copy clipper for lossless operations.
///
/// Seeks before opening the input, so the cut snaps to the nearest keyframe.
pub struct StreamCopyClipper;

impl StreamCopyClipper {
    /// Create a new stream copy clipper
    pub fn new() -> Self {
        Self
    }

    /// Arguments for `ffmpeg`.
    ///
    /// With pre-input seeking the output timeline starts at the seek point,
    /// so the window is expressed as a duration (`-t`) rather than an end time.
    pub fn build_args(&self, job: &TrimJob) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format_seconds(job.window.start),
            "-i".to_string(),
            job.input.to_string_lossy().to_string(),
            "-t".to_string(),
            format_seconds(job.window.duration()),
            "-c".to_string(),
            "copy".to_string(),
        ];
        args.extend(output_flags(job));
        args.push(job.output.to_string_lossy().to_string());
        args
    }
}

impl Default for StreamCopyClipper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrimWindow;
    use std::path::PathBuf;

    #[test]
    fn test_seeks_before_input_and_uses_duration() {
        let job = TrimJob {
            input: PathBuf::from("a.mkv"),
            output: PathBuf::from("trimmed_1.mkv"),
            window: TrimWindow { start: 2.0, end: 7.5 },
        };
        let args = StreamCopyClipper::new().build_args(&job);
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "2.000");
        assert_eq!(args[t + 1], "5.500");
        assert!(!args.contains(&"-to".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }
}
