//! Re-encoding policy for frame-accurate trimming

use crate::domain::model::TrimJob;
use crate::engine::{format_seconds, output_flags, EncoderSettings};

/// Decodes and re-encodes both streams, seeking after the input is opened
pub struct ReencodeClipper {
    settings: EncoderSettings,
}

impl ReencodeClipper {
    /// Create a new re-encoding clipper
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    /// Arguments for `ffmpeg`.
    ///
    /// `-ss`/`-to` follow `-i` (post-input seeking) so the cut lands on the
    /// exact frame; `-to` is the absolute end of the window.
    pub fn build_args(&self, job: &TrimJob) -> Vec<String> {
        let (video_codec, audio_codec) = Self::codecs_for(job);
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            job.input.to_string_lossy().to_string(),
            "-ss".to_string(),
            format_seconds(job.window.start),
            "-to".to_string(),
            format_seconds(job.window.end),
            "-c:v".to_string(),
            video_codec.to_string(),
        ];
        if video_codec == "libx264" {
            args.push("-preset".to_string());
            args.push(self.settings.preset.clone());
        } else {
            // libvpx needs a zero bitrate for constant-quality mode
            args.push("-b:v".to_string());
            args.push("0".to_string());
        }
        args.extend([
            "-crf".to_string(),
            self.settings.crf.min(51).to_string(),
            // Broadest player compatibility
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            audio_codec.to_string(),
            "-b:a".to_string(),
            self.settings.audio_bitrate.clone(),
        ]);
        args.extend(output_flags(job));
        args.push(job.output.to_string_lossy().to_string());
        args
    }

    /// WebM only carries VP8/VP9/AV1 with Vorbis/Opus; everything else gets H.264/AAC
    fn codecs_for(job: &TrimJob) -> (&'static str, &'static str) {
        let is_webm = job
            .output
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("webm"))
            .unwrap_or(false);
        if is_webm {
            ("libvpx-vp9", "libopus")
        } else {
            ("libx264", "aac")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrimWindow;
    use std::path::PathBuf;

    fn job() -> TrimJob {
        TrimJob {
            input: PathBuf::from("/in/a.mov"),
            output: PathBuf::from("/out/trimmed_1.mov"),
            window: TrimWindow { start: 1.5, end: 9.25 },
        }
    }

    fn position(args: &[String], flag: &str) -> usize {
        args.iter().position(|a| a == flag).unwrap()
    }

    #[test]
    fn test_seeks_after_input() {
        let args = ReencodeClipper::new(EncoderSettings::default()).build_args(&job());
        assert!(position(&args, "-i") < position(&args, "-ss"));
        assert_eq!(args[position(&args, "-ss") + 1], "1.500");
        assert_eq!(args[position(&args, "-to") + 1], "9.250");
    }

    #[test]
    fn test_quality_settings_applied() {
        let args = ReencodeClipper::new(EncoderSettings {
            crf: 28,
            preset: "slow".to_string(),
            ..EncoderSettings::default()
        })
        .build_args(&job());
        assert_eq!(args[position(&args, "-crf") + 1], "28");
        assert_eq!(args[position(&args, "-preset") + 1], "slow");
        assert_eq!(args[position(&args, "-pix_fmt") + 1], "yuv420p");
        assert_eq!(args[position(&args, "-c:a") + 1], "aac");
        assert_eq!(args.last().unwrap(), "/out/trimmed_1.mov");
    }

    #[test]
    fn test_webm_output_uses_vp9() {
        let mut webm = job();
        webm.output = PathBuf::from("/out/trimmed_1.webm");
        let args = ReencodeClipper::new(EncoderSettings::default()).build_args(&webm);
        assert_eq!(args[position(&args, "-c:v") + 1], "libvpx-vp9");
        assert_eq!(args[position(&args, "-c:a") + 1], "libopus");
        assert_eq!(args[position(&args, "-b:v") + 1], "0");
        assert!(!args.contains(&"-preset".to_string()));
    }
}
