// Unit tests for business rules

use crate::domain::errors::*;
use crate::domain::rules::*;

fn limits() -> UploadLimits {
    UploadLimits {
        max_files: 20,
        max_file_size: 500 * 1024 * 1024,
        allowed_extensions: vec![
            "mp4".to_string(),
            "mov".to_string(),
            "avi".to_string(),
            "mkv".to_string(),
            "webm".to_string(),
        ],
    }
}

#[test]
fn test_planner_returns_absolute_window() {
    let window = TrimPlanner::plan(10.0, 1.0, 1.0).unwrap();
    assert_eq!(window.start, 1.0);
    assert_eq!(window.end, 9.0);
    assert_eq!(window.duration(), 8.0);
}

#[test]
fn test_planner_without_cuts_keeps_everything() {
    let window = TrimPlanner::plan(12.5, 0.0, 0.0).unwrap();
    assert_eq!(window.start, 0.0);
    assert_eq!(window.end, 12.5);
}

#[test]
fn test_planner_rejects_short_video() {
    let err = TrimPlanner::plan(0.5, 1.0, 0.0).unwrap_err();
    assert!(matches!(err, DomainError::InfeasibleTrim { .. }));
}

#[test]
fn test_planner_rejects_empty_window_at_boundary() {
    // D - E == S leaves nothing
    let err = TrimPlanner::plan(10.0, 4.0, 6.0).unwrap_err();
    assert!(matches!(err, DomainError::InfeasibleTrim { .. }));
}

#[test]
fn test_planner_property_over_grid() {
    let durations = [0.0, 0.1, 0.5, 1.0, 3.3, 10.0, 60.0];
    let cuts = [0.0, 0.25, 1.0, 2.5, 5.0, 30.0];
    for &d in &durations {
        for &s in &cuts {
            for &e in &cuts {
                match TrimPlanner::plan(d, s, e) {
                    Ok(window) => {
                        assert!(d - e > s, "d={} s={} e={}", d, s, e);
                        assert_eq!(window.start, s);
                        assert_eq!(window.end, d - e);
                    }
                    Err(err) => {
                        assert!(d - e <= s, "d={} s={} e={}", d, s, e);
                        assert!(matches!(err, DomainError::InfeasibleTrim { .. }));
                    }
                }
            }
        }
    }
}

#[test]
fn test_planner_rejects_non_finite_duration() {
    for duration in [f64::NAN, f64::INFINITY] {
        assert!(matches!(
            TrimPlanner::plan(duration, 0.0, 0.0),
            Err(DomainError::Probe(_))
        ));
    }
}

#[test]
fn test_planner_zero_length_source_is_infeasible() {
    assert!(matches!(
        TrimPlanner::plan(0.0, 0.0, 0.0),
        Err(DomainError::InfeasibleTrim { .. })
    ));
    assert!(matches!(
        TrimPlanner::plan(-1.0, 0.0, 0.0),
        Err(DomainError::InfeasibleTrim { .. })
    ));
}

#[test]
fn test_cut_parser_defaults() {
    assert_eq!(CutParser::parse(None), 0.0);
    assert_eq!(CutParser::parse(Some("")), 0.0);
    assert_eq!(CutParser::parse(Some("abc")), 0.0);
    assert_eq!(CutParser::parse(Some("-3")), 0.0);
    assert_eq!(CutParser::parse(Some("NaN")), 0.0);
    assert_eq!(CutParser::parse(Some("inf")), 0.0);
    assert_eq!(CutParser::parse(Some(" 1.5 ")), 1.5);
}

#[test]
fn test_base_name_defaults_when_blank() {
    assert_eq!(BaseNameSanitizer::sanitize(None), "trimmed");
    assert_eq!(BaseNameSanitizer::sanitize(Some("")), "trimmed");
    assert_eq!(BaseNameSanitizer::sanitize(Some("   \t ")), "trimmed");
    assert_eq!(BaseNameSanitizer::sanitize(Some("..")), "trimmed");
}

#[test]
fn test_base_name_keeps_user_text() {
    assert_eq!(BaseNameSanitizer::sanitize(Some(" holiday ")), "holiday");
    assert_eq!(BaseNameSanitizer::sanitize(Some("a/b\\c")), "a_b_c");
}

#[test]
fn test_output_names_follow_position() {
    assert_eq!(OutputNamer::output_name("trimmed", 0, "a.MP4"), "trimmed_1.mp4");
    assert_eq!(OutputNamer::output_name("trimmed", 2, "c.mov"), "trimmed_3.mov");
    assert_eq!(OutputNamer::output_name("clip", 1, "noext"), "clip_2.mp4");
}

#[test]
fn test_archive_naming() {
    let id = crate::domain::model::SessionId::generate();
    let name = OutputNamer::archive_name(&id);
    assert_eq!(name, format!("trimmed_videos_{}.zip", id));
    assert_eq!(
        OutputNamer::archive_retrieval_path(&name),
        format!("/download-zip/{}", name)
    );
}

#[test]
fn test_upload_count_limits() {
    let limits = limits();
    assert!(UploadValidator::validate_count(0, &limits).is_err());
    assert!(UploadValidator::validate_count(1, &limits).is_ok());
    assert!(UploadValidator::validate_count(20, &limits).is_ok());
    assert!(UploadValidator::validate_count(21, &limits).is_err());
}

#[test]
fn test_upload_file_rules() {
    let limits = limits();
    assert!(UploadValidator::validate_file("clip.MKV", None, 10, &limits).is_ok());
    assert!(UploadValidator::validate_file("clip.webm", Some("video/webm"), 10, &limits).is_ok());
    assert!(UploadValidator::validate_file("notes.txt", None, 10, &limits).is_err());
    assert!(UploadValidator::validate_file("clip", None, 10, &limits).is_err());
    assert!(UploadValidator::validate_file("clip.mp4", Some("text/plain"), 10, &limits).is_err());
    assert!(
        UploadValidator::validate_file("clip.mp4", None, limits.max_file_size + 1, &limits)
            .is_err()
    );
}

#[test]
fn test_storage_component_strips_paths() {
    assert_eq!(UploadValidator::storage_component("../../etc/passwd.mp4"), "passwd.mp4");
    assert_eq!(UploadValidator::storage_component("my clip (1).mov"), "my_clip__1_.mov");
    assert_eq!(UploadValidator::storage_component(".."), "upload");
}

#[test]
fn test_single_component_names() {
    assert!(FileNameRules::is_single_component("trimmed_1.mp4"));
    assert!(!FileNameRules::is_single_component(""));
    assert!(!FileNameRules::is_single_component(".."));
    assert!(!FileNameRules::is_single_component("../x.mp4"));
    assert!(!FileNameRules::is_single_component("a\\b.mp4"));
}
