use agentprof::aggregator::ClassifierMode;
use agentprof::commands::{
    build_config, execute_analyze_to, render_policy, run_analysis, validate_args, AnalyzeArgs,
};
use agentprof::parser::InputFormat;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn capture_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_validate_args_valid() {
    let file = capture_file("a.B.c 1\n", ".folded");
    let args = AnalyzeArgs {
        input: file.path().to_path_buf(),
        ..Default::default()
    };

    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_missing_input() {
    let args = AnalyzeArgs {
        input: PathBuf::from("/definitely/not/here.json"),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_directory_input() {
    let dir = tempfile::tempdir().unwrap();
    let args = AnalyzeArgs {
        input: dir.path().to_path_buf(),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_missing_policy() {
    let file = capture_file("a.B.c 1\n", ".folded");
    let args = AnalyzeArgs {
        input: file.path().to_path_buf(),
        policy: Some(PathBuf::from("/no/such/policy.toml")),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}

#[test]
fn test_analyze_collapsed_file() {
    let file = capture_file(
        "com.app.Main.main:1;org.glowroot.agent.A.a:2 3\ncom.app.Main.main:1 1\n",
        ".folded",
    );
    let args = AnalyzeArgs {
        input: file.path().to_path_buf(),
        mode: ClassifierMode::Simple,
        ..Default::default()
    };

    let mut out = Vec::new();
    execute_analyze_to(&args, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("Total Samples: 4\nTotal Glowroot: 3 (75.00%)\n\n"));
    assert!(text.contains("  3 com.app.Main.main() line: 1\n"));
}

#[test]
fn test_analyze_detects_json_by_content() {
    let file = capture_file(
        r#"{"recording": {"events": [{"type": "jdk.ExecutionSample", "values": {}}]}}"#,
        ".jfrjson",
    );
    let args = AnalyzeArgs {
        input: file.path().to_path_buf(),
        ..Default::default()
    };

    let report = run_analysis(&args).unwrap();
    assert_eq!(report.summary.total_samples, 1);
    assert_eq!(report.summary.attributed_samples, 0);
}

#[test]
fn test_forced_format_mismatch_fails() {
    let file = capture_file("a.B.c 1\n", ".folded");
    let args = AnalyzeArgs {
        input: file.path().to_path_buf(),
        format: Some(InputFormat::JfrJson),
        ..Default::default()
    };

    assert!(run_analysis(&args).is_err());
}

#[test]
fn test_policy_file_and_overrides() {
    let policy = capture_file(
        "instrumentation_prefix = \"io.agent\"\nboundary_offset = 0\n",
        ".toml",
    );
    let args = AnalyzeArgs {
        policy: Some(policy.path().to_path_buf()),
        self_exclusion_prefix: Some("io.agent.internal".to_string()),
        include_line_number: false,
        ..Default::default()
    };

    let config = build_config(&args).unwrap();
    assert_eq!(config.policy.instrumentation_prefix, "io.agent");
    assert_eq!(config.policy.self_exclusion_prefix, "io.agent.internal");
    assert_eq!(config.policy.boundary_offset, 0);
    assert!(!config.include_line_number);
}

#[test]
fn test_override_rejected_when_invalid() {
    let args = AnalyzeArgs {
        self_exclusion_prefix: Some("org".to_string()),
        ..Default::default()
    };

    assert!(build_config(&args).is_err());
}

#[test]
fn test_render_default_policy() {
    let text = render_policy(None).unwrap();
    assert!(text.contains("instrumentation_prefix = \"org.glowroot.agent\""));
    assert!(text.contains("loadClass"));
}
