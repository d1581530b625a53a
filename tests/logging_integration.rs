use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const STARTUP_MESSAGE: &str = "loaded runtime configuration";

/// Runs a query against an unsupported provider so the command fails right
/// after startup logging, without any network access.
fn run_query_with_logging(output: &str, format: &str, file_path: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_codeq"));
    cmd.args(["q", "hi"])
        .env("MODEL_PROVIDER", "invalid")
        .env_remove("OPENAI_API_KEY")
        .env("RUST_LOG", "codeq=info")
        .env("LOG_OUTPUT", output)
        .env("LOG_FORMAT", format);

    match file_path {
        Some(path) => cmd.env("LOG_FILE_PATH", path),
        None => cmd.env_remove("LOG_FILE_PATH"),
    };

    let output = cmd.output().expect("failed to run codeq binary");
    assert!(
        !output.status.success(),
        "unsupported provider should fail the command"
    );
    output
}

fn scratch_dir(label: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "codeq-logging-{label}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}

/// Daily rotation appends a date suffix to the configured file name.
fn read_rotated_log(dir: &Path, file_name: &str) -> String {
    let prefix = format!("{file_name}.");
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .expect("failed to read temp directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix))
        })
        .collect();
    candidates.sort();
    let path = candidates
        .pop()
        .expect("expected a rotated log file to be created");
    fs::read_to_string(path).expect("failed to read rotated log file")
}

#[test]
fn json_format_writes_structured_startup_event() {
    let output = run_query_with_logging("stderr", "json", None);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let events: Vec<Value> = stderr
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("line should be valid JSON"))
        .collect();
    assert!(
        !events.is_empty(),
        "expected at least one JSON log line, got stderr:\n{stderr}"
    );

    let startup = events
        .iter()
        .find(|event| event["fields"]["message"].as_str() == Some(STARTUP_MESSAGE))
        .unwrap_or_else(|| panic!("expected startup event, got stderr:\n{stderr}"));
    assert_eq!(startup["fields"]["provider"].as_str(), Some("invalid"));
    assert_eq!(startup["fields"]["api_key_configured"], Value::Bool(false));
}

#[test]
fn file_output_keeps_logs_off_stderr() {
    let dir = scratch_dir("file");
    let output = run_query_with_logging("file", "pretty", Some(&dir.join("codeq.log")));

    let contents = read_rotated_log(&dir, "codeq.log");
    assert!(
        contents.contains(STARTUP_MESSAGE),
        "expected startup log message in file, got:\n{contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains(STARTUP_MESSAGE),
        "did not expect normal logs on stderr for file-only mode:\n{stderr}"
    );
    assert!(
        stderr.contains("Unsupported MODEL_PROVIDER"),
        "expected command error output on stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn both_output_writes_to_stderr_and_file() {
    let dir = scratch_dir("both");
    let output = run_query_with_logging("both", "pretty", Some(&dir.join("codeq.log")));

    let contents = read_rotated_log(&dir, "codeq.log");
    assert!(
        contents.contains(STARTUP_MESSAGE),
        "expected startup log message in file, got:\n{contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(STARTUP_MESSAGE),
        "expected startup log message on stderr, got:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unusable_file_path_falls_back_to_stderr() {
    let dir = scratch_dir("fallback");
    let blocking_file = dir.join("not-a-directory");
    fs::write(&blocking_file, "block").expect("failed to create blocking file");

    let output = run_query_with_logging("file", "pretty", Some(&blocking_file.join("codeq.log")));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to initialize LOG_OUTPUT=file"),
        "expected fallback warning, got:\n{stderr}"
    );
    assert!(
        stderr.contains("using stderr instead"),
        "expected stderr fallback message, got:\n{stderr}"
    );
    assert!(
        stderr.contains(STARTUP_MESSAGE),
        "expected logs to continue on stderr after fallback, got:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn stdout_stays_empty_when_the_query_fails() {
    let output = run_query_with_logging("stderr", "pretty", None);
    assert!(
        output.stdout.is_empty(),
        "expected nothing on stdout, got:\n{}",
        String::from_utf8_lossy(&output.stdout)
    );
}
