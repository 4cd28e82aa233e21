use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use awswrap_storage::*;
use tempfile::TempDir;

/// Runs commands with the stub directory first on PATH.
struct StubPathRunner {
    bin_dir: String,
}

#[async_trait]
impl CommandRunner for StubPathRunner {
    async fn invoke(&self, command: &str) -> Result<CommandOutput, StorageError> {
        ShellRunner
            .invoke(&format!("PATH=\"{}:$PATH\"; {command}", self.bin_dir))
            .await
    }
}

/// Writes an `aws` script that logs its arguments and prints canned output.
fn install_stub(dir: &Path, body: &str) {
    let script = dir.join("aws");
    fs::write(&script, format!("#!/bin/sh\necho \"$@\" >> \"{}/calls.log\"\n{body}\n", dir.display()))
        .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
}

fn client(dir: &TempDir) -> S3CliClient {
    S3CliClient::with_runner(Arc::new(StubPathRunner {
        bin_dir: dir.path().display().to_string(),
    }))
}

#[tokio::test]
async fn ls_through_shell() {
    let dir = TempDir::new().unwrap();
    install_stub(
        dir.path(),
        r#"printf '                           PRE logs/\n2024-03-01 10:00:00    1.2 KiB report.csv\n2024-03-01 10:00:00    0 Bytes empty/\n'"#,
    );

    let mut c = client(&dir).with_profile("dev");
    let listing = c.ls("s3://bucket/data/", false, None).await.unwrap();

    assert_eq!(c.exit_code(), Some(0));
    assert_eq!(listing.prefixes, vec!["logs/"]);
    assert_eq!(listing.files, vec!["report.csv"]);

    let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
    assert_eq!(calls.trim(), "s3 ls s3://bucket/data/ --human-readable --profile=dev");
}

#[tokio::test]
async fn failing_cli_with_errors_suppressed() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "echo 'fatal error: Access Denied' >&2\nexit 1");

    let mut c = client(&dir);
    let text = c
        .download("s3://bucket/data", "/tmp/report.csv", &CopyOptions::default())
        .await
        .unwrap();

    assert_eq!(c.exit_code(), Some(1));
    assert!(text.contains("Access Denied"));
    assert_eq!(
        c.command_line(),
        Some(r#"aws s3 cp "s3://bucket/data/report.csv" "/tmp/report.csv""#)
    );
}

#[tokio::test]
async fn failing_cli_raises_when_enabled() {
    let dir = TempDir::new().unwrap();
    install_stub(dir.path(), "exit 2");

    let mut c = client(&dir).with_error_as_exception(true);
    let err = c
        .upload("/tmp/dir", "s3://bucket/dir", &CopyOptions::recursive())
        .await
        .unwrap_err();

    match err {
        StorageError::CommandFailed { command, exit_code, .. } => {
            assert_eq!(exit_code, Some(2));
            assert!(command.ends_with("--recursive"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
