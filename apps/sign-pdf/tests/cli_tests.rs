//! Command-line contract of the signing entry point.
//!
//! None of these reach pyHanko, so no signing tools are needed.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("user.p12"), b"p12 bytes").unwrap();
        std::fs::write(dir.path().join("in.pdf"), b"%PDF-1.7 placeholder").unwrap();
        std::fs::write(dir.path().join("ca.pem"), b"-----BEGIN CERTIFICATE-----").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }

    fn args(&self, page: &str, corners: [&str; 4]) -> Vec<String> {
        let mut args = vec![
            self.path("user.p12"),
            "secret".to_string(),
            self.path("in.pdf"),
            self.path("out.pdf"),
            page.to_string(),
        ];
        args.extend(corners.iter().map(|c| c.to_string()));
        args.push(self.path("ca.pem"));
        args
    }

    fn run(&self, args: &[String]) -> Output {
        sign_pdf(self.dir.path(), args)
    }
}

fn sign_pdf(cwd: &Path, args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sign-pdf"))
        .args(args)
        .current_dir(cwd)
        .env_remove("PDFSIGN_PYHANKO")
        .env_remove("PDFSIGN_OPENSSL")
        .env_remove("PDFSIGN_TIMEOUT_SECS")
        .env_remove("PDFSIGN_REQUIRE_PAGE_GEOMETRY")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_wrong_argument_count_exits_with_one() {
    let ws = Workspace::new();
    let mut args = ws.args("1", ["0", "0", "1", "1"]);
    args.pop();

    let output = ws.run(&args);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_certificate() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.dir.path().join("user.p12")).unwrap();

    let output = ws.run(&ws.args("1", ["0", "0", "1", "1"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("error[FileNotFound]: Certificate file not found"));
}

#[test]
fn test_empty_certificate() {
    let ws = Workspace::new();
    std::fs::write(ws.dir.path().join("user.p12"), b"").unwrap();

    let output = ws.run(&ws.args("1", ["0", "0", "1", "1"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[EmptyCertificateFile]"));
}

#[test]
fn test_missing_ca_certificate() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.dir.path().join("ca.pem")).unwrap();

    let output = ws.run(&ws.args("1", ["0", "0", "1", "1"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("CA certificate file not found"));
}

#[test]
fn test_invalid_page_is_rejected_before_signing() {
    let ws = Workspace::new();

    let output = ws.run(&ws.args("first", ["0", "0", "1", "1"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[InvalidPageIndex]"));
    assert!(!ws.dir.path().join("out.pdf").exists());
}

#[test]
fn test_invalid_coordinate_names_the_axis() {
    let ws = Workspace::new();

    let output = ws.run(&ws.args("1", ["0", "0", "1", "abc"]));
    assert_eq!(output.status.code(), Some(1));
    let diagnostic = stderr(&output);
    assert!(diagnostic.contains("error[InvalidCoordinate]"));
    assert!(diagnostic.contains("y2"));
}

#[test]
fn test_hyphenated_values_are_positionals() {
    let ws = Workspace::new();
    let mut args = ws.args("1", ["-5", "-5", "100", "100"]);
    args[1] = "-pass".to_string();
    std::fs::remove_file(ws.dir.path().join("user.p12")).unwrap();

    let output = ws.run(&args);
    assert_eq!(output.status.code(), Some(1));
    // Reaching the file check means clap accepted every positional
    assert!(stderr(&output).contains("error[FileNotFound]"));
}

#[cfg(unix)]
#[test]
fn test_credential_tool_failure() {
    let ws = Workspace::new();
    let mut args = ws.args("1", ["0.1", "0.1", "0.5", "0.5"]);
    args.push("--openssl".to_string());
    args.push("false".to_string());

    let output = ws.run(&args);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("error[CertificateLoadFailure]"));
    assert!(!ws.dir.path().join("out.pdf").exists());
}

#[cfg(unix)]
#[test]
fn test_openssl_can_come_from_environment() {
    let ws = Workspace::new();
    let output = Command::new(env!("CARGO_BIN_EXE_sign-pdf"))
        .args(ws.args("1", ["0", "0", "1", "1"]))
        .current_dir(ws.dir.path())
        .env("PDFSIGN_OPENSSL", "false")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[CertificateLoadFailure]"));
}

#[test]
fn test_help_exits_cleanly() {
    let ws = Workspace::new();
    let output = ws.run(&["--help".to_string()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("PDFSIGN_TIMEOUT_SECS"));
}
