#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;

use bmc_bench_core::backends::BackendKind;
use bmc_bench_core::services::invoker::{BackendInvocation, Launcher, SystemLauncher};
use bmc_bench_core::services::ExperimentError;

/// Run a shell snippet through `/bin/sh -c`, with the log in `log_path`.
fn shell_invocation(
    script: &str,
    log_path: PathBuf,
    env: BTreeMap<String, String>,
) -> BackendInvocation {
    BackendInvocation {
        backend: BackendKind::Esbmc,
        benchmark: "fake".into(),
        program: PathBuf::from("/bin/sh"),
        args: vec!["-c".into(), script.into()],
        env,
        log_path,
        strategy: None,
    }
}

#[test]
fn captures_stdout_and_stderr_and_exit_code() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("fake.log");
    let mut env = BTreeMap::new();
    env.insert("BMC_BENCH_SCOPED".to_string(), "scoped".to_string());

    let inv = shell_invocation(
        "echo \"out $BMC_BENCH_SCOPED\"; echo 'err line' 1>&2; exit 3",
        log.clone(),
        env,
    );
    let outcome = SystemLauncher::new(None).launch(&inv).expect("launch");

    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.timed_out);
    assert!(!outcome.success());
    let body = fs::read_to_string(&log).unwrap();
    assert!(body.contains("out scoped"), "log was: {body}");
    assert!(body.contains("err line"), "log was: {body}");
    assert!(std::env::var_os("BMC_BENCH_SCOPED").is_none());
}

#[test]
fn log_is_overwritten_on_rerun() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("fake.log");
    fs::write(&log, "stale contents from an earlier run\n").unwrap();

    let inv = shell_invocation("echo fresh", log.clone(), BTreeMap::new());
    let outcome = SystemLauncher::new(None).launch(&inv).expect("launch");
    assert!(outcome.success());
    assert_eq!(fs::read_to_string(&log).unwrap(), "fresh\n");
}

#[test]
fn scratch_artifacts_do_not_outlive_the_invocation() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("fake.log");

    let inv = shell_invocation("pwd; touch stray.out", log.clone(), BTreeMap::new());
    SystemLauncher::new(None).launch(&inv).expect("launch");

    let workdir = PathBuf::from(fs::read_to_string(&log).unwrap().trim());
    assert!(!workdir.exists(), "scratch dir {} survived", workdir.display());
    assert!(!dir.path().join("stray.out").exists());
}

#[test]
fn timeout_kills_the_process() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("slow.log");

    let inv = shell_invocation("echo started; sleep 5", log.clone(), BTreeMap::new());
    let outcome =
        SystemLauncher::new(Some(Duration::from_millis(200))).launch(&inv).expect("launch");

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, None);
    assert!(outcome.elapsed < Duration::from_secs(5));
    assert!(fs::read_to_string(&log).unwrap().contains("started"));
}

#[test]
fn timeout_kills_background_children_too() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("forked.log");

    let inv = shell_invocation(
        "echo started; (sleep 1; echo late write from child) & sleep 10",
        log.clone(),
        BTreeMap::new(),
    );
    let outcome =
        SystemLauncher::new(Some(Duration::from_millis(200))).launch(&inv).expect("launch");
    assert!(outcome.timed_out);

    let at_return = fs::read_to_string(&log).unwrap();
    std::thread::sleep(Duration::from_millis(1500));
    let later = fs::read_to_string(&log).unwrap();
    assert_eq!(at_return, later);
    assert!(!later.contains("late write"), "log was: {later}");
}

#[test]
fn missing_program_is_a_launch_error() {
    let dir = tempdir().expect("tempdir");
    let mut inv = shell_invocation("true", dir.path().join("x.log"), BTreeMap::new());
    inv.program = dir.path().join("no-such-verifier");

    let err = SystemLauncher::new(None).launch(&inv).unwrap_err();
    assert!(matches!(err, ExperimentError::Launch { .. }), "unexpected error: {err}");
}
