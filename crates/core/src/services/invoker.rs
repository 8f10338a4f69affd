//! Backend invoker: command-line construction and process launching.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::backends::{BackendKind, Strategy, Verifier};
use crate::db::ExperimentLayout;
use crate::services::ExperimentError;

/// One external-process execution of a verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInvocation {
    pub backend: BackendKind,
    pub benchmark: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Variables set for this process only, on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Receives combined stdout and stderr; truncated on launch.
    pub log_path: PathBuf,
    pub strategy: Option<Strategy>,
}

impl BackendInvocation {
    /// Shell-like rendering for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Build the invocation(s) for one benchmark: one per strategy pass, or a
/// single untagged one for backends without strategies.
pub fn build_invocations(
    verifier: &dyn Verifier,
    program: &Path,
    input: &Path,
    benchmark: &str,
    bound: Option<u32>,
    env: &BTreeMap<String, String>,
    layout: &ExperimentLayout,
) -> Vec<BackendInvocation> {
    let mut base_args = vec![input.display().to_string()];
    base_args.extend(
        verifier
            .check_flags()
            .iter()
            .filter_map(|flag| verifier.spell_flag(*flag))
            .map(String::from),
    );
    if let Some(bound) = bound {
        base_args.push(verifier.unwind_flag().to_string());
        base_args.push(bound.to_string());
    }

    let passes: Vec<Option<Strategy>> = match verifier.strategies() {
        [] => vec![None],
        strategies => strategies.iter().copied().map(Some).collect(),
    };

    passes
        .into_iter()
        .map(|strategy| {
            let mut args = base_args.clone();
            if let Some(s) = strategy {
                args.extend(verifier.strategy_args(s));
            }
            BackendInvocation {
                backend: verifier.kind(),
                benchmark: benchmark.to_string(),
                program: program.to_path_buf(),
                args,
                env: env.clone(),
                log_path: layout.log_path(verifier.kind(), benchmark, strategy),
                strategy,
            }
        })
        .collect()
}

/// What happened to one launched process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// `None` when killed by a signal or by the timeout.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl InvocationOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Executes invocations. Implementations must block until the process has
/// exited and its log is on disk.
pub trait Launcher {
    fn launch(&self, invocation: &BackendInvocation) -> Result<InvocationOutcome, ExperimentError>;
}

/// Launches real processes, each inside a fresh scratch directory that is
/// removed when the process is done, so artifacts the verifier drops into its
/// working directory never outlive the invocation.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    pub timeout: Option<Duration>,
}

impl SystemLauncher {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &BackendInvocation) -> Result<InvocationOutcome, ExperimentError> {
        let workdir = tempfile::Builder::new()
            .prefix("bmc-bench-")
            .tempdir()
            .map_err(|e| ExperimentError::io(std::env::temp_dir(), e))?;

        let log = File::create(&invocation.log_path)
            .map_err(|e| ExperimentError::io(&invocation.log_path, e))?;
        let log_err = log.try_clone().map_err(|e| ExperimentError::io(&invocation.log_path, e))?;

        debug!(
            command = %invocation.command_line(),
            workdir = %workdir.path().display(),
            "spawning"
        );
        let started = Instant::now();
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));
        // Verifiers fork compilers and solvers; a fresh group lets a timeout reach all of them.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|source| ExperimentError::Launch {
            program: invocation.program.clone(),
            source,
        })?;

        let wait_err = |e: io::Error| ExperimentError::io(&invocation.log_path, e);
        let (status, timed_out): (Option<ExitStatus>, bool) = match self.timeout {
            Some(limit) => match child.wait_timeout(limit).map_err(wait_err)? {
                Some(status) => (Some(status), false),
                None => {
                    if let Err(e) = kill_process_tree(&mut child) {
                        warn!(pid = child.id(), error = %e, "failed to kill timed-out verifier");
                    }
                    if let Err(e) = child.wait() {
                        warn!(pid = child.id(), error = %e, "failed to reap timed-out verifier");
                    }
                    (None, true)
                }
            },
            None => (Some(child.wait().map_err(wait_err)?), false),
        };

        Ok(InvocationOutcome {
            exit_code: status.and_then(|s| s.code()),
            timed_out,
            elapsed: started.elapsed(),
        })
    }
}

/// Kill the verifier and everything it spawned. Must run before the child is
/// reaped, while its pid still names the process group.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) takes no pointers; a negative pid signals the group.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let group_err = io::Error::last_os_error();
    child.kill().map_err(|_| group_err)
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) -> io::Result<()> {
    child.kill()
}
