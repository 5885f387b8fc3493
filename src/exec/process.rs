// src/exec/process.rs

//! Real plugin process runner.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::OutcomeStatus;
use super::backend::Launcher;
use crate::discover::Candidate;
use crate::env::ChildEnv;

/// Launcher that spawns the candidate as an OS process.
///
/// The child gets no arguments, a null stdin and exactly the composed
/// environment. Stdout and stderr are captured separately.
#[derive(Debug, Clone, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch<'a>(
        &'a self,
        candidate: &'a Candidate,
        env: &'a ChildEnv,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = OutcomeStatus> + Send + 'a>> {
        Box::pin(run_process(candidate, env, cancel))
    }
}

async fn run_process(
    candidate: &Candidate,
    env: &ChildEnv,
    cancel: CancellationToken,
) -> OutcomeStatus {
    debug!(plugin = %candidate.name, path = ?candidate.path, "starting plugin process");

    let mut cmd = Command::new(&candidate.path);
    cmd.env_clear()
        .envs(env.entries().iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => return OutcomeStatus::SpawnError(format!("spawning process: {err}")),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Either the process exits on its own, or the shared deadline fires.
    tokio::select! {
        res = async { tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr)) } => {
            match res {
                Ok((status, out, err)) => {
                    info!(
                        plugin = %candidate.name,
                        exit_code = status.code(),
                        success = status.success(),
                        "plugin process exited"
                    );
                    if status.success() {
                        OutcomeStatus::Success { stdout: out }
                    } else {
                        OutcomeStatus::Failed {
                            exit_code: status.code(),
                            stderr: String::from_utf8_lossy(&err).into_owned(),
                        }
                    }
                }
                Err(err) => OutcomeStatus::SpawnError(format!("waiting for process: {err}")),
            }
        }

        _ = cancel.cancelled() => {
            info!(plugin = %candidate.name, "cancellation requested; killing plugin process");
            if let Err(e) = child.kill().await {
                warn!(
                    plugin = %candidate.name,
                    error = %e,
                    "failed to kill plugin process on cancellation"
                );
            }
            OutcomeStatus::Cancelled
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::RunConfig;
    use crate::env::{AmbientEnv, EnvComposer};

    fn script(dir: &Path, name: &str, body: &str) -> Candidate {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Candidate { path, name: name.to_string(), executable: true }
    }

    fn env_with(pairs: &[(&str, &str)]) -> ChildEnv {
        let ambient = AmbientEnv::from_pairs(pairs.iter().copied());
        let cfg = RunConfig::default();
        EnvComposer::new(&cfg, &ambient)
            .with_session_minter(|| "ctx_test".into())
            .compose()
    }

    #[tokio::test]
    async fn captures_stdout_separately_from_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let c = script(dir.path(), "ctx-out", "echo out; echo err >&2");
        let status = ProcessLauncher.launch(&c, &env_with(&[]), CancellationToken::new()).await;
        assert_eq!(status, OutcomeStatus::Success { stdout: b"out\n".to_vec() });
    }

    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let c = script(dir.path(), "ctx-fail", "echo boom >&2; exit 3");
        let status = ProcessLauncher.launch(&c, &env_with(&[]), CancellationToken::new()).await;
        assert_eq!(
            status,
            OutcomeStatus::Failed { exit_code: Some(3), stderr: "boom\n".into() }
        );
    }

    #[tokio::test]
    async fn child_sees_only_composed_environment() {
        let dir = tempfile::tempdir().unwrap();
        let c = script(dir.path(), "ctx-env", "printf '%s|%s' \"$CTX_SESSION\" \"${CTX_RETRY_MAX:-none}\"");
        let env = env_with(&[("CTX_RETRY_MAX", "5")]);
        let status = ProcessLauncher.launch(&c, &env, CancellationToken::new()).await;
        assert_eq!(status, OutcomeStatus::Success { stdout: b"ctx_test|none".to_vec() });
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let c = Candidate {
            path: "/definitely/not/here/ctx-x".into(),
            name: "ctx-x".into(),
            executable: true,
        };
        let status = ProcessLauncher.launch(&c, &env_with(&[]), CancellationToken::new()).await;
        assert!(matches!(status, OutcomeStatus::SpawnError(_)));
    }

    #[tokio::test]
    async fn cancellation_kills_the_process() {
        let dir = tempfile::tempdir().unwrap();
        let c = script(dir.path(), "ctx-slow", "exec sleep 10");
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let path = std::env::var("PATH").unwrap_or_default();
        let status = ProcessLauncher.launch(&c, &env_with(&[("PATH", path.as_str())]), token).await;
        assert_eq!(status, OutcomeStatus::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
