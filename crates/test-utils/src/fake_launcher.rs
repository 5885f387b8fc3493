use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ctx::discover::Candidate;
use ctx::env::ChildEnv;
use ctx::exec::{Launcher, OutcomeStatus};
use tokio_util::sync::CancellationToken;

/// What a scripted plugin does when launched.
#[derive(Debug, Clone)]
pub struct Script {
    pub delay: Duration,
    pub status: OutcomeStatus,
}

/// One recorded launch.
#[derive(Debug, Clone)]
pub struct LaunchRecord {
    pub name: String,
    pub started: Instant,
    pub finished: Instant,
    pub env: Vec<String>,
}

/// A fake launcher that:
/// - sleeps for the scripted delay, honouring cancellation
/// - returns the scripted status (a spawn error for unknown plugins)
/// - records every launch and the peak number of concurrent launches.
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    scripts: Arc<HashMap<String, Script>>,
    launches: Arc<Mutex<Vec<LaunchRecord>>>,
    in_flight: Arc<Mutex<(usize, usize)>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, name: &str, delay: Duration, status: OutcomeStatus) -> Self {
        Arc::make_mut(&mut self.scripts).insert(name.to_string(), Script { delay, status });
        self
    }

    /// Succeeds after `delay` with `stdout`.
    pub fn succeed(self, name: &str, delay: Duration, stdout: Vec<u8>) -> Self {
        self.with_script(name, delay, OutcomeStatus::Success { stdout })
    }

    /// Exits with `code` after `delay`.
    pub fn fail(self, name: &str, delay: Duration, code: i32) -> Self {
        self.with_script(
            name,
            delay,
            OutcomeStatus::Failed {
                exit_code: Some(code),
                stderr: format!("{name} failed"),
            },
        )
    }

    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.launches.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().1
    }

    fn enter(&self) {
        let mut guard = self.in_flight.lock().unwrap();
        guard.0 += 1;
        guard.1 = guard.1.max(guard.0);
    }

    fn leave(&self) {
        self.in_flight.lock().unwrap().0 -= 1;
    }
}

impl Launcher for ScriptedLauncher {
    fn launch<'a>(
        &'a self,
        candidate: &'a Candidate,
        env: &'a ChildEnv,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = OutcomeStatus> + Send + 'a>> {
        Box::pin(async move {
            let started = Instant::now();
            self.enter();

            let status = match self.scripts.get(&candidate.name) {
                Some(script) => {
                    tokio::select! {
                        _ = cancel.cancelled() => OutcomeStatus::Cancelled,
                        _ = tokio::time::sleep(script.delay) => script.status.clone(),
                    }
                }
                None => OutcomeStatus::SpawnError(format!("no script for {}", candidate.name)),
            };

            self.leave();
            self.launches.lock().unwrap().push(LaunchRecord {
                name: candidate.name.clone(),
                started,
                finished: Instant::now(),
                env: env.to_strings(),
            });
            status
        })
    }
}
