//! Pipeline controller.
//!
//! Owns the run state and the single worker task:
//!
//! ```text
//! start() ──► Running ──stop()──► Stopping ──worker exits──► Idle
//!                │
//!                └─► worker: resume pass, then
//!                    loop { rate limit → iteration → commit → backoff }
//! ```
//!
//! Lifecycle transitions go through a mutex so two `start()` calls can never
//! both win. Counters live behind a `RwLock` that is only held for copies and
//! commits, never across an await, so `status()` does not wait on the worker.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Utc;
use governor::{Quota, RateLimiter};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::iteration::{run_iteration, IterationOutcome};
use super::settings::PipelineSettings;
use super::state::{PipelineState, RunState};
use crate::domains::artifacts::SaveOutcome;
use crate::domains::insights::{summarize, InsightError};
use crate::kernel::{ModelError, ServerDeps};

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Result of a `start()` or `stop()` request.
#[derive(Debug, Clone, Serialize)]
pub struct ControlOutcome {
    pub accepted: bool,
    pub status: PipelineState,
}

struct Shared {
    deps: ServerDeps,
    settings: PipelineSettings,
    state: RwLock<PipelineState>,
}

impl Shared {
    fn snapshot(&self) -> PipelineState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot(Utc::now())
    }

    fn update<R>(&self, f: impl FnOnce(&mut PipelineState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[derive(Default)]
struct Lifecycle {
    cancel: Option<CancellationToken>,
    worker: Option<JoinHandle<()>>,
}

pub struct PipelineController {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl PipelineController {
    pub fn new(deps: ServerDeps, settings: PipelineSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                deps,
                settings,
                state: RwLock::new(PipelineState::default()),
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the loop from Idle. Rejected while Running or Stopping.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> ControlOutcome {
        let mut lifecycle = self.lifecycle();

        let current = self.shared.snapshot().run_state;
        if current != RunState::Idle {
            info!(run_state = ?current, "Start rejected, pipeline not idle");
            return ControlOutcome {
                accepted: false,
                status: self.shared.snapshot(),
            };
        }

        let run_id = Uuid::new_v4();
        self.shared
            .update(|state| *state = PipelineState::running(run_id, Utc::now()));

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_worker(self.shared.clone(), cancel.clone(), run_id));
        lifecycle.cancel = Some(cancel);
        lifecycle.worker = Some(worker);

        info!(run_id = %run_id, "Pipeline started");
        ControlOutcome {
            accepted: true,
            status: self.shared.snapshot(),
        }
    }

    /// Ask a running loop to stop after its in-flight iteration. Idempotent.
    pub fn stop(&self) -> ControlOutcome {
        let lifecycle = self.lifecycle();

        let stopped = self.shared.update(|state| {
            if state.run_state == RunState::Running {
                state.run_state = RunState::Stopping;
                true
            } else {
                false
            }
        });

        if stopped {
            if let Some(cancel) = &lifecycle.cancel {
                cancel.cancel();
            }
            info!("Pipeline stopping");
        } else {
            debug!("Stop requested while not running");
        }

        ControlOutcome {
            accepted: true,
            status: self.shared.snapshot(),
        }
    }

    /// Current counters. Never waits on the worker.
    pub fn status(&self) -> PipelineState {
        self.shared.snapshot()
    }

    /// Stop and wait for the worker to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let worker = self.lifecycle().worker.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "Pipeline worker ended abnormally");
            }
        }
        info!("Pipeline shut down");
    }
}

/// Returns the state to Idle however the worker exits.
struct IdleOnExit(Arc<Shared>);

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        self.0.update(|state| state.run_state = RunState::Idle);
    }
}

async fn run_worker(shared: Arc<Shared>, cancel: CancellationToken, run_id: Uuid) {
    let _idle = IdleOnExit(shared.clone());
    info!(run_id = %run_id, "Pipeline worker started");

    // Burst of one: consecutive model-bound starts are at least one period apart.
    // The resume pass and the main loop draw from the same limiter.
    let limiter: Option<DirectRateLimiter> =
        Quota::with_period(shared.settings.min_iteration_interval).map(RateLimiter::direct);

    resume_pending(&shared, limiter.as_ref(), &cancel).await;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        if let Some(limiter) = &limiter {
            if !wait_for_slot(limiter, &cancel).await {
                break;
            }
        }

        shared.update(|state| state.last_iteration_started_at = Some(Utc::now()));
        let report = run_iteration(&shared.deps, &shared.settings).await;
        let consecutive_failures = shared.update(|state| {
            state.record(&report);
            state.consecutive_failures
        });

        if report.outcome == IterationOutcome::Failed {
            let delay = shared.settings.backoff(consecutive_failures);
            warn!(
                consecutive_failures,
                backoff_ms = delay.as_millis() as u64,
                "Backing off after failed iteration"
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    info!(run_id = %run_id, "Pipeline worker stopped");
}

/// Wait for the rate limiter. Returns false when cancelled first.
async fn wait_for_slot(limiter: &DirectRateLimiter, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = limiter.until_ready() => true,
    }
}

/// Summarize conversations that were stored without an insight.
async fn resume_pending(
    shared: &Shared,
    limiter: Option<&DirectRateLimiter>,
    cancel: &CancellationToken,
) {
    let store = &shared.deps.store;
    let pending = match store.pending_insights() {
        Ok(pending) => pending,
        Err(e) => {
            warn!(error = %e, "Could not list pending insights");
            return;
        }
    };
    if pending.is_empty() {
        return;
    }

    info!(count = pending.len(), "Resuming conversations without insights");
    for id in pending {
        if cancel.is_cancelled() {
            break;
        }

        let conversation = match store.load_conversation(id.as_str()) {
            Ok(Some(conversation)) => conversation,
            Ok(None) => continue,
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping unreadable conversation");
                continue;
            }
        };

        if let Some(limiter) = limiter {
            if !wait_for_slot(limiter, cancel).await {
                break;
            }
        }

        let insight = match summarize(shared.deps.gateway.as_ref(), &conversation).await {
            Ok(insight) => insight,
            Err(InsightError::Model(ModelError::ServiceUnavailable(msg))) => {
                warn!(error = %msg, "Model service down, abandoning resume pass");
                break;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Resume summary failed");
                continue;
            }
        };

        match store.save_insight(&id, &insight) {
            Ok(SaveOutcome::Created(_)) => shared.update(|state| {
                state.insights_saved += 1;
                state.insights_recovered += 1;
            }),
            Ok(SaveOutcome::Duplicate(_)) => {}
            Err(e) => warn!(id = %id, error = %e, "Could not save recovered insight"),
        }
    }
}
