//! Pipeline run state and counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::iteration::{IterationOutcome, IterationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Stopping,
}

/// Snapshot of the loop, as returned by `status()`.
///
/// Counters cover the current run only; `start()` zeroes them.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    pub run_state: RunState,
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,

    pub iterations_attempted: u64,
    pub iterations_succeeded: u64,
    pub iterations_failed: u64,
    /// Conversation stored but no insight
    pub iterations_partial: u64,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub last_iteration_started_at: Option<DateTime<Utc>>,
    pub last_iteration_finished_at: Option<DateTime<Utc>>,
    pub last_strategy: Option<String>,

    pub links_generated: u64,
    pub invalid_links: u64,
    pub conversations_saved: u64,
    pub insights_saved: u64,
    pub duplicates_skipped: u64,
    pub insights_recovered: u64,

    /// Computed when the snapshot is taken
    pub uptime_seconds: u64,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            run_state: RunState::Idle,
            run_id: None,
            started_at: None,
            iterations_attempted: 0,
            iterations_succeeded: 0,
            iterations_failed: 0,
            iterations_partial: 0,
            last_error: None,
            consecutive_failures: 0,
            last_iteration_started_at: None,
            last_iteration_finished_at: None,
            last_strategy: None,
            links_generated: 0,
            invalid_links: 0,
            conversations_saved: 0,
            insights_saved: 0,
            duplicates_skipped: 0,
            insights_recovered: 0,
            uptime_seconds: 0,
        }
    }
}

impl PipelineState {
    /// Fresh running state for a new run.
    pub fn running(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_state: RunState::Running,
            run_id: Some(run_id),
            started_at: Some(started_at),
            ..Self::default()
        }
    }

    /// Fold one finished iteration into the counters.
    pub fn record(&mut self, report: &IterationReport) {
        self.iterations_attempted += 1;
        self.last_iteration_started_at = Some(report.started_at);
        self.last_iteration_finished_at = Some(report.finished_at);
        if report.strategy.is_some() {
            self.last_strategy = report.strategy.clone();
        }

        self.links_generated += report.tally.generated;
        self.invalid_links += report.tally.invalid;
        self.conversations_saved += report.conversations_saved;
        self.insights_saved += report.insights_saved;
        self.duplicates_skipped += report.duplicates_skipped;

        match report.outcome {
            IterationOutcome::Succeeded => {
                self.iterations_succeeded += 1;
                self.consecutive_failures = 0;
            }
            IterationOutcome::Partial => {
                self.iterations_partial += 1;
                self.consecutive_failures = 0;
            }
            IterationOutcome::Failed => {
                self.iterations_failed += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }

        if let Some(error) = &report.error {
            self.last_error = Some(error.to_string());
        }
    }

    /// Copy with `uptime_seconds` filled in as of `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Self {
        let mut snapshot = self.clone();
        snapshot.uptime_seconds = match (self.run_state, self.started_at) {
            (RunState::Idle, _) | (_, None) => 0,
            (_, Some(started_at)) => (now - started_at).num_seconds().max(0) as u64,
        };
        snapshot
    }
}
