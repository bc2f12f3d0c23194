//! One pipeline iteration: generate → extract → store → summarize → store.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::error::PipelineError;
use super::settings::PipelineSettings;
use crate::domains::artifacts::SaveOutcome;
use crate::domains::insights::summarize;
use crate::domains::links::{generate_valid, LinkTally};
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Conversation and insight are both on disk
    Succeeded,
    /// Conversation on disk, insight reply unusable after the corrective retry
    Partial,
    Failed,
}

/// Everything one iteration did, committed to the counters in one step.
#[derive(Debug)]
pub struct IterationReport {
    pub outcome: IterationOutcome,
    pub error: Option<PipelineError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tally: LinkTally,
    pub link: Option<String>,
    pub strategy: Option<String>,
    pub conversations_saved: u64,
    pub insights_saved: u64,
    pub duplicates_skipped: u64,
}

impl IterationReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            outcome: IterationOutcome::Failed,
            error: None,
            started_at,
            finished_at: started_at,
            tally: LinkTally::default(),
            link: None,
            strategy: None,
            conversations_saved: 0,
            insights_saved: 0,
            duplicates_skipped: 0,
        }
    }
}

/// Run one iteration. Stage errors are captured in the report, never returned.
pub async fn run_iteration(deps: &ServerDeps, settings: &PipelineSettings) -> IterationReport {
    let mut report = IterationReport::new(Utc::now());
    let result = execute(deps, settings, &mut report).await;
    report.finished_at = Utc::now();

    match result {
        Ok(()) => {
            report.outcome = IterationOutcome::Succeeded;
            info!(
                link = report.link.as_deref().unwrap_or_default(),
                strategy = report.strategy.as_deref().unwrap_or_default(),
                "Iteration succeeded"
            );
        }
        Err(e) => {
            // Model or store faults during summarization still count as failures.
            report.outcome = if matches!(e, PipelineError::InsightMalformed { .. }) {
                IterationOutcome::Partial
            } else {
                IterationOutcome::Failed
            };
            warn!(
                link = report.link.as_deref().unwrap_or_default(),
                outcome = ?report.outcome,
                error = %e,
                "Iteration did not complete"
            );
            report.error = Some(e);
        }
    }

    report
}

async fn execute(
    deps: &ServerDeps,
    settings: &PipelineSettings,
    report: &mut IterationReport,
) -> Result<(), PipelineError> {
    let candidate =
        generate_valid(deps.gateway.as_ref(), settings.link_attempts, &mut report.tally).await?;
    report.link = Some(candidate.url.clone());

    let conversation = deps.extractor.extract(&candidate.url).await?;
    report.strategy = Some(conversation.extraction_method.clone());

    let id = match deps.store.save_conversation(&conversation)? {
        SaveOutcome::Created(id) => {
            report.conversations_saved += 1;
            id
        }
        SaveOutcome::Duplicate(id) => {
            report.duplicates_skipped += 1;
            if deps.store.has_insight(&id) {
                info!(id = %id, "Link already processed");
                return Ok(());
            }
            id
        }
    };

    let insight = summarize(deps.gateway.as_ref(), &conversation).await?;
    match deps.store.save_insight(&id, &insight)? {
        SaveOutcome::Created(_) => report.insights_saved += 1,
        SaveOutcome::Duplicate(_) => report.duplicates_skipped += 1,
    }

    Ok(())
}
