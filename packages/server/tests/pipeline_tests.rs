//! End-to-end pipeline behavior with mocked model and extraction.

mod common;

use std::time::{Duration, Instant};

use common::*;
use server_core::domains::artifacts::ArtifactId;
use server_core::domains::pipeline::{PipelineSettings, RunState};
use server_core::kernel::{MockModelGateway, ModelError};
use tokio_test::assert_ok;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_one_successful_iteration_writes_matching_artifacts() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);

    assert!(harness.controller.start().accepted);
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.iterations_succeeded, 1);
    assert_eq!(status.iterations_failed, 0);
    assert_eq!(status.links_generated, 1);
    assert_eq!(status.conversations_saved, 1);
    assert_eq!(status.insights_saved, 1);
    assert_eq!(status.last_strategy.as_deref(), Some("mock_static"));
    assert!(status.last_iteration_finished_at.is_some());

    let expected = ArtifactId::for_link(SHARE_LINK).filename();
    assert_eq!(TestHarness::json_files(&harness.conversations_dir()), vec![expected.clone()]);
    assert_eq!(TestHarness::json_files(&harness.insights_dir()), vec![expected]);

    let id = ArtifactId::for_link(SHARE_LINK);
    let insight = harness.deps.store.load_insight(id.as_str()).unwrap().unwrap();
    assert_eq!(insight.user_name.as_deref(), Some("Sam"));
    assert_eq!(insight.tags.len(), 2);
    let stored = harness.deps.store.load_conversation(id.as_str()).unwrap().unwrap();
    assert_eq!(stored.source_link, SHARE_LINK);
    assert_eq!(stored.extraction_method, "mock_static");
}

#[tokio::test]
async fn test_all_strategies_failing_counts_failure_and_writes_nothing() {
    let harness = TestHarness::new(
        working_gateway(),
        vec![failing_strategy("first"), failing_strategy("second")],
    );

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert!(status.iterations_failed >= 1);
    assert_eq!(status.iterations_succeeded, 0);
    assert!(status.consecutive_failures >= 1);
    assert!(status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("extraction failed")));
    assert!(TestHarness::json_files(&harness.conversations_dir()).is_empty());
    assert!(TestHarness::json_files(&harness.insights_dir()).is_empty());
}

#[tokio::test]
async fn test_invalid_links_exhaust_generation_budget() {
    let gateway = MockModelGateway::new().with_reply(LINK_NEEDLE, "I cannot browse the web.");
    let harness = TestHarness::new(gateway, vec![succeeding_strategy()]);

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.iterations_failed, 1);
    assert_eq!(status.links_generated, 3);
    assert_eq!(status.invalid_links, 3);
    assert!(status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("no valid link after 3 attempts")));
}

#[tokio::test]
async fn test_malformed_insight_is_partial() {
    let gateway = MockModelGateway::new()
        .with_reply(LINK_NEEDLE, SHARE_LINK)
        .with_reply(INSIGHT_NEEDLE, "Sorry, here is a summary in prose.");
    let harness = TestHarness::new(gateway, vec![succeeding_strategy()]);

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.iterations_partial, 1);
    assert_eq!(status.iterations_failed, 0);
    assert_eq!(status.consecutive_failures, 0);
    assert!(status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("insight malformed")));
    assert_eq!(TestHarness::json_files(&harness.conversations_dir()).len(), 1);
    assert!(TestHarness::json_files(&harness.insights_dir()).is_empty());
    // First prompt plus one corrective retry
    assert_eq!(harness.gateway.calls_containing(INSIGHT_NEEDLE), 2);
}

#[tokio::test]
async fn test_model_outage_while_summarizing_counts_as_failure() {
    let gateway = MockModelGateway::new()
        .with_reply(LINK_NEEDLE, SHARE_LINK)
        .with_replies(
            INSIGHT_NEEDLE,
            vec![Err(ModelError::ServiceUnavailable("connection refused".into()))],
        );
    let harness = TestHarness::new(gateway, vec![succeeding_strategy()]);

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.iterations_failed, 1);
    assert_eq!(status.iterations_partial, 0);
    assert_eq!(status.consecutive_failures, 1);
    assert!(status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("model service unavailable")));
    // The conversation stays on disk for a later resume pass
    assert_eq!(TestHarness::json_files(&harness.conversations_dir()).len(), 1);
    assert!(TestHarness::json_files(&harness.insights_dir()).is_empty());
    // No corrective retry for a transport fault
    assert_eq!(harness.gateway.calls_containing(INSIGHT_NEEDLE), 1);
}

#[tokio::test]
async fn test_insight_write_failure_counts_as_failure() {
    let harness = TestHarness::new(working_gateway(), vec![succeeding_strategy()]);

    // A plain file where the insights directory should be makes every insight write fail
    assert_ok!(std::fs::remove_dir(harness.insights_dir()));
    assert_ok!(std::fs::write(harness.insights_dir(), b""));

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.iterations_failed, 1);
    assert_eq!(status.iterations_partial, 0);
    assert_eq!(status.consecutive_failures, 1);
    assert_eq!(status.conversations_saved, 1);
    assert_eq!(status.insights_saved, 0);
    assert!(status
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("artifact write failed")));
}

#[tokio::test]
async fn test_stop_during_extraction_finishes_iteration_then_idles() {
    let strategy = slow_strategy(Duration::from_millis(300));
    let calls = strategy.call_counter();
    let harness = TestHarness::new(working_gateway(), vec![strategy]);

    harness.controller.start();
    wait_until(WAIT, || {
        let started = calls.get() >= 1;
        async move { started.then_some(()) }
    })
    .await;

    // Status stays responsive while the iteration is in flight
    let asked = Instant::now();
    let in_flight = harness.controller.status();
    assert!(asked.elapsed() < Duration::from_millis(100));
    assert_eq!(in_flight.run_state, RunState::Running);
    assert_eq!(in_flight.iterations_attempted, 0);

    let stopping = harness.controller.stop();
    assert_eq!(stopping.status.run_state, RunState::Stopping);

    let done = harness
        .wait_for_status(WAIT, |s| s.run_state == RunState::Idle)
        .await;
    assert_eq!(done.iterations_attempted, 1);
    assert_eq!(done.iterations_succeeded, 1);
    assert_eq!(TestHarness::json_files(&harness.insights_dir()).len(), 1);

    // A new run starts from zero
    let restarted = harness.controller.start();
    assert!(restarted.accepted);
    assert_eq!(restarted.status.iterations_attempted, 0);
    assert_eq!(restarted.status.iterations_succeeded, 0);
    assert_ne!(restarted.status.run_id, done.run_id);
    harness.controller.shutdown().await;
}

#[tokio::test]
async fn test_start_rejected_while_stopping() {
    let harness = TestHarness::new(
        working_gateway(),
        vec![slow_strategy(Duration::from_millis(300))],
    );

    harness.controller.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.controller.stop();

    let rejected = harness.controller.start();
    assert!(!rejected.accepted);
    assert_eq!(rejected.status.run_state, RunState::Stopping);

    harness.controller.shutdown().await;
    assert_eq!(harness.controller.status().run_state, RunState::Idle);
}

#[tokio::test]
async fn test_repeated_link_is_skipped_as_duplicate() {
    let settings = PipelineSettings {
        min_iteration_interval: Duration::from_millis(50),
        ..test_settings()
    };
    let harness =
        TestHarness::with_settings(working_gateway(), vec![succeeding_strategy()], settings);

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.iterations_attempted >= 2)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.conversations_saved, 1);
    assert_eq!(status.insights_saved, 1);
    assert!(status.duplicates_skipped >= 1);
    assert_eq!(TestHarness::json_files(&harness.conversations_dir()).len(), 1);
    // The stored link already has an insight, so it is not summarized again
    assert_eq!(harness.gateway.calls_containing(INSIGHT_NEEDLE), 1);
}

#[tokio::test]
async fn test_iteration_starts_are_rate_limited() {
    let settings = PipelineSettings {
        min_iteration_interval: Duration::from_millis(100),
        base_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        link_attempts: 1,
    };
    // Every iteration fails immediately; only the limiter spaces them out
    let harness = TestHarness::with_settings(
        MockModelGateway::new().unavailable(),
        vec![succeeding_strategy()],
        settings,
    );

    harness.controller.start();
    tokio::time::sleep(Duration::from_millis(350)).await;
    let status = harness.controller.status();
    harness.controller.shutdown().await;

    assert!(status.iterations_attempted >= 2, "{:?}", status);
    assert!(status.iterations_attempted <= 4, "{:?}", status);
}

#[tokio::test]
async fn test_resume_pass_summarizes_stored_conversations() {
    // Link generation fails; only the resume pass can produce insights
    let gateway = MockModelGateway::new().with_reply(INSIGHT_NEEDLE, INSIGHT_JSON);
    let harness = TestHarness::new(gateway, vec![succeeding_strategy()]);

    let saved = harness
        .deps
        .store
        .save_conversation(&conversation(SHARE_LINK))
        .unwrap();
    assert_eq!(harness.deps.store.pending_insights().unwrap().len(), 1);

    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.insights_recovered >= 1)
        .await;
    harness.controller.shutdown().await;

    assert_eq!(status.insights_recovered, 1);
    assert!(harness.deps.store.has_insight(saved.id()));
    assert!(harness.deps.store.pending_insights().unwrap().is_empty());
}

#[tokio::test]
async fn test_resume_pass_is_rate_limited() {
    let settings = PipelineSettings {
        min_iteration_interval: Duration::from_millis(100),
        ..test_settings()
    };
    let gateway = MockModelGateway::new().with_reply(INSIGHT_NEEDLE, INSIGHT_JSON);
    let harness = TestHarness::with_settings(gateway, vec![succeeding_strategy()], settings);

    for i in 0..3 {
        let link = format!("https://chatgpt.com/share/6f1c2b3a-9d4e-4f5a-8b6c-7d8e9f0a1b2{i}");
        assert_ok!(harness.deps.store.save_conversation(&conversation(&link)));
    }
    assert_eq!(assert_ok!(harness.deps.store.pending_insights()).len(), 3);

    let started = Instant::now();
    harness.controller.start();
    let status = harness
        .wait_for_status(WAIT, |s| s.insights_recovered >= 3)
        .await;
    let elapsed = started.elapsed();
    harness.controller.shutdown().await;

    assert_eq!(status.insights_recovered, 3);
    // Three summaries need two full intervals between them
    assert!(elapsed >= Duration::from_millis(200), "{:?}", elapsed);
    assert_eq!(harness.gateway.calls_containing(INSIGHT_NEEDLE), 3);
}
