//! Test harness: mocks wired into a real controller over a temp data dir.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use extraction::testing::{MockFetcher, MockStrategy};
use extraction::ConversationExtractor;
use server_core::domains::artifacts::ArtifactStore;
use server_core::domains::pipeline::{PipelineController, PipelineSettings, PipelineState};
use server_core::kernel::{MockModelGateway, ServerDeps};
use server_core::server::{build_app, AppState};
use tempfile::TempDir;

/// Settings that keep a test to a single iteration unless it waits on purpose.
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        min_iteration_interval: Duration::from_secs(10),
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        link_attempts: 3,
    }
}

pub struct TestHarness {
    pub gateway: Arc<MockModelGateway>,
    pub deps: ServerDeps,
    pub controller: Arc<PipelineController>,
    dir: TempDir,
}

impl TestHarness {
    pub fn new(gateway: MockModelGateway, strategies: Vec<MockStrategy>) -> Self {
        Self::with_settings(gateway, strategies, test_settings())
    }

    pub fn with_settings(
        gateway: MockModelGateway,
        strategies: Vec<MockStrategy>,
        settings: PipelineSettings,
    ) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let dir = TempDir::new().expect("temp dir");
        let store = ArtifactStore::open(dir.path()).expect("open store");

        let extractor = strategies
            .into_iter()
            .fold(ConversationExtractor::new(Arc::new(MockFetcher::new())), |e, s| {
                e.with_strategy(s)
            });

        let gateway = Arc::new(gateway);
        let deps = ServerDeps::new(gateway.clone(), extractor, store);
        let controller = Arc::new(PipelineController::new(deps.clone(), settings));

        Self {
            gateway,
            deps,
            controller,
            dir,
        }
    }

    pub fn app(&self) -> Router {
        build_app(AppState::new(self.controller.clone(), self.deps.clone()))
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.dir.path().join("conversations")
    }

    pub fn insights_dir(&self) -> PathBuf {
        self.dir.path().join("insights")
    }

    /// Names of the `.json` files in `dir`, sorted.
    pub fn json_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        names
    }

    /// Poll `status()` until `done` holds. Panics after `timeout`.
    pub async fn wait_for_status(
        &self,
        timeout: Duration,
        done: impl Fn(&PipelineState) -> bool,
    ) -> PipelineState {
        let controller = self.controller.clone();
        wait_until(timeout, move || {
            let status = controller.status();
            let ready = done(&status);
            async move { ready.then_some(status) }
        })
        .await
    }
}

/// Poll `check` every 10ms until it yields a value. Panics after `timeout`.
pub async fn wait_until<T, F, Fut>(timeout: Duration, mut check: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = check().await {
            return value;
        }
        assert!(Instant::now() < deadline, "condition not met within {:?}", timeout);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
