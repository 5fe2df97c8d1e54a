//! Shared harness for router-level integration tests.
//!
//! Builds the full application router (same middleware stack as
//! production) on top of a small in-memory job registry, with an instant
//! waiter so the branch-index retry adds no real delay.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use tower::ServiceExt;

use teamgate_api::config::ServerConfig;
use teamgate_api::router::build_app_router;
use teamgate_api::seed::{AllowAllPermissions, LoggingJob};
use teamgate_api::state::AppState;
use teamgate_core::command::CommandRegistry;
use teamgate_core::error::CoreResult;
use teamgate_core::registry::{
    BranchContainer, JobHandle, JobRegistry, PermissionChecker, SourceOwner,
};
use teamgate_core::resolver::{JobResolver, Waiter};

/// Waiter that returns immediately.
pub struct InstantWaiter;

#[async_trait]
impl Waiter for InstantWaiter {
    async fn wait(&self, _duration: Duration) {}
}

/// Container whose branch set can grow while a request is in flight,
/// standing in for the indexing subsystem.
#[derive(Default)]
pub struct GrowingContainer {
    branches: Mutex<BTreeMap<String, Arc<dyn JobHandle>>>,
}

impl GrowingContainer {
    pub fn add_branch(&self, stored_name: &str) {
        self.branches
            .lock()
            .unwrap()
            .insert(stored_name.to_string(), LoggingJob::shared(stored_name));
    }
}

impl BranchContainer for GrowingContainer {
    fn branch_job(&self, branch: &str) -> Option<Arc<dyn JobHandle>> {
        self.branches.lock().unwrap().get(branch).cloned()
    }
}

#[derive(Default)]
pub struct TestRegistry {
    jobs: BTreeMap<String, Arc<dyn JobHandle>>,
    containers: BTreeMap<String, Arc<GrowingContainer>>,
}

impl JobRegistry for TestRegistry {
    fn job_by_full_name(&self, name: &str) -> Option<Arc<dyn JobHandle>> {
        self.jobs.get(name).cloned()
    }

    fn container_by_name(&self, name: &str) -> Option<Arc<dyn BranchContainer>> {
        self.containers
            .get(name)
            .cloned()
            .map(|c| c as Arc<dyn BranchContainer>)
    }
}

/// Owner that simulates indexing by adding a branch to a container.
pub struct IndexingOwner {
    pub remote: String,
    pub container: Arc<GrowingContainer>,
    pub branch_to_add: String,
}

impl SourceOwner for IndexingOwner {
    fn display_name(&self) -> &str {
        "indexing-owner"
    }

    fn remotes(&self) -> Vec<String> {
        vec![self.remote.clone()]
    }

    fn on_source_updated(&self, _remote: &str) {
        self.container.add_branch(&self.branch_to_add);
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        branch_index_wait_secs: 10,
        jobs_file: None,
    }
}

/// Registry fixture used by most tests:
///
/// - direct job `ci/app`
/// - container `web` with branches `master` and `feature%2Fnew-ui`,
///   remote `https://example.com/org/web`
/// - container `idx` that starts empty; its owner adds `master` when
///   indexing fires
pub fn build_test_app() -> Router {
    let mut registry = TestRegistry::default();

    registry
        .jobs
        .insert("ci/app".to_string(), LoggingJob::shared("ci/app"));

    let web = Arc::new(GrowingContainer::default());
    web.add_branch("master");
    web.add_branch("feature%2Fnew-ui");
    registry.containers.insert("web".to_string(), web);

    let idx = Arc::new(GrowingContainer::default());
    let owner = Arc::new(IndexingOwner {
        remote: "https://example.com/org/idx.git".to_string(),
        container: Arc::clone(&idx),
        branch_to_add: "master".to_string(),
    });
    registry.containers.insert("idx".to_string(), idx);

    let resolver = JobResolver::new(
        Arc::new(registry) as Arc<dyn JobRegistry>,
        Arc::new(AllowAllPermissions) as Arc<dyn PermissionChecker>,
        vec![owner as Arc<dyn SourceOwner>],
    )
    .with_waiter(Arc::new(InstantWaiter));

    let state = AppState {
        commands: Arc::new(CommandRegistry::builtin()),
        resolver: Arc::new(resolver),
        config: Arc::new(test_config()),
    };

    build_app_router(state)
}

/// Perform a GET request against the app.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Perform a PUT request with the given body against the app.
pub async fn put(app: Router, path: &str, body: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::PUT)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as a UTF-8 string.
pub async fn body_string(response: Response<Body>) -> String {
    use http_body_util::BodyExt;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Standard notification body for a container-addressed build.
pub fn notification(branch: &str, repo_uri: &str) -> String {
    serde_json::json!({
        "BuildVariables": {
            "Build.SourceBranch": branch,
            "Build.Repository.Uri": repo_uri,
        }
    })
    .to_string()
}
