//! Job resolution against the branch-structured registry.
//!
//! A job name either addresses a concrete job directly, or names a
//! branch-structured container whose branch is derived from the payload's
//! `Build.SourceBranch`. When the branch job does not exist yet, branch
//! indexing is triggered for every matching source owner and the lookup is
//! retried exactly once after a fixed wait, because indexing completion
//! has no signal of its own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::payload::{self, BuildPayload, VAR_REPOSITORY_URI, VAR_SOURCE_BRANCH};
use crate::registry::{BranchContainer, JobHandle, JobRegistry, PermissionChecker, SourceOwner};
use crate::uri;

/// How long to give branch indexing before the single retry lookup.
pub const DEFAULT_INDEX_WAIT: Duration = Duration::from_secs(10);

const REF_HEADS_PREFIX: &str = "refs/heads/";

/// Pause primitive for the post-indexing wait, injected so tests run
/// without real delay. Returning early is always safe; the resolver just
/// proceeds to its final lookup.
#[async_trait]
pub trait Waiter: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Production waiter: pauses only the handling task.
pub struct TokioWaiter;

#[async_trait]
impl Waiter for TokioWaiter {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Outcome of one resolution attempt. `job: None` is a valid terminal
/// state: the branch job did not exist even after the retry.
pub struct Resolution {
    pub job: Option<Arc<dyn JobHandle>>,
    /// The submitted body as parsed JSON.
    pub raw: Value,
    /// Typed projection of the body.
    pub payload: BuildPayload,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("job", &self.job.as_ref().map(|j| j.full_name()))
            .field("raw", &self.raw)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Resolves job names to concrete jobs. Holds no per-request state;
/// each call to [`resolve`](JobResolver::resolve) is independent.
pub struct JobResolver {
    registry: Arc<dyn JobRegistry>,
    permissions: Arc<dyn PermissionChecker>,
    owners: Vec<Arc<dyn SourceOwner>>,
    waiter: Arc<dyn Waiter>,
    index_wait: Duration,
}

impl JobResolver {
    pub fn new(
        registry: Arc<dyn JobRegistry>,
        permissions: Arc<dyn PermissionChecker>,
        owners: Vec<Arc<dyn SourceOwner>>,
    ) -> Self {
        JobResolver {
            registry,
            permissions,
            owners,
            waiter: Arc::new(TokioWaiter),
            index_wait: DEFAULT_INDEX_WAIT,
        }
    }

    /// Replace the wait primitive (tests use an instant waiter).
    pub fn with_waiter(mut self, waiter: Arc<dyn Waiter>) -> Self {
        self.waiter = waiter;
        self
    }

    /// Override the post-indexing wait interval.
    pub fn with_index_wait(mut self, wait: Duration) -> Self {
        self.index_wait = wait;
        self
    }

    /// Resolve `job_name` against the registry using the submitted body.
    ///
    /// Direct matches never touch container logic and never wait. For
    /// container matches the indexing trigger fires at most once, and the
    /// retry lookup runs exactly once, strictly after the wait.
    pub async fn resolve(&self, job_name: &str, raw_body: &str) -> CoreResult<Resolution> {
        if let Some(job) = self.registry.job_by_full_name(job_name) {
            self.permissions.check_trigger(job.as_ref())?;
            let (raw, payload) = payload::parse_body(raw_body)?;
            tracing::debug!(job = job_name, "resolved job by full name");
            return Ok(Resolution {
                job: Some(job),
                raw,
                payload,
            });
        }

        let container = self
            .registry
            .container_by_name(job_name)
            .ok_or_else(|| CoreError::ProjectNotFound {
                job: job_name.to_string(),
            })?;

        let (raw, payload) = payload::parse_body(raw_body)?;
        let source_branch = payload.variable(VAR_SOURCE_BRANCH).ok_or_else(|| {
            CoreError::PayloadFormat(format!("missing '{VAR_SOURCE_BRANCH}' build variable"))
        })?;

        if let Some(job) = find_branch_job(container.as_ref(), source_branch) {
            tracing::debug!(container = job_name, branch = source_branch, "branch job found");
            return Ok(Resolution {
                job: Some(job),
                raw,
                payload,
            });
        }

        // The branch has no job yet. Ask the indexing subsystem to rescan
        // matching sources, give it one fixed interval, then look again.
        if let Some(repo_uri) = payload.variable(VAR_REPOSITORY_URI) {
            self.start_branch_indexing(repo_uri);
        } else {
            tracing::warn!(
                container = job_name,
                "no '{VAR_REPOSITORY_URI}' variable; waiting without an indexing trigger"
            );
        }
        self.waiter.wait(self.index_wait).await;

        let job = find_branch_job(container.as_ref(), source_branch);
        if job.is_none() {
            tracing::info!(
                container = job_name,
                branch = source_branch,
                "branch job still absent after indexing retry"
            );
        }
        Ok(Resolution { job, raw, payload })
    }

    /// Fire the indexing trigger of every source owner whose remote
    /// loosely matches the notifying repository.
    fn start_branch_indexing(&self, repo_uri: &str) {
        for owner in &self.owners {
            for remote in owner.remotes() {
                if uri::loosely_matches(repo_uri, &remote) {
                    tracing::info!(
                        owner = owner.display_name(),
                        remote = %remote,
                        "triggering branch indexing"
                    );
                    owner.on_source_updated(&remote);
                }
            }
        }
    }
}

/// Normalize the source branch and look it up in the container, falling
/// back to the URL-encoded form (branch names containing `/` or other
/// reserved characters are stored encoded).
fn find_branch_job(
    container: &dyn BranchContainer,
    source_branch: &str,
) -> Option<Arc<dyn JobHandle>> {
    let branch = source_branch
        .strip_prefix(REF_HEADS_PREFIX)
        .unwrap_or(source_branch);
    if let Some(job) = container.branch_job(branch) {
        return Some(job);
    }
    container.branch_job(&urlencoding::encode(branch))
}
