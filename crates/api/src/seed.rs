//! In-process job registry for standalone deployments.
//!
//! The resolver only consumes collaborator traits; when teamgate runs on
//! its own (rather than embedded next to a real job scheduler) the
//! registry is seeded from a JSON file at startup. Jobs here do not
//! execute anything -- `enqueue` logs the trigger and reports creation,
//! leaving actual scheduling to whatever consumes the log/queue.
//!
//! Seed file format:
//!
//! ```json
//! {
//!   "jobs": ["ci/app"],
//!   "containers": {
//!     "web": {
//!       "remote": "https://example.com/org/web.git",
//!       "branches": ["master", "feature%2Fnew-ui"]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use teamgate_core::error::CoreResult;
use teamgate_core::registry::{
    BranchContainer, JobHandle, JobRegistry, PermissionChecker, SourceOwner,
};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    jobs: Vec<String>,
    #[serde(default)]
    containers: BTreeMap<String, SeedContainer>,
}

#[derive(Debug, Deserialize)]
struct SeedContainer {
    remote: Option<String>,
    #[serde(default)]
    branches: Vec<String>,
}

/// A job that records triggers via tracing instead of executing builds.
pub struct LoggingJob {
    name: String,
}

impl LoggingJob {
    pub fn shared(name: &str) -> Arc<dyn JobHandle> {
        Arc::new(LoggingJob {
            name: name.to_string(),
        })
    }
}

impl JobHandle for LoggingJob {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn enqueue(&self, parameters: BTreeMap<String, String>) -> CoreResult<bool> {
        tracing::info!(
            job = %self.name,
            parameters = ?parameters,
            "build trigger accepted"
        );
        Ok(true)
    }
}

/// Fixed branch set built from the seed file.
pub struct StaticContainer {
    branches: BTreeMap<String, Arc<dyn JobHandle>>,
}

impl BranchContainer for StaticContainer {
    fn branch_job(&self, branch: &str) -> Option<Arc<dyn JobHandle>> {
        self.branches.get(branch).cloned()
    }
}

/// Immutable registry built once at startup.
#[derive(Default)]
pub struct StaticJobRegistry {
    jobs: BTreeMap<String, Arc<dyn JobHandle>>,
    containers: BTreeMap<String, Arc<StaticContainer>>,
}

impl JobRegistry for StaticJobRegistry {
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

/// Standalone deployments have no authorization integration; every
/// trigger is allowed.
pub struct AllowAllPermissions;

impl PermissionChecker for AllowAllPermissions {
    fn check_trigger(&self, _job: &dyn JobHandle) -> CoreResult<()> {
        Ok(())
    }
}

/// Source owner backed by a seed container's remote. The static registry
/// cannot gain branches at runtime, so the update is only logged.
pub struct StaticOwner {
    name: String,
    remotes: Vec<String>,
}

impl SourceOwner for StaticOwner {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn remotes(&self) -> Vec<String> {
        self.remotes.clone()
    }

    fn on_source_updated(&self, remote: &str) {
        tracing::info!(owner = %self.name, remote = %remote, "branch indexing requested");
    }
}

/// Build the registry and source-owner list from an optional seed file.
///
/// Panics on an unreadable or malformed file, which is the desired
/// behaviour -- we want misconfiguration to fail at startup.
pub fn load_registry(
    jobs_file: Option<&Path>,
) -> (Arc<StaticJobRegistry>, Vec<Arc<dyn SourceOwner>>) {
    let Some(path) = jobs_file else {
        tracing::warn!("JOBS_FILE not set; starting with an empty job registry");
        return (Arc::new(StaticJobRegistry::default()), Vec::new());
    };

    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read jobs file {}: {e}", path.display()));
    let seed: SeedFile = serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse jobs file {}: {e}", path.display()));

    let mut registry = StaticJobRegistry::default();
    let mut owners: Vec<Arc<dyn SourceOwner>> = Vec::new();

    for name in &seed.jobs {
        registry.jobs.insert(name.clone(), LoggingJob::shared(name));
    }

    for (name, container) in &seed.containers {
        let branches = container
            .branches
            .iter()
            .map(|b| (b.clone(), LoggingJob::shared(&format!("{name}/{b}"))))
            .collect();
        registry
            .containers
            .insert(name.clone(), Arc::new(StaticContainer { branches }));

        if let Some(remote) = &container.remote {
            owners.push(Arc::new(StaticOwner {
                name: name.clone(),
                remotes: vec![remote.clone()],
            }));
        }
    }

    tracing::info!(
        jobs = seed.jobs.len(),
        containers = seed.containers.len(),
        "job registry seeded"
    );
    (Arc::new(registry), owners)
}
