//! Collaborator seams around the process-wide job registry.
//!
//! The registry itself (and the execution subsystem behind
//! [`JobHandle::enqueue`]) is owned by the embedding process; this crate
//! only consumes it through these traits, injected at construction time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::CoreResult;

/// Handle to a concrete, triggerable job.
pub trait JobHandle: Send + Sync {
    /// Fully-qualified job name, unique within the registry.
    fn full_name(&self) -> &str;

    /// Schedule a build with the given parameters. Returns `true` when a
    /// new queue item was created (drives the 201 response).
    fn enqueue(&self, parameters: BTreeMap<String, String>) -> CoreResult<bool>;
}

/// Lookup surface of the process-wide job registry.
pub trait JobRegistry: Send + Sync {
    /// Direct lookup of a concrete job by fully-qualified name.
    fn job_by_full_name(&self, name: &str) -> Option<Arc<dyn JobHandle>>;

    /// Lookup of a branch-structured container by name. Returns `None`
    /// when no item of that name exists or the item is not
    /// branch-structured.
    fn container_by_name(&self, name: &str) -> Option<Arc<dyn BranchContainer>>;
}

/// A parent project grouping one job per branch of a single repository.
///
/// Branch jobs may appear out of band while a resolution is in flight:
/// firing [`SourceOwner::on_source_updated`] makes the indexing subsystem
/// rescan the repository and add jobs for branches it finds.
pub trait BranchContainer: Send + Sync {
    /// Find the job for a branch by its stored (possibly URL-encoded) name.
    fn branch_job(&self, branch: &str) -> Option<Arc<dyn JobHandle>>;
}

/// Authorization hook consulted before triggering a directly-addressed job.
pub trait PermissionChecker: Send + Sync {
    /// Err means the request may not trigger this job.
    fn check_trigger(&self, job: &dyn JobHandle) -> CoreResult<()>;
}

/// A registered owner of source-control configurations, e.g. one
/// multibranch project. Firing `on_source_updated` asks the indexing
/// subsystem to rescan that remote; any resulting branch jobs appear in
/// the owning container asynchronously.
pub trait SourceOwner: Send + Sync {
    /// Human-readable name, used in the indexing log line.
    fn display_name(&self) -> &str;

    /// Remote URIs of the sources this owner is configured with.
    fn remotes(&self) -> Vec<String>;

    /// Trigger a rescan of one of this owner's remotes. Fire-and-forget.
    fn on_source_updated(&self, remote: &str);
}
