use std::sync::Arc;

use teamgate_core::command::CommandRegistry;
use teamgate_core::resolver::JobResolver;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Everything in here is constructed once at startup and read-only
/// afterwards; cloning is cheap (all fields are behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The immutable command factory table.
    pub commands: Arc<CommandRegistry>,
    /// Job resolver with its injected collaborators.
    pub resolver: Arc<JobResolver>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
