use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`). Must exceed the
    /// branch-index wait, which the handler may spend blocked.
    pub request_timeout_secs: u64,
    /// How long to give branch indexing before the retry lookup
    /// (default: `10`).
    pub branch_index_wait_secs: u64,
    /// Optional JSON file seeding the in-process job registry.
    pub jobs_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default   |
    /// |---------------------------|-----------|
    /// | `HOST`                    | `0.0.0.0` |
    /// | `PORT`                    | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`      |
    /// | `BRANCH_INDEX_WAIT_SECS`  | `10`      |
    /// | `JOBS_FILE`               | unset     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let branch_index_wait_secs: u64 = std::env::var("BRANCH_INDEX_WAIT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("BRANCH_INDEX_WAIT_SECS must be a valid u64");

        let jobs_file = std::env::var("JOBS_FILE").ok().map(PathBuf::from);

        Self {
            host,
            port,
            request_timeout_secs,
            branch_index_wait_secs,
            jobs_file,
        }
    }
}
