//! Domain error taxonomy.
//!
//! Every failure the dispatcher has to distinguish is a separate variant,
//! so the HTTP layer can map them to status codes without string matching.

/// Failure while decoding a request path into a command and job name.
///
/// The error messages are part of the wire contract and must not change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The path did not start with the service prefix, so not even a
    /// command name could be extracted.
    #[error("Command not provided")]
    MissingCommand,

    /// A command name was present but no job segment followed it. Covers
    /// both "no slash after the command" and "slash but empty remainder".
    #[error("Job name not provided after command")]
    MissingJob { command: String },

    /// The job segment contained a malformed percent-escape or decoded to
    /// invalid UTF-8.
    #[error("Malformed URL-encoding in job name")]
    MalformedJob { command: String },
}

impl DecodeError {
    /// The command name, when enough of the path was parsed to know it.
    pub fn command(&self) -> Option<&str> {
        match self {
            DecodeError::MissingCommand => None,
            DecodeError::MissingJob { command } | DecodeError::MalformedJob { command } => {
                Some(command)
            }
        }
    }
}

/// Domain-level error for command dispatch and job resolution.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The request path could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The command name is not one of the registered commands.
    #[error("Command not implemented")]
    UnknownCommand { name: String },

    /// The job name matched neither a concrete job nor a branch-structured
    /// container.
    #[error("Project not found")]
    ProjectNotFound { job: String },

    /// The request body could not be converted into a build payload.
    #[error("Malformed build payload: {0}")]
    PayloadFormat(String),

    /// The permission checker rejected triggering the matched job.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Anything unexpected, including collaborator failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the core.
pub type CoreResult<T> = Result<T, CoreError>;
