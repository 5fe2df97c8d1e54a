//! Domain logic for the teamgate build-notification service.
//!
//! This crate is HTTP-framework-free: it covers decoding the notification
//! path into a command and job name, the built-in command registry, and
//! resolving job names against a branch-structured job registry (including
//! the single indexing-and-retry round for branches that do not exist yet).
//! The HTTP surface lives in `teamgate-api`.

pub mod command;
pub mod error;
pub mod path;
pub mod payload;
pub mod registry;
pub mod resolver;
pub mod uri;
