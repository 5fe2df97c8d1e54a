//! Built-in commands and the case-insensitive command registry.
//!
//! Exactly three commands exist: `ping`, `build` and `buildWithParameters`.
//! The registry is built once at startup and never mutated, so it can be
//! shared across request tasks without locking. Handlers are stateless and
//! created fresh per request through the factory table.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::{CoreError, CoreResult};
use crate::path::SERVICE_ROOT;
use crate::payload::BuildPayload;
use crate::registry::JobHandle;

/// Everything a command gets to work with for one request.
pub struct CommandInput<'a> {
    /// The decoded job name from the request path.
    pub job_name: &'a str,
    /// The resolved job, when resolution found one.
    pub job: Option<&'a dyn JobHandle>,
    /// The submitted body as parsed JSON.
    pub raw: &'a Value,
    /// Typed projection of the body.
    pub payload: &'a BuildPayload,
}

/// Result of performing a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// Whether a new queue item was created (maps to 201).
    pub created: bool,
    /// Command-specific response fields; the dispatcher adds the
    /// `created` marker before sending.
    pub body: Value,
}

/// A single dispatchable command.
pub trait Command: Send + Sync {
    fn perform(&self, input: &CommandInput<'_>) -> CoreResult<CommandOutcome>;
}

/// No-op health check. Succeeds whether or not a job was resolved.
struct PingCommand;

impl Command for PingCommand {
    fn perform(&self, input: &CommandInput<'_>) -> CoreResult<CommandOutcome> {
        Ok(CommandOutcome {
            created: false,
            body: json!({
                "message": "pong",
                "job": input.job.map(|j| j.full_name().to_string()),
            }),
        })
    }
}

/// Trigger the resolved job with no extra parameters.
struct BuildCommand;

impl Command for BuildCommand {
    fn perform(&self, input: &CommandInput<'_>) -> CoreResult<CommandOutcome> {
        let job = require_job(input)?;
        let created = job.enqueue(BTreeMap::new())?;
        Ok(CommandOutcome {
            created,
            body: json!({ "job": job.full_name() }),
        })
    }
}

/// Trigger the resolved job using the payload's build variables as
/// build parameters.
struct BuildWithParametersCommand;

impl Command for BuildWithParametersCommand {
    fn perform(&self, input: &CommandInput<'_>) -> CoreResult<CommandOutcome> {
        let job = require_job(input)?;
        let created = job.enqueue(input.payload.build_variables.clone())?;
        Ok(CommandOutcome {
            created,
            body: json!({
                "job": job.full_name(),
                "parameters": &input.payload.build_variables,
            }),
        })
    }
}

fn require_job<'a>(input: &'a CommandInput<'_>) -> CoreResult<&'a dyn JobHandle> {
    input.job.ok_or_else(|| CoreError::ProjectNotFound {
        job: input.job_name.to_string(),
    })
}

struct CommandEntry {
    display_name: &'static str,
    sample_payload: &'static str,
    factory: fn() -> Box<dyn Command>,
}

/// Immutable factory table mapping command names to handlers.
///
/// Keys are stored lowercased so lookup is ASCII case-insensitive; the
/// original casing is kept for the discovery listing.
pub struct CommandRegistry {
    entries: BTreeMap<String, CommandEntry>,
}

const SAMPLE_PING: &str = r#"{"BuildVariables":{}}"#;
const SAMPLE_BUILD: &str = concat!(
    r#"{"BuildVariables":{"Build.SourceBranch":"refs/heads/master","#,
    r#""Build.Repository.Uri":"https://example.com/org/repo.git"}}"#
);
const SAMPLE_BUILD_WITH_PARAMETERS: &str = concat!(
    r#"{"BuildVariables":{"Build.SourceBranch":"refs/heads/master","#,
    r#""Build.Repository.Uri":"https://example.com/org/repo.git","#,
    r#""MyParameter":"myValue"}}"#
);

impl CommandRegistry {
    /// Build the registry with the three built-in commands.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        let mut add = |name: &'static str, sample: &'static str, factory: fn() -> Box<dyn Command>| {
            entries.insert(
                name.to_ascii_lowercase(),
                CommandEntry {
                    display_name: name,
                    sample_payload: sample,
                    factory,
                },
            );
        };
        add("ping", SAMPLE_PING, || Box::new(PingCommand));
        add("build", SAMPLE_BUILD, || Box::new(BuildCommand));
        add("buildWithParameters", SAMPLE_BUILD_WITH_PARAMETERS, || {
            Box::new(BuildWithParametersCommand)
        });
        CommandRegistry { entries }
    }

    /// Create a fresh handler for `name`, case-insensitively.
    pub fn create(&self, name: &str) -> Option<Box<dyn Command>> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|entry| (entry.factory)())
    }

    /// Registered command names (original casing), sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.values().map(|e| e.display_name).collect()
    }

    /// HTML table rows describing every command: name, URL template and
    /// HTML-escaped sample payload. Used by the discovery page.
    pub fn describe_html_rows(&self) -> String {
        let mut out = String::new();
        for entry in self.entries.values() {
            out.push_str("<tr>\n");
            out.push_str(&format!(
                "<td valign='top'>{}</td>\n",
                escape_html(entry.display_name)
            ));
            out.push_str(&format!(
                "<td valign='top'>/{}/{}/JOB_NAME</td>\n",
                SERVICE_ROOT, entry.display_name
            ));
            out.push_str(&format!(
                "<td><pre>{}</pre></td>\n",
                escape_html(entry.sample_payload)
            ));
            out.push_str("</tr>\n");
        }
        out
    }
}

/// Minimal HTML escaping for text content and attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
