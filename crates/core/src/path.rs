//! Request-path decoding.
//!
//! Notification paths look like `/team-build/<command>/<encoded-job-name>`.
//! The job segment is URL-form-encoded by the sender (`+` for space, `%XX`
//! escapes), so it is decoded here rather than by the HTTP router, which
//! must hand us the raw path untouched.

use crate::error::DecodeError;

/// URL name the service is mounted under.
pub const SERVICE_ROOT: &str = "team-build";

/// Prefix every dispatchable path must carry.
pub const PATH_PREFIX: &str = "/team-build/";

/// A successfully decoded request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    /// Command name exactly as it appeared in the path (casing preserved).
    pub command: String,
    /// Fully decoded job name.
    pub job: String,
}

impl DecodedPath {
    /// Decode `path` into a command name and job name.
    ///
    /// Partial knowledge is preserved on failure: once a command name has
    /// been seen, the error variant carries it so callers can report
    /// precisely which part was missing.
    pub fn parse(path: &str) -> Result<Self, DecodeError> {
        let rest = path
            .strip_prefix(PATH_PREFIX)
            .ok_or(DecodeError::MissingCommand)?;

        let Some(slash) = rest.find('/') else {
            return Err(DecodeError::MissingJob {
                command: rest.to_string(),
            });
        };

        let command = rest[..slash].to_string();
        let encoded_job = &rest[slash + 1..];
        if encoded_job.is_empty() {
            return Err(DecodeError::MissingJob { command });
        }

        match form_urldecode(encoded_job) {
            Some(job) => Ok(DecodedPath { command, job }),
            None => Err(DecodeError::MalformedJob { command }),
        }
    }
}

/// Decode a `application/x-www-form-urlencoded` string: `+` becomes a
/// space and `%XX` escapes become bytes. Returns `None` for truncated or
/// non-hex escapes and for byte sequences that are not valid UTF-8.
fn form_urldecode(encoded: &str) -> Option<String> {
    let raw = encoded.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            b'%' => {
                if i + 2 >= raw.len() {
                    return None;
                }
                let hi = hex_value(raw[i + 1])?;
                let lo = hex_value(raw[i + 2])?;
                bytes.push((hi << 4) | lo);
                i += 3;
            }
            b => {
                bytes.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(bytes).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn typical_path_decodes() {
        let decoded = DecodedPath::parse("/team-build/ping/a").unwrap();
        assert_eq!(decoded.command, "ping");
        assert_eq!(decoded.job, "a");
    }

    #[test]
    fn encoded_job_name_is_fully_decoded() {
        let decoded = DecodedPath::parse(
            "/team-build/ping/a+job%20name%2Fcontaining%3Dencoded+characters%3F",
        )
        .unwrap();
        assert_eq!(decoded.command, "ping");
        assert_eq!(decoded.job, "a job name/containing=encoded characters?");
    }

    #[test]
    fn trailing_slash_without_job_keeps_command() {
        let err = DecodedPath::parse("/team-build/ping/").unwrap_err();
        assert_matches!(err, DecodeError::MissingJob { ref command } if command == "ping");
        assert_eq!(err.command(), Some("ping"));
        assert_eq!(err.to_string(), "Job name not provided after command");
    }

    #[test]
    fn no_slash_after_command_keeps_command() {
        let err = DecodedPath::parse("/team-build/ping").unwrap_err();
        assert_matches!(err, DecodeError::MissingJob { ref command } if command == "ping");
    }

    #[test]
    fn wrong_prefix_is_missing_command() {
        let err = DecodedPath::parse("/other/ping/a").unwrap_err();
        assert_matches!(err, DecodeError::MissingCommand);
        assert_eq!(err.command(), None);
        assert_eq!(err.to_string(), "Command not provided");
    }

    #[test]
    fn empty_command_segment_is_allowed_through_decoding() {
        // Registry lookup rejects it later; decoding itself succeeds.
        let decoded = DecodedPath::parse("/team-build//somejob").unwrap();
        assert_eq!(decoded.command, "");
        assert_eq!(decoded.job, "somejob");
    }

    #[test]
    fn malformed_escape_fails_but_keeps_command() {
        let err = DecodedPath::parse("/team-build/build/bad%zzname").unwrap_err();
        assert_matches!(err, DecodeError::MalformedJob { ref command } if command == "build");
    }

    #[test]
    fn truncated_escape_fails() {
        let err = DecodedPath::parse("/team-build/build/bad%2").unwrap_err();
        assert_matches!(err, DecodeError::MalformedJob { .. });
    }

    #[test]
    fn invalid_utf8_after_decoding_fails() {
        let err = DecodedPath::parse("/team-build/build/%ff%fe").unwrap_err();
        assert_matches!(err, DecodeError::MalformedJob { .. });
    }

    #[test]
    fn plus_decodes_to_space() {
        let decoded = DecodedPath::parse("/team-build/build/my+job").unwrap();
        assert_eq!(decoded.job, "my job");
    }
}
