//! Loose repository-URI equivalence.
//!
//! Two URIs count as the same repository when they differ only in trivial
//! formatting: surrounding whitespace, a trailing slash, a trailing `.git`
//! suffix, or the case of scheme and host. Paths stay case-sensitive.

/// Compare two repository URIs for loose equivalence.
pub fn loosely_matches(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(uri: &str) -> String {
    let s = uri.trim().trim_end_matches('/');
    let s = s.strip_suffix(".git").unwrap_or(s);
    let s = s.trim_end_matches('/');

    match s.split_once("://") {
        Some((scheme, rest)) => {
            let (authority, path) = match rest.split_once('/') {
                Some((authority, path)) => (authority, format!("/{path}")),
                None => (rest, String::new()),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                authority.to_ascii_lowercase(),
                path
            )
        }
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_uris_match() {
        assert!(loosely_matches(
            "https://example.com/org/repo",
            "https://example.com/org/repo"
        ));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert!(loosely_matches(
            "https://example.com/org/repo/",
            "https://example.com/org/repo"
        ));
    }

    #[test]
    fn git_suffix_is_ignored() {
        assert!(loosely_matches(
            "https://example.com/org/repo.git",
            "https://example.com/org/repo"
        ));
        assert!(loosely_matches(
            "https://example.com/org/repo.git/",
            "https://example.com/org/repo"
        ));
    }

    #[test]
    fn scheme_and_host_case_is_ignored() {
        assert!(loosely_matches(
            "HTTPS://Example.COM/org/repo",
            "https://example.com/org/repo"
        ));
    }

    #[test]
    fn path_case_is_significant() {
        assert!(!loosely_matches(
            "https://example.com/org/Repo",
            "https://example.com/org/repo"
        ));
    }

    #[test]
    fn different_repositories_do_not_match() {
        assert!(!loosely_matches(
            "https://example.com/org/repo",
            "https://example.com/org/other"
        ));
    }
}
