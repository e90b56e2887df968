//! Link URL validation and sanitizing.
//!
//! Bad URLs never raise: validation only decides whether the submit action is enabled, and
//! sanitizing rewrites anything outside the scheme allow-list to an inert target.

use url::Url;

/// Pre-filled value of the URL input; valid, but never submitted.
pub const PLACEHOLDER_URL: &str = "https://";

/// Destination used in place of a disallowed or malformed URL.
pub const INERT_URL: &str = "about:blank";

/// Schemes a link may point at.
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "mailto", "sms", "tel"];

/// Rewrite `url` to [`INERT_URL`] unless it parses with a supported scheme.
pub fn sanitize_url(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed) if SUPPORTED_SCHEMES.contains(&parsed.scheme()) => url.trim().to_string(),
        Ok(parsed) => {
            tracing::debug!(scheme = parsed.scheme(), "unsupported link scheme replaced");
            INERT_URL.to_string()
        }
        Err(err) => {
            tracing::debug!(%err, "malformed link url replaced");
            INERT_URL.to_string()
        }
    }
}

/// Whether the URL input holds something acceptable.
///
/// The placeholder is valid so an untouched input shows no error. Anything else has to be an
/// absolute URL with a host (`https://example.com`) or an opaque path (`mailto:a@b.c`).
pub fn is_valid_url(url: &str) -> bool {
    if url == PLACEHOLDER_URL {
        return true;
    }
    match Url::parse(url.trim()) {
        Ok(parsed) => {
            parsed.host_str().is_some_and(|host| !host.is_empty()) || !parsed.path().is_empty()
        }
        Err(_) => false,
    }
}

/// Whether the URL input may be submitted: valid, non-empty, and not the placeholder.
pub fn is_submittable(url: &str) -> bool {
    let trimmed = url.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_URL && is_valid_url(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_supported_schemes() {
        for url in [
            "https://example.com/a?b=c",
            "http://example.com",
            "mailto:someone@example.com",
            "tel:+1-555-0100",
            "sms:+15550100",
        ] {
            assert_eq!(sanitize_url(url), url);
        }
    }

    #[test]
    fn test_sanitize_rewrites_everything_else() {
        assert_eq!(sanitize_url("javascript:alert(1)"), INERT_URL);
        assert_eq!(sanitize_url("ftp://example.com"), INERT_URL);
        assert_eq!(sanitize_url("not a url"), INERT_URL);
    }

    #[test]
    fn test_validation() {
        assert!(is_valid_url(PLACEHOLDER_URL));
        assert!(!is_submittable(PLACEHOLDER_URL));
        assert!(!is_valid_url("example.com"));
        assert!(!is_submittable(""));
        assert!(is_submittable("https://example.com"));
        assert!(is_submittable("https://partial"));
        assert!(is_submittable("mailto:a@b.c"));
    }
}
