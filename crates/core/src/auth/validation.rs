/// Return path used when none (or an unsafe one) was supplied.
pub const DEFAULT_RETURN_TO: &str = "/";

/// Validates a return path to prevent open redirects.
///
/// Returns `Some(path)` if the value is an application-relative path,
/// `None` otherwise.
///
/// # Security
///
/// Accepted paths:
/// - start with a single `/`
/// - do not start with `//` (protocol-relative URLs like `//evil.com`)
/// - do not start with `/\` (browsers normalise it to `//`)
/// - contain no control characters, whitespace, or cookie delimiters
///   (`;`, `,`, `"`, `\`)
/// - contain no `://`
///
/// # Examples
///
/// ```
/// use bff_core::auth::validate_return_to;
///
/// assert_eq!(validate_return_to("/dashboard"), Some("/dashboard"));
/// assert_eq!(validate_return_to("//evil.com"), None);
/// assert_eq!(validate_return_to("https://evil.com"), None);
/// ```
pub fn validate_return_to(path: &str) -> Option<&str> {
    if !path.starts_with('/') {
        return None;
    }

    if path.starts_with("//") || path.starts_with("/\\") {
        return None;
    }

    if path
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || matches!(c, ';' | ',' | '"' | '\\'))
    {
        return None;
    }

    if path.contains("://") {
        return None;
    }

    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_paths() {
        assert_eq!(validate_return_to("/"), Some("/"));
        assert_eq!(validate_return_to("/dashboard"), Some("/dashboard"));
        assert_eq!(
            validate_return_to("/settings?tab=profile#top"),
            Some("/settings?tab=profile#top")
        );
    }

    #[test]
    fn rejects_absolute_and_protocol_relative_urls() {
        assert_eq!(validate_return_to("https://evil.com"), None);
        assert_eq!(validate_return_to("//evil.com"), None);
        assert_eq!(validate_return_to("/\\evil.com"), None);
        assert_eq!(validate_return_to("/redirect?to=https://evil.com"), None);
    }

    #[test]
    fn rejects_non_paths_and_control_characters() {
        assert_eq!(validate_return_to(""), None);
        assert_eq!(validate_return_to("dashboard"), None);
        assert_eq!(validate_return_to("javascript:alert(1)"), None);
        assert_eq!(validate_return_to("/a\r\nSet-Cookie: x=y"), None);
    }

    #[test]
    fn rejects_values_that_would_break_a_cookie() {
        assert_eq!(validate_return_to("/a; Domain=evil.com"), None);
        assert_eq!(validate_return_to("/a,b"), None);
        assert_eq!(validate_return_to("/a b"), None);
        assert_eq!(validate_return_to("/\"quoted\""), None);
        assert_eq!(validate_return_to("/a\\b"), None);
    }
}
