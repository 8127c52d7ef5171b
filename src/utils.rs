//! Small string helpers shared by the transport and error types
//!
//! Server error bodies can be arbitrary HTML or JSON; they are quoted in error
//! messages only after being cut on a UTF-8 boundary.

/// Truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes.
///
/// # Example
/// ```
/// use gymdesk_client::utils::safe_truncate;
///
/// // 'é' is two bytes; cutting at byte 4 would split it
/// assert_eq!(safe_truncate("Café", 4), "Caf");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Truncate for log and error output, appending "..." when anything was cut.
#[must_use]
pub fn truncate_for_display(s: &str, max_bytes: usize) -> String {
    let truncated = safe_truncate(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}

/// Join a request path onto a base URL.
///
/// Absolute URLs pass through untouched. A missing leading slash on `path` is
/// added and a trailing slash on `base` is dropped, so
/// `join_url("http://h/", "api/x")` and `join_url("http://h", "/api/x")` agree.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
