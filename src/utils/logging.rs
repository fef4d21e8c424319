//! Logging utilities
//!
//! Helpers for keeping secrets and oversized payloads out of logs and the call history

/// Truncate a string with a note about original length
///
/// Cuts on a character boundary so multi-byte text never splits.
pub fn truncate_content(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((cut, _)) => {
            let dropped = s[cut..].chars().count();
            format!("{}... ({} chars truncated)", &s[..cut], dropped)
        }
        None => s.to_string(),
    }
}

/// Render a bearer token for display, keeping only its last four characters
pub fn mask_bearer(token: &str) -> String {
    let count = token.chars().count();
    if count <= 8 {
        return "Bearer ****".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("Bearer ****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 10), "short");
        assert_eq!(truncate_content("abcdefghij", 4), "abcd... (6 chars truncated)");
        assert_eq!(truncate_content("héllo wörld", 5), "héllo... (6 chars truncated)");
    }

    #[test]
    fn test_mask_bearer() {
        assert_eq!(mask_bearer("abcdefgh1234"), "Bearer ****1234");
        assert_eq!(mask_bearer("short"), "Bearer ****");
        assert_eq!(mask_bearer(""), "Bearer ****");
    }
}
