//! Shared text helpers.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Lowercase and collapse every whitespace run to a single space.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "Zoë Zoë";
        // 'ë' spans bytes 2..4
        assert_eq!(truncate_str(s, 3), "Zo");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  Book\n Claridge's\tNOW "), "book claridge's now");
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize_text("   "), "");
    }
}
