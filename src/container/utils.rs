/// Checks whether all bytes in the given slice may appear in a request path segment.
///
/// This function returns `true` if every byte in the input slice is an ASCII
/// alphanumeric character or one of `_`, `-` and `.`. It returns `false` for
/// anything else, including `/`, `?`, whitespace and non-ASCII bytes.
///
/// # Arguments
///
/// * `src` - A byte slice to check.
///
/// # Returns
///
/// `true` if all bytes are path-safe, otherwise `false`.
pub(super) fn is_path_safe(src: &[u8]) -> bool {
    src.iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_path_safe() {
        let valid = b"abc123_DEF-4.5";
        assert!(is_path_safe(valid));

        let with_slash = b"abc/123";
        assert!(!is_path_safe(with_slash));

        let with_query = b"abc?stream=true";
        assert!(!is_path_safe(with_query));

        let with_space = b"abc 123";
        assert!(!is_path_safe(with_space));

        let empty: &[u8] = b"";
        assert!(is_path_safe(empty));
    }
}
