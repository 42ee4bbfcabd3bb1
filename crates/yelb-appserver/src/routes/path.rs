//! API path normalization.

/// Canonical `/seg/seg` form of `raw`.
///
/// Empty segments are dropped, so leading, trailing and repeated slashes collapse.
/// An input without segments normalizes to `/`.
pub fn normalize(raw: &str) -> String {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normal_path_remains_normal() {
        assert_eq!(normalize("/api/test"), "/api/test");
    }

    #[test]
    fn test_repeated_leading_slashes() {
        assert_eq!(normalize("//////api/test"), "/api/test");
    }

    #[test]
    fn test_missing_leading_slash() {
        assert_eq!(normalize("api/test"), "/api/test");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn test_trailing_and_inner_slashes() {
        assert_eq!(normalize("/api//pageviews/"), "/api/pageviews");
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(raw in "[a-z/]{0,24}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_segments_preserved(parts in prop::collection::vec("[a-z]+", 0..5), slashes in 1usize..4) {
            let sep = "/".repeat(slashes);
            let raw = format!("{}{}{}", sep, parts.join(&sep), sep);
            prop_assert_eq!(normalize(&raw), format!("/{}", parts.join("/")));
        }

        #[test]
        fn test_output_has_no_empty_segments(raw in "\\PC*") {
            let normalized = normalize(&raw);
            prop_assert!(normalized.starts_with('/'));
            prop_assert!(!normalized.contains("//"));
            prop_assert!(normalized == "/" || !normalized.ends_with('/'));
        }
    }
}
