//! Comma-separated list fields.

/// Split on commas, trim, and drop empty segments.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render a list the way the form displays it (`"a, b, c"`).
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// Parse a decimal coordinate; anything unparseable is `0`.
pub fn parse_coordinate(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(parse_list("a,,  ,b"), vec!["a", "b"]);
        assert!(parse_list("  ").is_empty());
    }

    #[test]
    fn test_join_then_parse_is_stable() {
        let items = parse_list(" a, b ,c");
        assert_eq!(join_list(&items), "a, b, c");
        assert_eq!(parse_list(&join_list(&items)), items);
    }

    #[test]
    fn test_coordinate_fallback() {
        assert_eq!(parse_coordinate("abc"), 0.0);
        assert_eq!(parse_coordinate(" 14.6539 "), 14.6539);
        assert_eq!(parse_coordinate("NaN"), 0.0);
    }
}
