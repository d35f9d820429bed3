/// Collapse every whitespace run (including U+3000) to one ASCII space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-normalize an optional field, mapping blank values to `None`
pub fn clean_field(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("  東京\u{3000}ビッグサイト \n 西1ホール "), "東京 ビッグサイト 西1ホール");
    }

    #[test]
    fn test_clean_field_drops_blank_values() {
        assert_eq!(clean_field(Some(" \t ")), None);
        assert_eq!(clean_field(None), None);
        assert_eq!(clean_field(Some(" Hall  1 ")), Some("Hall 1".to_string()));
    }
}
