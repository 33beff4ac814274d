use std::sync::OnceLock;

use regex::Regex;

/// Trims `s` and collapses every inner whitespace run to a single space.
/// Returns `None` when nothing but whitespace is left.
pub fn remove_excess_whitespace(s: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\s+").expect("regex should be valid"));
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(re.replace_all(trimmed, " ").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_inner_runs() {
        assert_eq!(
            remove_excess_whitespace("  Seljanka\n\t  3.50 € ").as_deref(),
            Some("Seljanka 3.50 €")
        );
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(remove_excess_whitespace(" \n\u{a0}\t"), None);
        assert_eq!(remove_excess_whitespace(""), None);
    }
}
