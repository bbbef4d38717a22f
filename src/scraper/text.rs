use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed pattern set for monetary amounts: `$`/`£`/`€` prefixes and
/// spelled-out "dollars"/"USD"/"pounds"/"euros" suffixes, with optional
/// thousands separators and up to two decimals. Not user-configurable.
static MONEY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\$\d+(?:,\d{3})*(?:\.\d{1,2})?",
        r"(?i)\d+(?:,\d{3})*(?:\.\d{1,2})?\s+dollars?",
        r"(?i)\d+(?:,\d{3})*(?:\.\d{1,2})?\s+USD",
        r"(?i)£\d+(?:,\d{3})*(?:\.\d{1,2})?",
        r"(?i)\d+(?:,\d{3})*(?:\.\d{1,2})?\s+pounds?",
        r"(?i)€\d+(?:,\d{3})*(?:\.\d{1,2})?",
        r"(?i)\d+(?:,\d{3})*(?:\.\d{1,2})?\s+euros?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("money pattern is valid"))
    .collect()
});

/// True when the text mentions a monetary amount. First match wins.
pub fn contains_money(text: &str) -> bool {
    MONEY_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Case-insensitive, non-overlapping occurrence count of `needle` in
/// `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .to_lowercase()
        .matches(&needle.to_lowercase())
        .count()
}

/// Replace filesystem-reserved characters with underscores. No length
/// limit and no collision handling: identical inputs collide.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_money_dollar_amounts() {
        assert!(contains_money("It costs $5.00"));
        assert!(contains_money("a $1,000,000 deal"));
        assert!(contains_money("$12"));
    }

    #[test]
    fn test_contains_money_spelled_out_currencies() {
        assert!(contains_money("100 USD"));
        assert!(contains_money("around 45 dollars total"));
        assert!(contains_money("1 dollar"));
        assert!(contains_money("2,500 pounds sterling"));
        assert!(contains_money("30 euros"));
        assert!(contains_money("1,000.50 Euros"));
    }

    #[test]
    fn test_contains_money_symbol_prefixes() {
        assert!(contains_money("£12"));
        assert!(contains_money("€9.99 per month"));
        assert!(contains_money("£1,234.56 fine"));
    }

    #[test]
    fn test_contains_money_rejects_plain_text() {
        assert!(!contains_money("no amount here"));
        assert!(!contains_money(""));
        assert!(!contains_money("dollars without a number"));
        assert!(!contains_money("the 100 metre sprint"));
    }

    #[test]
    fn test_count_occurrences_case_insensitive() {
        assert_eq!(count_occurrences("Money Money", "money"), 2);
        assert_eq!(count_occurrences("MONEY talks", "money"), 1);
        assert_eq!(count_occurrences("nothing relevant", "money"), 0);
    }

    #[test]
    fn test_count_occurrences_is_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
    }

    #[test]
    fn test_count_occurrences_empty_needle() {
        assert_eq!(count_occurrences("anything", ""), 0);
    }

    #[test]
    fn test_sanitize_filename_reserved_characters() {
        assert_eq!(sanitize_filename("A:B/C\"D"), "A_B_C_D");
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("already_clean-name"), "already_clean-name");
    }
}
