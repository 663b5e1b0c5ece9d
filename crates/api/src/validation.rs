//! Request field validation helpers

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Loose email shape check: one `@`, a dot in the domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Usernames are 3-50 characters of letters, digits, underscores, hyphens.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=50).contains(&len)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Trim a value, returning `None` when nothing is left.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.io"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("nodot@domain"));
    }

    #[test]
    fn username_charset_and_length() {
        assert!(is_valid_username("ada"));
        assert!(is_valid_username("Ada_Lovelace-1815"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username(&"x".repeat(51)));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("caf\u{e9}"));
    }

    #[test]
    fn non_blank_trims_and_filters() {
        assert_eq!(non_blank("  espresso  "), Some("espresso".to_string()));
        assert_eq!(non_blank("   "), None);
        assert_eq!(non_blank(""), None);
    }
}
