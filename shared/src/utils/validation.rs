//! Email validation and normalization utilities
//!
//! Email is the identity key of the whole system, so every lookup and
//! every stored value must go through the same normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pragmatic email shape check. Full RFC 5322 validation is a
/// non-goal; the mailbox either receives the verification code or the
/// address is dead weight.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Normalize an email address for storage and lookup.
///
/// Trims surrounding whitespace and lowercases the whole address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check whether a (normalized) email address has a plausible shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Mask an email address for log output, keeping the first character of
/// the local part and the domain.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Extract the local part of an email address (everything before '@').
///
/// Used as the display-name fallback for social accounts whose provider
/// profile carries no name.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@test.org"), "bob@test.org");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.domain.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice@localhost"));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("alice@example.com"), "alice");
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
    }
}
