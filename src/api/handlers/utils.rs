//! Small helpers for principal validation and recovery link building.

use regex::Regex;

/// Normalize an email for token issuance and lookups.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Minimum-strength policy for a replacement secret.
pub(super) fn strong_secret(secret: &str, min_length: usize) -> bool {
    secret.chars().count() >= min_length
}

/// Build the recovery link included in outbound notifications.
pub(super) fn build_reset_link(base_url: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/reset?token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn strong_secret_counts_characters_not_bytes() {
        assert!(strong_secret("abcdefghijkl", 12));
        assert!(!strong_secret("short", 12));
        assert!(strong_secret("áááááááá", 8));
    }

    #[test]
    fn build_reset_link_trims_trailing_slash() {
        let link = build_reset_link("https://portal.example.com/", "token");
        assert_eq!(link, "https://portal.example.com/reset?token=token");
    }
}
