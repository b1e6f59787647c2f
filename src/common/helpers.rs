// Helper functions for safe logging and timestamp handling

use chrono::{DateTime, NaiveDateTime, Utc};

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// use shortlist_api::common::helpers::safe_email_log;
/// assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            format!("{}***@{}", &parts[0][..1], parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks a staff username, keeping only its first character
pub fn safe_username_log(username: &str) -> String {
    match username.chars().next() {
        Some(first) if username.chars().count() > 2 => format!("{}***", first),
        _ => "***".to_string(),
    }
}

/// Parses the timestamp formats the backend hands out.
///
/// Accepts RFC 3339 (`2024-06-01T10:00:00.123+00:00`) as well as the
/// `YYYY-MM-DD HH:MM:SS` text SQLite's `datetime('now')` produces.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
