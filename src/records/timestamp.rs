//! Server timestamp parsing against the fixed pattern list the backend has
//! historically emitted.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Patterns with a literal `Z` suffix, interpreted as UTC.
const UTC_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.3fZ", "%Y-%m-%dT%H:%M:%SZ"];

/// Patterns carrying an explicit offset.
const OFFSET_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.3f%:z", "%Y-%m-%dT%H:%M:%S%:z"];

/// Try each pattern in order and take the first that parses. Unparseable
/// input yields `None` rather than an error.
pub fn parse_server_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for pattern in UTC_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    for pattern in OFFSET_PATTERNS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, pattern) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_utc_with_milliseconds() {
        let parsed = parse_server_time("2025-08-04T01:30:15.250Z").unwrap();
        assert_eq!(parsed.hour(), 1);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn parses_utc_without_milliseconds() {
        assert!(parse_server_time("2025-08-04T01:30:15Z").is_some());
    }

    #[test]
    fn offset_forms_convert_to_utc() {
        let with_ms = parse_server_time("2025-08-04T08:30:15.000+07:00").unwrap();
        let without_ms = parse_server_time("2025-08-04T08:30:15+07:00").unwrap();
        assert_eq!(with_ms.hour(), 1);
        assert_eq!(without_ms, with_ms);
    }

    #[test]
    fn garbage_and_empty_yield_none() {
        assert!(parse_server_time("yesterday at noon").is_none());
        assert!(parse_server_time("").is_none());
        assert!(parse_server_time("2025-08-04").is_none());
    }
}
