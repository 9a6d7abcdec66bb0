//! Shared utility functions used across multiple modules.

use chrono::{DateTime, Utc};

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Unwrap a timestamp, mapping a missing value to the earliest representable instant.
pub fn timestamp_or_earliest(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Latest of the given timestamps, ignoring missing values.
pub fn latest_timestamp<I>(values: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    values.into_iter().flatten().max()
}

/// Format a timestamp for terminal output, keeping sub-second precision.
pub fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" temp_1 ".to_string())),
            Some("temp_1".to_string())
        );
    }

    #[test]
    fn missing_timestamp_sorts_before_any_real_one() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert!(timestamp_or_earliest(None) < epoch);
        assert_eq!(timestamp_or_earliest(Some(epoch)), epoch);
    }

    #[test]
    fn latest_timestamp_skips_missing_values() {
        let early = Utc.timestamp_opt(10, 0).unwrap();
        let late = Utc.timestamp_opt(20, 0).unwrap();
        assert_eq!(latest_timestamp([Some(early), None, Some(late)]), Some(late));
        assert_eq!(latest_timestamp([None, None]), None);
    }

    #[test]
    fn format_timestamp_keeps_milliseconds() {
        let value = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            format_timestamp(Some(value)),
            "2023-11-14 22:13:20.123 UTC"
        );
        assert_eq!(format_timestamp(None), "-");
    }
}
