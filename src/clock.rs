//! Duration formatting and date/time input parsing.
//!
//! Durations are decomposed with plain 24h/60m/60s/1000ms division, not
//! calendar arithmetic. Input parsing accepts a few natural-language forms
//! alongside ISO-style date/times, all interpreted in the local time zone.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A duration split into display fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub millis: i64,
}

/// Decompose a duration in milliseconds. Negative inputs clamp to zero.
pub fn split_duration(duration_ms: i64) -> DurationParts {
    let mut rest = duration_ms.max(0);
    let millis = rest % 1000;
    rest /= 1000;
    let seconds = rest % 60;
    rest /= 60;
    let minutes = rest % 60;
    rest /= 60;
    let hours = rest % 24;
    rest /= 24;
    DurationParts {
        days: rest,
        hours,
        minutes,
        seconds,
        millis,
    }
}

impl DurationParts {
    /// `HH:MM:SS` zero-padded, prefixed with an unpadded day count only when
    /// days > 0. Millis are excluded so renderers can de-emphasize them.
    pub fn clock_string(&self) -> String {
        if self.days > 0 {
            format!(
                "{}:{:02}:{:02}:{:02}",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else {
            format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        }
    }

    /// The trailing `:mmm` millisecond segment.
    pub fn millis_string(&self) -> String {
        format!(":{:03}", self.millis)
    }
}

/// Format a duration as `HH:MM:SS:mmm`, with a `D:` prefix when days > 0.
pub fn format_duration(duration_ms: i64) -> String {
    let parts = split_duration(duration_ms);
    format!("{}{}", parts.clock_string(), parts.millis_string())
}

/// Parse user date/time input into epoch milliseconds, local time zone.
///
/// Supports:
/// - "now", "today", "tomorrow"
/// - "in 30s", "in 5m", "in 2h", "in 3d"
/// - "YYYY-MM-DDTHH:MM[:SS]" and "YYYY-MM-DD HH:MM"
/// - bare "YYYY-MM-DD" (local midnight)
pub fn parse_when(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let now = Local::now();
    match s.to_lowercase().as_str() {
        "now" => return Some(now.timestamp_millis()),
        "today" => return local_midnight(now.date_naive()),
        "tomorrow" => return local_midnight(now.date_naive() + Duration::days(1)),
        _ => {}
    }

    // "in X" patterns
    let lower = s.to_lowercase();
    if let Some(rest) = lower.strip_prefix("in ") {
        let offset = |n: i64, unit: &str| match unit {
            "s" => Some(Duration::seconds(n)),
            "m" => Some(Duration::minutes(n)),
            "h" => Some(Duration::hours(n)),
            "d" => Some(Duration::days(n)),
            _ => None,
        };
        for unit in ["s", "m", "h", "d"] {
            if let Some(n) = rest.strip_suffix(unit) {
                if let Ok(n) = n.trim().parse::<i64>() {
                    return Some((now + offset(n, unit)?).timestamp_millis());
                }
            }
        }
        return None;
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_millis(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return local_midnight(date);
    }
    None
}

/// Local-time `YYYY-MM-DDTHH:MM` string, used to prefill the edit form.
pub fn to_input_string(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M").to_string(),
        None => String::new(),
    }
}

/// Local-time display string for table columns.
pub fn format_local(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn local_midnight(date: NaiveDate) -> Option<i64> {
    local_millis(date.and_hms_opt(0, 0, 0)?)
}

fn local_millis(naive: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_zero_duration() {
        assert_eq!(format_duration(0), "00:00:00:000");
    }

    #[test]
    fn format_with_day_prefix() {
        // 1 day, 1 hour, 1 minute, 1 second, 1 ms
        assert_eq!(format_duration(90_061_001), "1:01:01:01:001");
    }

    #[test]
    fn day_prefix_only_when_days_present() {
        let just_under_a_day = 1000 * 60 * 60 * 24 - 1;
        assert_eq!(format_duration(just_under_a_day), "23:59:59:999");
        assert_eq!(format_duration(just_under_a_day + 1), "1:00:00:00:000");
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        assert_eq!(format_duration(-5000), "00:00:00:000");
    }

    #[test]
    fn millis_are_split_for_renderers() {
        let parts = split_duration(3_723_456);
        assert_eq!(parts.clock_string(), "01:02:03");
        assert_eq!(parts.millis_string(), ":456");
    }

    #[test]
    fn parse_iso_datetime_round_trips_through_input_string() {
        let ms = parse_when("2024-03-05T14:30").unwrap();
        assert_eq!(to_input_string(ms), "2024-03-05T14:30");
        assert_eq!(parse_when("2024-03-05 14:30"), Some(ms));
        assert_eq!(parse_when("2024-03-05T14:30:00"), Some(ms));
    }

    #[test]
    fn parse_bare_date_is_local_midnight() {
        let ms = parse_when("2024-03-05").unwrap();
        assert_eq!(to_input_string(ms), "2024-03-05T00:00");
    }

    #[test]
    fn parse_relative_offsets() {
        let before = now_ms();
        let ms = parse_when("in 2h").unwrap();
        let after = now_ms();
        let two_hours = 1000 * 60 * 60 * 2;
        assert!(ms >= before + two_hours && ms <= after + two_hours);
        assert!(parse_when("in 10x").is_none());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_when("").is_none());
        assert!(parse_when("not a date").is_none());
        assert!(parse_when("2024-13-40").is_none());
    }

    #[test]
    fn parse_now_is_current() {
        let before = now_ms();
        let ms = parse_when("now").unwrap();
        assert!(ms >= before && ms <= now_ms());
    }
}
