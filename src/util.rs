use crate::error::{GhactError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::Duration;

/// Format an integer with `,` thousands separators.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// Like [`thousands`] but always carries a sign.
pub fn signed_thousands(n: i64) -> String {
    if n < 0 {
        thousands(n)
    } else {
        format!("+{}", thousands(n))
    }
}

/// Percent change from `prev` to `curr`, or 0 when there is no base to compare against.
pub fn pct_change(curr: u64, prev: u64) -> f64 {
    if prev == 0 {
        0.0
    } else {
        (curr as f64 - prev as f64) / prev as f64 * 100.0
    }
}

/// Percent change rendered for the year-over-year table.
pub fn pct_cell(curr: u64, prev: u64) -> String {
    if prev == 0 {
        return if curr == 0 { "N/A".to_string() } else { "+∞".to_string() };
    }
    format!("{:+.1}%", pct_change(curr, prev))
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The last `n` items of a slice (or all of them when shorter).
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Parse a user-supplied point in time.
///
/// Accepts RFC3339, `YYYY-MM-DD` (midnight, or 23:59:59 when `end_of_day`),
/// and relative durations such as `90d`, `-2weeks` or `3 days ago`.
pub fn parse_date_expr(input: &str, now: DateTime<Utc>, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        if let Some(datetime) = time {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    if let Some(duration) = parse_natural_duration(input) {
        let delta = chrono::Duration::from_std(duration)
            .map_err(|_| GhactError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return now
            .checked_sub_signed(delta)
            .ok_or_else(|| GhactError::InvalidDate(format!("Duration overflow for '{input}'")));
    }

    Err(GhactError::InvalidDate(format!(
        "Invalid date '{input}'. Use YYYY-MM-DD, RFC3339 or a duration like '90d'"
    )))
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let input = input.strip_suffix(" ago").unwrap_or(&input);
    let input = input.strip_prefix('-').unwrap_or(input);
    let compact: String = input.split_whitespace().collect();
    humantime::parse_duration(&compact).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-45210), "-45,210");
        assert_eq!(signed_thousands(1500), "+1,500");
        assert_eq!(signed_thousands(-12), "-12");
        assert_eq!(signed_thousands(0), "+0");
    }

    #[test]
    fn pct_cell_handles_zero_base() {
        assert_eq!(pct_cell(0, 0), "N/A");
        assert_eq!(pct_cell(5, 0), "+∞");
        assert_eq!(pct_cell(150, 100), "+50.0%");
        assert_eq!(pct_cell(75, 100), "-25.0%");
        assert_eq!(pct_change(5, 0), 0.0);
    }

    #[test]
    fn tail_takes_last_items() {
        let v = [1, 2, 3, 4, 5];
        assert_eq!(tail(&v, 2), &[4, 5]);
        assert_eq!(tail(&v, 12), &v);
    }

    #[test]
    fn parses_date_forms() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();

        let start = parse_date_expr("2025-01-01", now, false).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let end = parse_date_expr("2025-01-31", now, true).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap());

        let rfc = parse_date_expr("2025-02-01T10:00:00+02:00", now, false).unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap());

        let rel = parse_date_expr("10d", now, false).unwrap();
        assert_eq!(rel, Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap());

        let ago = parse_date_expr("2 weeks ago", now, false).unwrap();
        assert_eq!(ago, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());

        assert!(parse_date_expr("next tuesday-ish", now, false).is_err());
    }
}
