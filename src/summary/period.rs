use crate::cli::SummaryArgs;
use crate::error::{GhactError, Result};
use crate::util::parse_date_expr;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Turn the period flags into a concrete UTC range ending at or before `now`.
pub fn resolve(args: &SummaryArgs, now: DateTime<Utc>) -> Result<Period> {
    let today = midnight(now);

    let period = if args.today {
        Period::new("Today", today, now)
    } else if args.yesterday {
        Period::new("Yesterday", today - Duration::days(1), today)
    } else if args.last_week {
        Period::new("Last 7 Days", now - Duration::days(7), now)
    } else if args.last_month {
        Period::new("Last 30 Days", now - Duration::days(30), now)
    } else if args.this_week {
        let since_monday = now.weekday().num_days_from_monday() as i64;
        Period::new("This Week", today - Duration::days(since_monday), now)
    } else if args.this_month {
        Period::new("This Month", today - Duration::days(now.day0() as i64), now)
    } else if args.last_year {
        Period::new("Last Year", now - Duration::days(365), now)
    } else {
        let (Some(start), Some(end)) = (args.start.as_deref(), args.end.as_deref()) else {
            return Err(GhactError::InvalidDate(
                "--custom requires both --start and --end dates".to_string(),
            ));
        };
        Period::new(
            format!("{start} to {end}"),
            parse_date_expr(start, now, false)?,
            parse_date_expr(end, now, true)?,
        )
    };

    if period.start > period.end {
        return Err(GhactError::InvalidDate(format!(
            "start {} is after end {}",
            period.start.format("%Y-%m-%d %H:%M"),
            period.end.format("%Y-%m-%d %H:%M")
        )));
    }

    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn args(flags: &[&str]) -> SummaryArgs {
        let mut argv = vec!["ghact", "-u", "octocat", "summary"];
        argv.extend_from_slice(flags);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Summary(args) => args,
            _ => unreachable!(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // Thursday
    fn now() -> DateTime<Utc> {
        at(2024, 3, 14, 15, 30)
    }

    #[test]
    fn relative_periods() {
        let today = resolve(&args(&["--today"]), now()).unwrap();
        assert_eq!(today, Period::new("Today", at(2024, 3, 14, 0, 0), now()));

        let yesterday = resolve(&args(&["--yesterday"]), now()).unwrap();
        assert_eq!(yesterday.start, at(2024, 3, 13, 0, 0));
        assert_eq!(yesterday.end, at(2024, 3, 14, 0, 0));

        let week = resolve(&args(&["--last-week"]), now()).unwrap();
        assert_eq!(week.name, "Last 7 Days");
        assert_eq!(week.start, at(2024, 3, 7, 15, 30));

        let year = resolve(&args(&["--last-year"]), now()).unwrap();
        assert_eq!(year.start, at(2023, 3, 15, 15, 30));
    }

    #[test]
    fn calendar_anchored_periods() {
        let this_week = resolve(&args(&["--this-week"]), now()).unwrap();
        assert_eq!(this_week.start, at(2024, 3, 11, 0, 0));
        assert_eq!(this_week.end, now());

        let this_month = resolve(&args(&["--this-month"]), now()).unwrap();
        assert_eq!(this_month.start, at(2024, 3, 1, 0, 0));
        assert_eq!(this_month.name, "This Month");
    }

    #[test]
    fn custom_range_snaps_end_to_end_of_day() {
        let period = resolve(&args(&["--custom", "--start", "2024-01-01", "--end", "2024-01-31"]), now()).unwrap();
        assert_eq!(period.name, "2024-01-01 to 2024-01-31");
        assert_eq!(period.start, at(2024, 1, 1, 0, 0));
        assert_eq!(period.end, Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
        assert!(period.contains(&at(2024, 1, 31, 23, 0)));
        assert!(!period.contains(&at(2024, 2, 1, 0, 0)));
    }

    #[test]
    fn custom_range_errors() {
        let missing = resolve(&args(&["--custom", "--start", "2024-01-01"]), now());
        assert!(matches!(missing, Err(GhactError::InvalidDate(_))));

        let reversed = resolve(&args(&["--custom", "--start", "2024-02-01", "--end", "2024-01-01"]), now());
        assert!(matches!(reversed, Err(GhactError::InvalidDate(_))));

        let garbage = resolve(&args(&["--custom", "--start", "soon", "--end", "2024-01-01"]), now());
        assert!(garbage.is_err());
    }

    #[test]
    fn custom_range_accepts_relative_start() {
        let period = resolve(&args(&["--custom", "--start", "2 days ago", "--end", "2024-03-14"]), now()).unwrap();
        assert_eq!(period.start, at(2024, 3, 12, 15, 30));
    }
}
