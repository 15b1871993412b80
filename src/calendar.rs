//! Calendar arithmetic shared by the reports: query windows, ISO week to
//! month attribution, workday normalization and smoothing.

use crate::error::{GhactError, Result};
use crate::model::ContributionDay;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::AddAssign;

/// Timestamp format the GraphQL `DateTime` scalar is fed with.
pub const API_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

pub const TREND_WINDOW: usize = 6;

/// A query window that never spans more than one calendar year, which is
/// the longest range `contributionsCollection` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub year: i32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl YearWindow {
    pub fn full_year(year: i32) -> Result<Self> {
        Ok(Self {
            year,
            from: year_start(year)?,
            to: year_end(year)?,
        })
    }

    /// One window per year from account creation to `now`. The first window
    /// starts at the creation timestamp and the last one ends at `now`.
    pub fn lifetime(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Vec<Self>> {
        let created_at = truncate_seconds(created_at);
        let now = truncate_seconds(now);

        (created_at.year()..=now.year())
            .map(|year| {
                let from = if year == created_at.year() {
                    created_at
                } else {
                    year_start(year)?
                };
                let to = if year == now.year() { now } else { year_end(year)? };
                Ok(Self { year, from, to })
            })
            .collect()
    }

    /// Windows that end before the current calendar year can no longer change.
    pub fn is_settled(&self, now: DateTime<Utc>) -> bool {
        self.to.year() < now.year()
    }

    pub fn from_param(&self) -> String {
        self.from.format(API_TIMESTAMP).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(API_TIMESTAMP).to_string()
    }
}

fn year_start(year: i32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| GhactError::InvalidDate(format!("Year out of range: {year}")))
}

fn year_end(year: i32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| GhactError::InvalidDate(format!("Year out of range: {year}")))
}

fn truncate_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Short display label, e.g. `Mar 2024`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket<V> {
    pub month: MonthKey,
    pub total: V,
    /// Sum over ISO weeks of (days of that week falling in this month) / 7.
    pub week_fraction: f64,
    pub days: u32,
}

/// Group daily values by ISO week, split each week across the calendar months
/// it touches, and fold the pieces into per-month buckets sorted by month.
pub fn attribute_months<V, I>(days: I) -> Vec<MonthBucket<V>>
where
    V: Copy + Default + AddAssign,
    I: IntoIterator<Item = (NaiveDate, V)>,
{
    let mut weeks: BTreeMap<(i32, u32), BTreeMap<MonthKey, (u32, V)>> = BTreeMap::new();

    for (date, value) in days {
        let iso = date.iso_week();
        let slot = weeks
            .entry((iso.year(), iso.week()))
            .or_default()
            .entry(MonthKey::of(date))
            .or_insert((0, V::default()));
        slot.0 += 1;
        slot.1 += value;
    }

    let mut months: BTreeMap<MonthKey, MonthBucket<V>> = BTreeMap::new();
    for by_month in weeks.into_values() {
        for (month, (days, value)) in by_month {
            let bucket = months.entry(month).or_insert_with(|| MonthBucket {
                month,
                total: V::default(),
                week_fraction: 0.0,
                days: 0,
            });
            bucket.total += value;
            bucket.week_fraction += days as f64 / 7.0;
            bucket.days += days;
        }
    }

    months.into_values().collect()
}

/// Average per workday, given how many weeks a month spans.
pub fn per_workday(total: f64, week_fraction: f64, workdays_per_week: u32) -> f64 {
    let workdays = week_fraction * workdays_per_week as f64;
    if workdays > 0.0 {
        total / workdays
    } else {
        0.0
    }
}

/// Trailing moving average. Leading points average over the prefix seen so far.
/// Returns `None` when there are fewer values than the window.
pub fn moving_average(values: &[f64], window: usize) -> Option<Vec<f64>> {
    if window == 0 || values.len() < window {
        return None;
    }

    let smoothed = (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect();
    Some(smoothed)
}

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayTally {
    pub weekday: Weekday,
    pub total: u64,
    pub total_days: u32,
    pub active_days: u32,
}

impl WeekdayTally {
    pub fn avg_per_day(&self) -> f64 {
        if self.total_days == 0 {
            0.0
        } else {
            self.total as f64 / self.total_days as f64
        }
    }
}

/// Contributions per weekday. Zero-contribution days count towards
/// `total_days` so the average reflects every occurrence of the weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayBreakdown {
    pub weekdays: Vec<WeekdayTally>,
    pub active_dates: usize,
}

impl WeekdayBreakdown {
    pub fn from_days<'a, I>(days: I) -> Self
    where
        I: IntoIterator<Item = &'a ContributionDay>,
    {
        let mut weekdays: Vec<WeekdayTally> = WEEKDAYS
            .iter()
            .map(|&weekday| WeekdayTally {
                weekday,
                total: 0,
                total_days: 0,
                active_days: 0,
            })
            .collect();
        let mut active = BTreeSet::new();

        for day in days {
            let tally = &mut weekdays[day.date.weekday().num_days_from_monday() as usize];
            tally.total += day.contribution_count;
            tally.total_days += 1;
            if day.contribution_count > 0 {
                tally.active_days += 1;
                active.insert(day.date);
            }
        }

        Self {
            weekdays,
            active_dates: active.len(),
        }
    }
}
