use crate::calendar::{attribute_months, per_workday};
use crate::model::{ContributionsCollection, ProductivityMonth};
use crate::util::{mean, tail};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Contribution count per calendar date across every fetched window.
/// A date reported twice keeps its latest count.
pub fn collect_days<'a, I>(collections: I) -> BTreeMap<NaiveDate, u64>
where
    I: IntoIterator<Item = &'a ContributionsCollection>,
{
    collections
        .into_iter()
        .flat_map(|c| c.days())
        .map(|d| (d.date, d.contribution_count))
        .collect()
}

pub fn monthly_productivity(days: &BTreeMap<NaiveDate, u64>, workdays_per_week: u32) -> Vec<ProductivityMonth> {
    attribute_months(days.iter().map(|(date, count)| (*date, *count)))
        .into_iter()
        .map(|bucket| ProductivityMonth {
            month: bucket.month.to_string(),
            label: bucket.month.label(),
            average_per_workday: per_workday(bucket.total as f64, bucket.week_fraction, workdays_per_week),
            total_contributions: bucket.total,
            week_fraction: bucket.week_fraction,
        })
        .collect()
}

pub fn active_months(months: &[ProductivityMonth]) -> Vec<&ProductivityMonth> {
    months.iter().filter(|m| m.average_per_workday > 0.0).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductivitySummary {
    pub months: usize,
    pub overall_avg: f64,
    pub best: (String, f64),
    pub worst: (String, f64),
    /// Mean of the last 12 months, idle months included.
    pub recent_avg: f64,
}

/// Headline figures; `None` when no month had any activity.
pub fn summarize(months: &[ProductivityMonth]) -> Option<ProductivitySummary> {
    let active = active_months(months);
    if active.is_empty() {
        return None;
    }

    let averages: Vec<f64> = active.iter().map(|m| m.average_per_workday).collect();

    let mut best = &months[0];
    for m in &months[1..] {
        if m.average_per_workday > best.average_per_workday {
            best = m;
        }
    }
    let mut worst = active[0];
    for m in &active[1..] {
        if m.average_per_workday < worst.average_per_workday {
            worst = m;
        }
    }

    let recent: Vec<f64> = tail(months, 12).iter().map(|m| m.average_per_workday).collect();

    Some(ProductivitySummary {
        months: months.len(),
        overall_avg: mean(&averages),
        best: (best.label.clone(), best.average_per_workday),
        worst: (worst.label.clone(), worst.average_per_workday),
        recent_avg: mean(&recent),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    /// Mean over the last 12 active months.
    pub recent_avg: f64,
    /// Mean over the active months before those, with the change against it.
    pub historical: Option<(f64, f64)>,
    /// Last 3 months against the 3 before them, in percent.
    pub short_term: Option<f64>,
}

impl Trend {
    pub fn from_averages(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let recent_avg = mean(tail(values, 12));
        let older = &values[..values.len().saturating_sub(12)];
        let older_avg = mean(older);
        let historical = (older_avg > 0.0).then(|| (older_avg, (recent_avg - older_avg) / older_avg * 100.0));

        let short_term = if values.len() >= 6 {
            let n = values.len();
            let last_3 = mean(&values[n - 3..]);
            let prev_3 = mean(&values[n - 6..n - 3]);
            (prev_3 > 0.0).then(|| (last_3 - prev_3) / prev_3 * 100.0)
        } else {
            None
        };

        Some(Self {
            recent_avg,
            historical,
            short_term,
        })
    }
}

pub fn trend_marker(change: f64) -> &'static str {
    if change > 0.0 {
        "📈"
    } else if change < 0.0 {
        "📉"
    } else {
        "➡️"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalendarWeek, ContributionCalendar, ContributionDay};
    use pretty_assertions::assert_eq;

    fn month(label: &str, avg: f64) -> ProductivityMonth {
        ProductivityMonth {
            month: label.to_string(),
            label: label.to_string(),
            average_per_workday: avg,
            total_contributions: 0,
            week_fraction: 4.0,
        }
    }

    #[test]
    fn collects_and_buckets_days() {
        let collection = ContributionsCollection {
            contribution_calendar: ContributionCalendar {
                total_contributions: 35,
                weeks: vec![CalendarWeek {
                    contribution_days: (1..=7)
                        .map(|d| ContributionDay {
                            date: NaiveDate::from_ymd_opt(2024, 7, d).unwrap(),
                            contribution_count: 5,
                        })
                        .collect(),
                }],
            },
            ..Default::default()
        };

        let days = collect_days([&collection, &collection]);
        assert_eq!(days.len(), 7);

        let months = monthly_productivity(&days, 5);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "2024-07");
        assert_eq!(months[0].label, "Jul 2024");
        assert_eq!(months[0].total_contributions, 35);
        assert!((months[0].week_fraction - 1.0).abs() < 1e-9);
        assert!((months[0].average_per_workday - 7.0).abs() < 1e-9);
    }

    #[test]
    fn summary_uses_active_months_for_average() {
        let months = vec![month("A", 0.0), month("B", 4.0), month("C", 2.0), month("D", 4.0)];
        let summary = summarize(&months).unwrap();
        assert_eq!(summary.months, 4);
        assert!((summary.overall_avg - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.best, ("B".to_string(), 4.0));
        assert_eq!(summary.worst, ("C".to_string(), 2.0));
        assert!((summary.recent_avg - 2.5).abs() < 1e-9);

        assert!(summarize(&[month("A", 0.0)]).is_none());
    }

    #[test]
    fn trend_compares_recent_with_history() {
        let mut values = vec![1.0; 12];
        values.extend(vec![2.0; 12]);
        let trend = Trend::from_averages(&values).unwrap();
        assert_eq!(trend.recent_avg, 2.0);
        assert_eq!(trend.historical, Some((1.0, 100.0)));
        assert_eq!(trend.short_term, Some(0.0));
        assert_eq!(trend_marker(0.0), "➡️");

        let short = Trend::from_averages(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]).unwrap();
        assert_eq!(short.historical, None);
        assert_eq!(short.short_term, Some(100.0));
        assert_eq!(trend_marker(100.0), "📈");

        let tiny = Trend::from_averages(&[3.0, 4.0]).unwrap();
        assert_eq!(tiny.short_term, None);
        assert!(Trend::from_averages(&[]).is_none());
    }
}
