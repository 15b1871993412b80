use crate::calendar::{attribute_months, per_workday};
use crate::model::{CodeMetricsMonth, PullRequest};
use crate::util::{mean, tail};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineDelta {
    pub additions: u64,
    pub deletions: u64,
}

impl LineDelta {
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }
}

impl AddAssign for LineDelta {
    fn add_assign(&mut self, rhs: Self) {
        self.additions += rhs.additions;
        self.deletions += rhs.deletions;
    }
}

/// Lines added and deleted per UTC creation date.
pub fn daily_deltas(prs: &[PullRequest]) -> BTreeMap<NaiveDate, LineDelta> {
    let mut days: BTreeMap<NaiveDate, LineDelta> = BTreeMap::new();
    for pr in prs {
        *days.entry(pr.created_at.date_naive()).or_default() += LineDelta {
            additions: pr.additions,
            deletions: pr.deletions,
        };
    }
    days
}

/// Bucket pull request line counts by month. Every calendar day between
/// `start` and `end` counts towards the month's week fraction, so idle days
/// dilute the per-workday average the same way they do for contributions.
pub fn monthly_code_metrics(
    prs: &[PullRequest],
    start: NaiveDate,
    end: NaiveDate,
    workdays_per_week: u32,
) -> Vec<CodeMetricsMonth> {
    let deltas = daily_deltas(prs);
    let start = deltas.keys().next().map_or(start, |first| start.min(*first));
    let end = deltas.keys().next_back().map_or(end, |last| end.max(*last));

    let days = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, deltas.get(&d).copied().unwrap_or_default()));

    attribute_months(days)
        .into_iter()
        .map(|bucket| {
            let avg = |n: u64| per_workday(n as f64, bucket.week_fraction, workdays_per_week);
            CodeMetricsMonth {
                month: bucket.month.to_string(),
                label: bucket.month.label(),
                avg_additions_per_workday: avg(bucket.total.additions),
                avg_deletions_per_workday: avg(bucket.total.deletions),
                avg_total_per_workday: avg(bucket.total.total()),
                total_additions: bucket.total.additions,
                total_deletions: bucket.total.deletions,
                total_changes: bucket.total.total(),
                week_fraction: bucket.week_fraction,
            }
        })
        .collect()
}

pub fn active_months(months: &[CodeMetricsMonth]) -> Vec<&CodeMetricsMonth> {
    months.iter().filter(|m| m.avg_total_per_workday > 0.0).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub additions: f64,
    pub deletions: f64,
    pub total: f64,
}

impl Averages {
    fn over(months: &[&CodeMetricsMonth]) -> Self {
        let pick = |f: fn(&CodeMetricsMonth) -> f64| -> f64 {
            mean(&months.iter().map(|m| f(m)).collect::<Vec<_>>())
        };
        Self {
            additions: pick(|m| m.avg_additions_per_workday),
            deletions: pick(|m| m.avg_deletions_per_workday),
            total: pick(|m| m.avg_total_per_workday),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeMetricsSummary {
    pub total_additions: u64,
    pub total_deletions: u64,
    pub total_changes: u64,
    pub active_months: usize,
    pub overall: Averages,
    pub most_additions: (String, f64),
    pub most_deletions: (String, f64),
    pub most_total: (String, f64),
    pub recent: Averages,
}

fn first_max(months: &[CodeMetricsMonth], f: fn(&CodeMetricsMonth) -> f64) -> (String, f64) {
    let mut best = &months[0];
    for m in &months[1..] {
        if f(m) > f(best) {
            best = m;
        }
    }
    (best.label.clone(), f(best))
}

/// `None` when no month had any changed lines.
pub fn summarize(months: &[CodeMetricsMonth]) -> Option<CodeMetricsSummary> {
    let active = active_months(months);
    if active.is_empty() {
        return None;
    }

    Some(CodeMetricsSummary {
        total_additions: months.iter().map(|m| m.total_additions).sum(),
        total_deletions: months.iter().map(|m| m.total_deletions).sum(),
        total_changes: months.iter().map(|m| m.total_changes).sum(),
        active_months: active.len(),
        overall: Averages::over(&active),
        most_additions: first_max(months, |m| m.avg_additions_per_workday),
        most_deletions: first_max(months, |m| m.avg_deletions_per_workday),
        most_total: first_max(months, |m| m.avg_total_per_workday),
        recent: Averages::over(tail(&active, 12)),
    })
}
