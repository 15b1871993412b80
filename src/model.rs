use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
}

impl AccountInfo {
    pub fn display_name<'a>(&'a self, login: &'a str) -> &'a str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(login)
    }

    /// The `Account:` / `Member since:` lines that open the text reports.
    pub fn header(&self, login: &str) -> [String; 2] {
        [
            format!("Account: {} (@{login})", self.display_name(login)),
            format!("Member since: {}", self.created_at.format("%B %d, %Y")),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    #[serde(default)]
    pub total_commit_contributions: u64,
    #[serde(default)]
    pub total_issue_contributions: u64,
    #[serde(default)]
    pub total_pull_request_contributions: u64,
    #[serde(default)]
    pub total_pull_request_review_contributions: u64,
    #[serde(default)]
    pub total_repository_contributions: u64,
    #[serde(default)]
    pub restricted_contributions_count: u64,
    pub contribution_calendar: ContributionCalendar,
}

impl ContributionsCollection {
    /// Every calendar day in the collection, in API order.
    pub fn days(&self) -> impl Iterator<Item = &ContributionDay> + '_ {
        self.contribution_calendar
            .weeks
            .iter()
            .flat_map(|w| w.contribution_days.iter())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub contribution_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
    #[serde(other)]
    Unknown,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "OPEN",
            PullRequestState::Closed => "CLOSED",
            PullRequestState::Merged => "MERGED",
            PullRequestState::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    #[serde(default)]
    pub name: String,
    pub name_with_owner: String,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub title: String,
    pub number: u64,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub state: PullRequestState,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    pub repository: RepositoryRef,
}

/// One row of the lifetime report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStats {
    pub year: i32,
    pub total: u64,
    pub commits: u64,
    pub issues: u64,
    pub prs: u64,
    pub reviews: u64,
    pub repos: u64,
    pub restricted: u64,
}

impl YearStats {
    pub fn from_collection(year: i32, collection: &ContributionsCollection) -> Self {
        Self {
            year,
            total: collection.contribution_calendar.total_contributions,
            commits: collection.total_commit_contributions,
            issues: collection.total_issue_contributions,
            prs: collection.total_pull_request_contributions,
            reviews: collection.total_pull_request_review_contributions,
            repos: collection.total_repository_contributions,
            restricted: collection.restricted_contributions_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekdayRow {
    pub weekday: String,
    pub total: u64,
    pub active_days: u32,
    pub total_days: u32,
    pub avg_per_day: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_contributions: u64,
    pub commits: u64,
    pub issues: u64,
    pub pull_requests: u64,
    pub reviews: u64,
    pub days_with_contributions: usize,
    pub weekdays: Vec<WeekdayRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub user: String,
    pub years: Vec<YearSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifetimeOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub user: String,
    pub account_created: DateTime<Utc>,
    pub years: Vec<YearStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityMonth {
    pub month: String,
    pub label: String,
    pub average_per_workday: f64,
    pub total_contributions: u64,
    pub week_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductivityExport {
    pub version: u32,
    pub user: String,
    pub generated: DateTime<Utc>,
    pub workdays_per_week: u32,
    pub monthly_data: Vec<ProductivityMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMetricsMonth {
    pub month: String,
    pub label: String,
    pub avg_additions_per_workday: f64,
    pub avg_deletions_per_workday: f64,
    pub avg_total_per_workday: f64,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub total_changes: u64,
    pub week_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMetricsExport {
    pub version: u32,
    pub user: String,
    pub generated: DateTime<Utc>,
    pub workdays_per_week: u32,
    pub total_prs: usize,
    pub monthly_data: Vec<CodeMetricsMonth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStatistics {
    pub total_prs: usize,
    pub merged: usize,
    pub open: usize,
    pub closed: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub total_changes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkEntry {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub repository: String,
    pub state: PullRequestState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    pub is_private: bool,
}

impl From<&PullRequest> for WorkEntry {
    fn from(pr: &PullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.clone(),
            url: pr.url.clone(),
            repository: pr.repository.name_with_owner.clone(),
            state: pr.state,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            merged_at: pr.merged_at,
            additions: pr.additions,
            deletions: pr.deletions,
            is_private: pr.repository.is_private,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSummaryOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub user: String,
    pub period: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub statistics: WorkStatistics,
    pub pull_requests: Vec<WorkEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn account_header_falls_back_to_login() {
        let account = AccountInfo {
            created_at: Utc.with_ymd_and_hms(2019, 4, 2, 10, 0, 0).unwrap(),
            name: Some(String::new()),
        };
        assert_eq!(
            account.header("octocat"),
            ["Account: octocat (@octocat)".to_string(), "Member since: April 02, 2019".to_string()]
        );
    }
}
