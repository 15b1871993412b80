//! GraphQL documents sent to the API, plus the response shapes they decode into.

use crate::model::{ContributionsCollection, PullRequest};
use serde::{Deserialize, Serialize};

pub const ACCOUNT_QUERY: &str = r#"
query AccountInfo($login: String!) {
  user(login: $login) {
    createdAt
    name
  }
}
"#;

pub const CONTRIBUTIONS_QUERY: &str = r#"
query Contributions($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      totalCommitContributions
      totalIssueContributions
      totalPullRequestContributions
      totalPullRequestReviewContributions
      totalRepositoryContributions
      restrictedContributionsCount
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}
"#;

pub const PULL_REQUESTS_QUERY: &str = r#"
query PullRequests($login: String!, $after: String) {
  user(login: $login) {
    pullRequests(first: 100, after: $after, orderBy: {field: CREATED_AT, direction: DESC}) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        title
        number
        url
        createdAt
        updatedAt
        mergedAt
        closedAt
        state
        additions
        deletions
        repository {
          name
          nameWithOwner
          isPrivate
        }
      }
      totalCount
    }
  }
}
"#;

#[derive(Debug, Serialize)]
pub struct LoginVars<'a> {
    pub login: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WindowVars<'a> {
    pub login: &'a str,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct PageVars<'a> {
    pub login: &'a str,
    pub after: Option<&'a str>,
}

/// `data` of every query: the `user` field is null for unknown logins.
#[derive(Debug, Deserialize)]
pub struct UserData<T> {
    pub user: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionUser {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestUser {
    pub pull_requests: PullRequestPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestPage {
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes: Vec<PullRequest>,
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}
