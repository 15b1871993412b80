use super::queries::{
    CollectionUser, LoginVars, PageVars, PullRequestUser, UserData, WindowVars, ACCOUNT_QUERY,
    CONTRIBUTIONS_QUERY, PULL_REQUESTS_QUERY,
};
use crate::calendar::YearWindow;
use crate::error::{GhactError, Result};
use crate::model::{AccountInfo, ContributionsCollection, PullRequest};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// What to do with a pull request seen during pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    Keep,
    Skip,
    /// Drop this one and stop paging.
    Stop,
}

pub struct GitHubClient {
    http: Client,
    endpoint: String,
}

impl GitHubClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("bearer {token}"))
            .map_err(|e| GhactError::Other(format!("Token is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one GraphQL document. Non-2xx statuses and a non-empty `errors`
    /// array both become errors.
    pub fn query<V, T>(&self, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(endpoint = %self.endpoint, "graphql request");

        let body: GraphQlResponse<T> = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()?
            .error_for_status()?
            .json()?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(GhactError::Api(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| GhactError::Api("response contained no data".to_string()))
    }

    pub fn account(&self, login: &str) -> Result<AccountInfo> {
        let data: UserData<AccountInfo> = self.query(ACCOUNT_QUERY, LoginVars { login })?;
        data.user
            .ok_or_else(|| GhactError::UserNotFound(login.to_string()))
    }

    pub fn contributions(&self, login: &str, window: &YearWindow) -> Result<ContributionsCollection> {
        let vars = WindowVars {
            login,
            from: window.from_param(),
            to: window.to_param(),
        };
        let data: UserData<CollectionUser> = self.query(CONTRIBUTIONS_QUERY, vars)?;
        data.user
            .map(|u| u.contributions_collection)
            .ok_or_else(|| GhactError::UserNotFound(login.to_string()))
    }

    /// Page through the user's pull requests, newest first.
    ///
    /// `scan` decides per pull request whether to keep it or stop paging;
    /// `on_page` receives the running kept count and the API's total count.
    /// A failure on the first page is returned; a failure later on ends
    /// pagination with what was collected so far.
    pub fn pull_requests<S, P>(&self, login: &str, mut scan: S, mut on_page: P) -> Result<Vec<PullRequest>>
    where
        S: FnMut(&PullRequest) -> Scan,
        P: FnMut(usize, u64),
    {
        let mut kept = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let result = self
                .query::<_, UserData<PullRequestUser>>(
                    PULL_REQUESTS_QUERY,
                    PageVars {
                        login,
                        after: cursor.as_deref(),
                    },
                )
                .and_then(|data| {
                    data.user
                        .ok_or_else(|| GhactError::UserNotFound(login.to_string()))
                });

            let page = match result {
                Ok(user) => user.pull_requests,
                Err(e) if pages > 0 => {
                    warn!(error = %e, fetched = kept.len(), "pull request pagination stopped early");
                    break;
                }
                Err(e) => return Err(e),
            };
            pages += 1;

            let mut stop = false;
            for pr in page.nodes {
                match scan(&pr) {
                    Scan::Keep => kept.push(pr),
                    Scan::Skip => {}
                    Scan::Stop => {
                        stop = true;
                        break;
                    }
                }
            }

            on_page(kept.len(), page.total_count);
            debug!(page = pages, kept = kept.len(), total = page.total_count, "pull request page");

            if stop || !page.page_info.has_next_page {
                break;
            }
            match page.page_info.end_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pr_node(number: u64, created: &str) -> serde_json::Value {
        json!({
            "title": format!("PR {number}"),
            "number": number,
            "url": format!("https://github.com/o/r/pull/{number}"),
            "createdAt": created,
            "updatedAt": created,
            "mergedAt": null,
            "closedAt": null,
            "state": "OPEN",
            "additions": 10,
            "deletions": 2,
            "repository": {"name": "r", "nameWithOwner": "o/r", "isPrivate": false}
        })
    }

    #[test]
    fn sends_bearer_token_and_decodes_account() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "bearer secret")
            .match_body(Matcher::PartialJson(json!({"variables": {"login": "octocat"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": {"user": {"createdAt": "2019-04-02T10:00:00Z", "name": "The Octocat"}}})
                    .to_string(),
            )
            .create();

        let client = GitHubClient::new(&format!("{}/graphql", server.url()), "secret").unwrap();
        let account = client.account("octocat").unwrap();

        mock.assert();
        assert_eq!(account.name.as_deref(), Some("The Octocat"));
        assert_eq!(account.created_at.to_rfc3339(), "2019-04-02T10:00:00+00:00");
    }

    #[test]
    fn graphql_errors_become_api_errors() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({"data": null, "errors": [{"message": "bad"}, {"message": "worse"}]}).to_string())
            .create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        let err = client.account("octocat").unwrap_err();
        match err {
            GhactError::Api(msg) => assert_eq!(msg, "bad; worse"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn null_user_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({"data": {"user": null}}).to_string())
            .create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        assert!(matches!(client.account("ghost"), Err(GhactError::UserNotFound(l)) if l == "ghost"));
    }

    #[test]
    fn http_failure_status_is_an_error() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/").with_status(401).create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        assert!(matches!(client.account("octocat"), Err(GhactError::Http(_))));
    }

    #[test]
    fn paginates_until_last_page() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": null}})))
            .with_status(200)
            .with_body(
                json!({"data": {"user": {"pullRequests": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "c1"},
                    "nodes": [pr_node(3, "2024-03-01T00:00:00Z"), pr_node(2, "2024-02-01T00:00:00Z")],
                    "totalCount": 3
                }}}})
                .to_string(),
            )
            .create();
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": "c1"}})))
            .with_status(200)
            .with_body(
                json!({"data": {"user": {"pullRequests": {
                    "pageInfo": {"hasNextPage": false, "endCursor": null},
                    "nodes": [pr_node(1, "2024-01-01T00:00:00Z")],
                    "totalCount": 3
                }}}})
                .to_string(),
            )
            .create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        let mut progress = Vec::new();
        let prs = client
            .pull_requests("octocat", |_| Scan::Keep, |n, total| progress.push((n, total)))
            .unwrap();

        let numbers: Vec<u64> = prs.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(progress, vec![(2, 3), (3, 3)]);
    }

    #[test]
    fn later_page_failure_keeps_earlier_pages() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": null}})))
            .with_status(200)
            .with_body(
                json!({"data": {"user": {"pullRequests": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "c1"},
                    "nodes": [pr_node(7, "2024-05-01T00:00:00Z")],
                    "totalCount": 2
                }}}})
                .to_string(),
            )
            .create();
        let second = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": "c1"}})))
            .with_status(502)
            .expect(1)
            .create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        let prs = client
            .pull_requests("octocat", |_| Scan::Keep, |_, _| {})
            .unwrap();

        second.assert();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 7);
    }

    #[test]
    fn scan_stop_ends_pagination() {
        let mut server = mockito::Server::new();
        let first = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                json!({"data": {"user": {"pullRequests": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "c1"},
                    "nodes": [pr_node(3, "2024-03-01T00:00:00Z"), pr_node(2, "2023-01-01T00:00:00Z"), pr_node(1, "2024-03-02T00:00:00Z")],
                    "totalCount": 10
                }}}})
                .to_string(),
            )
            .expect(1)
            .create();

        let client = GitHubClient::new(&server.url(), "t").unwrap();
        let prs = client
            .pull_requests(
                "octocat",
                |pr| if pr.number == 2 { Scan::Stop } else { Scan::Keep },
                |_, _| {},
            )
            .unwrap();

        first.assert();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 3);
    }
}
