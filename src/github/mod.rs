pub mod client;
pub mod queries;

pub use client::{GitHubClient, GraphQlError, GraphQlRequest, GraphQlResponse, Scan, DEFAULT_ENDPOINT};

use crate::cache::Cache;
use crate::calendar::YearWindow;
use crate::error::Result;
use crate::model::ContributionsCollection;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// The API client plus the optional response cache in front of
/// `contributionsCollection`.
pub struct ContributionSource {
    client: GitHubClient,
    cache: Option<Cache>,
    now: DateTime<Utc>,
}

impl ContributionSource {
    pub fn new(client: GitHubClient, cache: Option<Cache>) -> Self {
        Self {
            client,
            cache,
            now: Utc::now(),
        }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Contribution totals and calendar for one window. Settled windows are
    /// served from and written to the cache; a broken cache only costs a
    /// live request.
    pub fn collection(&self, login: &str, window: &YearWindow) -> Result<ContributionsCollection> {
        let cacheable = window.is_settled(self.now);

        if let (true, Some(cache)) = (cacheable, &self.cache) {
            match cache.get_collection(login, window) {
                Ok(Some(hit)) => {
                    debug!(login, year = window.year, "cache hit");
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "cache read failed"),
            }
        }

        let fresh = self.client.contributions(login, window)?;

        if let (true, Some(cache)) = (cacheable, &self.cache) {
            match cache.store_collection(login, window, &fresh) {
                Ok(()) => debug!(login, year = window.year, "cached collection"),
                Err(e) => warn!(error = %e, "cache write failed"),
            }
        }

        Ok(fresh)
    }
}
