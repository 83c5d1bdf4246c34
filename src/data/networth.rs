//! Federal Reserve Distributional Financial Accounts client
//!
//! Fetches the net-worth levels CSV export, one row per wealth percentile
//! bracket and quarter.

use super::NetWorthPoint;
use crate::cache::{CachedFetcher, DataSource, FetchError};
use std::path::Path;
use thiserror::Error;

/// CSV export of net-worth levels by wealth percentile
const NET_WORTH_LEVELS_URL: &str =
    "https://www.federalreserve.gov/releases/z1/dataviz/download/dfa-networth-levels.csv";

/// Errors that can occur when fetching net-worth levels
#[derive(Debug, Error)]
pub enum NetWorthError {
    /// Fetching or parsing the CSV failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Client for fetching net-worth levels from the Federal Reserve
#[derive(Debug, Clone)]
pub struct NetWorthClient {
    fetcher: CachedFetcher,
    url: String,
}

impl Default for NetWorthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NetWorthClient {
    /// Creates a new NetWorthClient against the public CSV export
    pub fn new() -> Self {
        Self::with_fetcher(CachedFetcher::new())
    }

    /// Creates a new NetWorthClient sharing an existing fetcher
    pub fn with_fetcher(fetcher: CachedFetcher) -> Self {
        Self {
            fetcher,
            url: NET_WORTH_LEVELS_URL.to_string(),
        }
    }

    /// Creates a new NetWorthClient with a custom URL (for testing)
    #[cfg(test)]
    pub fn with_url(url: String) -> Self {
        Self {
            fetcher: CachedFetcher::new(),
            url,
        }
    }

    /// The request sent on a cache miss
    pub fn source(&self) -> DataSource {
        DataSource::new(self.url.as_str())
    }

    /// Fetches every net-worth row exactly as published
    ///
    /// Rows are returned in file order; period labels are left unparsed.
    pub async fn fetch_net_worth(&self, cache_path: &Path) -> Result<Vec<NetWorthPoint>, NetWorthError> {
        Ok(self.fetcher.fetch_records(cache_path, &self.source()).await?)
    }
}
