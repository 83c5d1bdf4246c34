//! Cache-backed fetcher for CSV datasets
//!
//! Provides a `CachedFetcher` that returns the body of a remote CSV dataset, reading
//! it from a local file when present and downloading it (then persisting the exact
//! response bytes) when not.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when fetching a dataset
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service answered with a non-success status
    #[error("Remote fetch of {url} failed with HTTP status {status}")]
    RemoteStatus { url: String, status: u16 },

    /// Reading or writing the cache file failed
    #[error("Cache file {path} could not be accessed: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The body could not be parsed as CSV records
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Describes where a dataset lives on the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    /// Endpoint URL, without query string
    pub url: String,
    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl DataSource {
    /// Creates a source for a plain GET of `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Adds a query parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Adds a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Fetches datasets through a write-once file cache
///
/// A cache file, once present, is trusted unconditionally: no network call is made
/// and neither the age nor the contents are validated.
#[derive(Debug, Clone, Default)]
pub struct CachedFetcher {
    /// HTTP client for making requests
    http_client: Client,
}

impl CachedFetcher {
    /// Creates a new CachedFetcher with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CachedFetcher with a custom HTTP client
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Returns the raw dataset body, from the cache file or the network
    ///
    /// # Arguments
    /// * `cache_path` - File holding (or about to hold) the cached body
    /// * `source` - Where to download the body from on a cache miss
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The exact bytes of the cached file or HTTP response
    /// * `Err(FetchError::RemoteStatus)` - The server answered with a failure status;
    ///   nothing is written to the cache
    pub async fn fetch_raw(&self, cache_path: &Path, source: &DataSource) -> Result<Vec<u8>, FetchError> {
        if cache_path.is_file() {
            debug!(path = %cache_path.display(), "using cached dataset");
            return fs::read(cache_path).map_err(|source| FetchError::Cache {
                path: cache_path.to_path_buf(),
                source,
            });
        }

        info!("Downloading {} => {}", source.url, cache_path.display());

        let mut request = self.http_client.get(&source.url);
        if !source.query.is_empty() {
            request = request.query(&source.query);
        }
        for (name, value) in &source.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RemoteStatus {
                url: source.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?.to_vec();
        write_cache_file(cache_path, &body)?;
        debug!(path = %cache_path.display(), bytes = body.len(), "cached dataset");

        Ok(body)
    }

    /// Returns the dataset parsed into CSV records, from the cache file or the network
    ///
    /// The cached file and a fresh response body are parsed identically.
    pub async fn fetch_records<T: DeserializeOwned>(
        &self,
        cache_path: &Path,
        source: &DataSource,
    ) -> Result<Vec<T>, FetchError> {
        let body = self.fetch_raw(cache_path, source).await?;
        Ok(parse_records(&body)?)
    }
}

/// Parses a headed CSV body into records, matching columns by header name
pub fn parse_records<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, csv::Error> {
    csv::Reader::from_reader(body).deserialize().collect()
}

/// Writes `body` to `path`, creating parent directories as needed
fn write_cache_file(path: &Path, body: &[u8]) -> Result<(), FetchError> {
    let to_cache_error = |source| FetchError::Cache {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_cache_error)?;
    }
    fs::write(path, body).map_err(to_cache_error)
}
