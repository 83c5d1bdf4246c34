//! Cache module for persisting raw API responses to disk
//!
//! This module provides a fetcher that reads a dataset from a local cache file when
//! one exists and otherwise downloads it, stores the response body verbatim, and
//! parses it. Once written, a cache file is treated as an immutable snapshot: it is
//! never re-fetched or checked for staleness.

mod fetcher;

pub use fetcher::{parse_records, CachedFetcher, DataSource, FetchError};
