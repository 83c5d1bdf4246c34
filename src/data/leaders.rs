//! Wikidata SPARQL client for presidential terms
//!
//! Queries Wikidata for every holder of the office of President of the United States
//! together with the start and end of each term and the colors of their parties.

use super::LeaderTerm;
use crate::cache::{CachedFetcher, DataSource, FetchError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Wikidata query service endpoint
const WIKIDATA_SPARQL_URL: &str = "https://query.wikidata.org/sparql";

/// Timestamp format used by the query service CSV output
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Separator between party colors in the aggregated `partyColors` column
const COLOR_SEPARATOR: char = ';';

/// One row per distinct (president, start, end), colors aggregated, ordered by start
const PRESIDENTS_QUERY: &str = r#"
SELECT DISTINCT ?presidentLabel ?start ?end (GROUP_CONCAT(DISTINCT ?color ; separator = ";") as ?partyColors)
WHERE {
  ?stmt ps:P39 wd:Q11696 .
  ?president p:P39 ?stmt ;
             wdt:P31 wd:Q5 .
  ?stmt pq:P580 ?start .
  ?stmt pq:P582 ?end .
  ?president wdt:P102 ?party .
  ?party wdt:P465 ?color .
  SERVICE wikibase:label { bd:serviceParam wikibase:language "en". }
}
GROUP BY ?presidentLabel ?start ?end
ORDER BY ?start
"#;

/// Errors that can occur when fetching presidential terms
#[derive(Debug, Error)]
pub enum LeadersError {
    /// Fetching or parsing the CSV failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A row is missing a field or has a badly formatted one
    #[error("Malformed leader row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
}

/// Raw CSV row as returned by the query service
#[derive(Debug, Deserialize)]
struct LeaderRow {
    #[serde(rename = "presidentLabel")]
    name: Option<String>,
    start: Option<String>,
    end: Option<String>,
    #[serde(rename = "partyColors")]
    party_colors: Option<String>,
}

/// Client for fetching presidential terms from Wikidata
#[derive(Debug, Clone)]
pub struct LeadersClient {
    /// Cache-backed fetcher for the query response
    fetcher: CachedFetcher,
    /// SPARQL endpoint (allows override for testing)
    endpoint: String,
}

impl Default for LeadersClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadersClient {
    /// Creates a new LeadersClient against the public Wikidata endpoint
    pub fn new() -> Self {
        Self::with_fetcher(CachedFetcher::new())
    }

    /// Creates a new LeadersClient sharing an existing fetcher
    pub fn with_fetcher(fetcher: CachedFetcher) -> Self {
        Self {
            fetcher,
            endpoint: WIKIDATA_SPARQL_URL.to_string(),
        }
    }

    /// Creates a new LeadersClient with a custom endpoint (for testing)
    #[cfg(test)]
    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            fetcher: CachedFetcher::new(),
            endpoint,
        }
    }

    /// The request sent on a cache miss: the fixed query, answered as CSV
    pub fn source(&self) -> DataSource {
        DataSource::new(self.endpoint.as_str())
            .with_query("query", PRESIDENTS_QUERY)
            .with_header("Accept", "text/csv")
    }

    /// Fetches all presidential terms, ordered by start as the query service returns them
    ///
    /// # Arguments
    /// * `cache_path` - Cache file for the raw query response
    ///
    /// # Returns
    /// * `Ok(Vec<LeaderTerm>)` - One entry per distinct (name, start, end)
    /// * `Err(LeadersError::MalformedRow)` - A row lacks a field or has a bad timestamp
    /// * `Err(LeadersError::Fetch)` - The download or CSV parse failed
    pub async fn fetch_leader_terms(&self, cache_path: &Path) -> Result<Vec<LeaderTerm>, LeadersError> {
        let rows: Vec<LeaderRow> = self.fetcher.fetch_records(cache_path, &self.source()).await?;

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| parse_row(index + 1, row))
            .collect()
    }
}

/// Converts a raw row into a LeaderTerm
fn parse_row(row_number: usize, row: LeaderRow) -> Result<LeaderTerm, LeadersError> {
    let malformed = |reason: String| LeadersError::MalformedRow {
        row: row_number,
        reason,
    };

    let name = row.name.ok_or_else(|| malformed("missing presidentLabel".to_string()))?;
    let start = row
        .start
        .as_deref()
        .ok_or_else(|| malformed("missing start".to_string()))
        .and_then(|s| parse_timestamp(s).map_err(malformed))?;
    let end = row
        .end
        .as_deref()
        .ok_or_else(|| malformed("missing end".to_string()))
        .and_then(|s| parse_timestamp(s).map_err(malformed))?;

    if end < start {
        return Err(malformed(format!("term of {} ends before it starts", name)));
    }

    Ok(LeaderTerm {
        name,
        start,
        end,
        party_colors: split_party_colors(row.party_colors.as_deref().unwrap_or_default()),
    })
}

/// Parses a `YYYY-MM-DDThh:mm:ssZ` timestamp as UTC
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", value, e))
}

/// Splits the aggregated color column, keeping source order
fn split_party_colors(joined: &str) -> Vec<String> {
    joined
        .split(COLOR_SEPARATOR)
        .map(str::trim)
        .filter(|color| !color.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_server::TestServer;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const PRESIDENTS_CSV: &str = "presidentLabel,start,end,partyColors\r\n\
        George Washington,1789-04-30T00:00:00Z,1797-03-04T00:00:00Z,\r\n\
        Grover Cleveland,1885-03-04T00:00:00Z,1889-03-04T00:00:00Z,3333FF\r\n\
        Grover Cleveland,1893-03-04T00:00:00Z,1897-03-04T00:00:00Z,3333FF\r\n\
        Theodore Roosevelt,1901-09-14T00:00:00Z,1909-03-04T00:00:00Z,E81B23;FF8C00\r\n";

    fn write_cache(contents: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("usa-presidents.csv");
        fs::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    fn row(start: Option<&str>, end: Option<&str>) -> LeaderRow {
        LeaderRow {
            name: Some("Test".to_string()),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            party_colors: Some("AABBCC;112233".to_string()),
        }
    }

    #[tokio::test]
    async fn test_fetch_from_cache_parses_all_terms() {
        let (_temp_dir, path) = write_cache(PRESIDENTS_CSV);

        let terms = LeadersClient::new().fetch_leader_terms(&path).await.unwrap();

        assert_eq!(terms.len(), 4);
        assert_eq!(terms[0].name, "George Washington");
        assert_eq!(terms[0].start, Utc.with_ymd_and_hms(1789, 4, 30, 0, 0, 0).unwrap());
        assert!(terms[0].party_colors.is_empty());
        assert_eq!(terms[3].party_colors, vec!["E81B23", "FF8C00"]);
        assert_eq!(terms[3].band_color_hex().as_deref(), Some("#E81B23"));
    }

    #[tokio::test]
    async fn test_non_consecutive_terms_are_kept_separately() {
        let (_temp_dir, path) = write_cache(PRESIDENTS_CSV);

        let terms = LeadersClient::new().fetch_leader_terms(&path).await.unwrap();
        let cleveland: Vec<_> = terms.iter().filter(|t| t.name == "Grover Cleveland").collect();

        assert_eq!(cleveland.len(), 2);
        assert!(cleveland[0].end < cleveland[1].start);
    }

    #[tokio::test]
    async fn test_cold_fetch_sends_sparql_query_as_csv_request() {
        let server = TestServer::start(200, PRESIDENTS_CSV.as_bytes());
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("usa-presidents.csv");

        let client = LeadersClient::with_endpoint(format!("{}/sparql", server.base_url));
        let terms = client.fetch_leader_terms(&path).await.unwrap();

        assert_eq!(terms.len(), 4);
        let seen = server.seen();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].url.starts_with("/sparql?query="));
        assert!(seen[0]
            .headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("accept") && value == "text/csv"));
        assert_eq!(fs::read_to_string(&path).unwrap(), PRESIDENTS_CSV);
    }

    #[tokio::test]
    async fn test_bad_timestamp_in_cache_is_malformed_row() {
        let (_temp_dir, path) = write_cache(
            "presidentLabel,start,end,partyColors\nSomeone,1901-09-14,1909-03-04T00:00:00Z,E81B23\n",
        );

        let result = LeadersClient::new().fetch_leader_terms(&path).await;

        match result {
            Err(LeadersError::MalformedRow { row, reason }) => {
                assert_eq!(row, 1);
                assert!(reason.contains("1901-09-14"));
            }
            other => panic!("Expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_row_missing_start() {
        let result = parse_row(3, row(None, Some("1909-03-04T00:00:00Z")));
        assert!(matches!(
            result,
            Err(LeadersError::MalformedRow { row: 3, ref reason }) if reason.contains("start")
        ));
    }

    #[test]
    fn test_parse_row_missing_end() {
        let result = parse_row(1, row(Some("1901-09-14T00:00:00Z"), None));
        assert!(matches!(
            result,
            Err(LeadersError::MalformedRow { ref reason, .. }) if reason.contains("end")
        ));
    }

    #[test]
    fn test_parse_row_rejects_end_before_start() {
        let result = parse_row(1, row(Some("1909-03-04T00:00:00Z"), Some("1901-09-14T00:00:00Z")));
        assert!(matches!(result, Err(LeadersError::MalformedRow { .. })));
    }

    #[test]
    fn test_parse_row_accepts_zero_length_term() {
        let term = parse_row(1, row(Some("1841-03-04T00:00:00Z"), Some("1841-03-04T00:00:00Z"))).unwrap();
        assert_eq!(term.start, term.end);
    }

    #[test]
    fn test_parse_timestamp_requires_exact_format() {
        assert!(parse_timestamp("2001-01-20T12:00:00Z").is_ok());
        assert!(parse_timestamp("2001-01-20 12:00:00").is_err());
        assert!(parse_timestamp("2001-01-20T12:00:00+00:00").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_split_party_colors() {
        assert_eq!(split_party_colors("AABBCC;112233"), vec!["AABBCC", "112233"]);
        assert_eq!(split_party_colors("AABBCC"), vec!["AABBCC"]);
        assert!(split_party_colors("").is_empty());
    }

    #[test]
    fn test_source_carries_query_and_accept_header() {
        let source = LeadersClient::new().source();

        assert_eq!(source.url, WIKIDATA_SPARQL_URL);
        assert_eq!(source.query.len(), 1);
        assert_eq!(source.query[0].0, "query");
        assert!(source.query[0].1.contains("wd:Q11696"));
        assert!(source.query[0].1.contains("ORDER BY ?start"));
        assert_eq!(source.headers, vec![("Accept".to_string(), "text/csv".to_string())]);
    }
}
