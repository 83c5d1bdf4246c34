//! Reshaping of net-worth rows into aligned time series
//!
//! Converts `YYYY:Qn` period labels into quarter-start dates and pivots the long
//! table (one row per category and quarter) into a dense matrix with one column
//! per category.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::NetWorthPoint;

/// Errors that can occur while reshaping net-worth rows
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReshapeError {
    /// A period label is not of the form `YYYY:Q1`..`YYYY:Q4`
    #[error("Invalid period '{0}': expected YYYY:Q1 to YYYY:Q4")]
    InvalidPeriod(String),
}

/// Dense table of net worth indexed by date, one column per category
///
/// Every row holds exactly one value per category; combinations absent from the
/// source are `0.0`. Rows are sorted ascending by date and columns keep the order
/// in which categories first appear in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct NetWorthMatrix {
    /// Row index, ascending
    pub dates: Vec<NaiveDate>,
    /// Column names in first-seen order
    pub categories: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl NetWorthMatrix {
    /// Returns true if the matrix has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.categories.is_empty()
    }

    /// Looks up a single cell
    pub fn value(&self, date: NaiveDate, category: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let column = self.categories.iter().position(|c| c == category)?;
        Some(self.values[row][column])
    }

    /// Returns the series of one column, aligned with `dates`
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(move |row| row[index])
    }
}

/// Parses a `YYYY:Qn` label into the first day of the quarter's starting month
///
/// # Examples
/// `"2001:Q3"` becomes 2001-07-01 and `"1999:Q1"` becomes 1999-01-01.
pub fn parse_year_quarter(label: &str) -> Result<NaiveDate, ReshapeError> {
    let invalid = || ReshapeError::InvalidPeriod(label.to_string());

    let (year, quarter) = label.split_once(':').ok_or_else(invalid)?;
    let year: i32 = year.trim().parse().map_err(|_| invalid())?;
    let month = match quarter.trim() {
        "Q1" => 1,
        "Q2" => 4,
        "Q3" => 7,
        "Q4" => 10,
        _ => return Err(invalid()),
    };

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Pivots net-worth rows into a dense, date-sorted matrix
///
/// If the same (category, period) pair appears more than once, the later row wins.
pub fn reshape(points: &[NetWorthPoint]) -> Result<NetWorthMatrix, ReshapeError> {
    let mut categories: Vec<String> = Vec::new();
    let mut column_of: HashMap<&str, usize> = HashMap::new();
    let mut cells: HashMap<(NaiveDate, usize), f64> = HashMap::new();
    let mut dates: Vec<NaiveDate> = Vec::new();

    for point in points {
        let date = parse_year_quarter(&point.period)?;

        let column = *column_of.entry(point.category.as_str()).or_insert_with(|| {
            categories.push(point.category.clone());
            categories.len() - 1
        });

        cells.insert((date, column), point.net_worth);
        dates.push(date);
    }

    dates.sort_unstable();
    dates.dedup();

    let values = dates
        .iter()
        .map(|date| {
            (0..categories.len())
                .map(|column| cells.get(&(*date, column)).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(NetWorthMatrix {
        dates,
        categories,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(category: &str, period: &str, net_worth: f64) -> NetWorthPoint {
        NetWorthPoint {
            category: category.to_string(),
            period: period.to_string(),
            net_worth,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_year_quarter_known_quarters() {
        assert_eq!(parse_year_quarter("2001:Q3"), Ok(date(2001, 7, 1)));
        assert_eq!(parse_year_quarter("1999:Q1"), Ok(date(1999, 1, 1)));
        assert_eq!(parse_year_quarter("2010:Q2"), Ok(date(2010, 4, 1)));
        assert_eq!(parse_year_quarter("2023:Q4"), Ok(date(2023, 10, 1)));
    }

    #[test]
    fn test_parse_year_quarter_rejects_unknown_quarter() {
        assert_eq!(
            parse_year_quarter("2000:Q5"),
            Err(ReshapeError::InvalidPeriod("2000:Q5".to_string()))
        );
        assert!(parse_year_quarter("2000:q1").is_err());
    }

    #[test]
    fn test_parse_year_quarter_rejects_malformed_labels() {
        assert!(parse_year_quarter("2000Q1").is_err());
        assert!(parse_year_quarter("year:Q1").is_err());
        assert!(parse_year_quarter("").is_err());
    }

    #[test]
    fn test_reshape_fills_missing_cells_with_zero() {
        let points = vec![
            point("Top 1%", "2020:Q1", 10.0),
            point("Bottom 50%", "2020:Q1", 1.0),
            point("Top 1%", "2020:Q2", 11.0),
            point("Top 1%", "2020:Q3", 12.0),
            point("Bottom 50%", "2020:Q3", 2.0),
        ];

        let matrix = reshape(&points).unwrap();

        assert_eq!(matrix.dates, vec![date(2020, 1, 1), date(2020, 4, 1), date(2020, 7, 1)]);
        assert_eq!(matrix.categories, vec!["Top 1%", "Bottom 50%"]);
        assert_eq!(matrix.values.len(), 3);
        assert!(matrix.values.iter().all(|row| row.len() == 2));
        assert_eq!(matrix.value(date(2020, 4, 1), "Bottom 50%"), Some(0.0));
        assert_eq!(matrix.value(date(2020, 4, 1), "Top 1%"), Some(11.0));
        assert_eq!(matrix.value(date(2020, 7, 1), "Bottom 50%"), Some(2.0));
    }

    #[test]
    fn test_reshape_sorts_rows_by_date() {
        let points = vec![
            point("A", "2021:Q2", 3.0),
            point("A", "1990:Q4", 1.0),
            point("A", "2005:Q1", 2.0),
        ];

        let matrix = reshape(&points).unwrap();

        assert_eq!(matrix.dates, vec![date(1990, 10, 1), date(2005, 1, 1), date(2021, 4, 1)]);
        assert_eq!(matrix.column(0).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reshape_keeps_first_seen_category_order() {
        let points = vec![
            point("Next9", "2000:Q1", 1.0),
            point("TopPt1", "2000:Q1", 2.0),
            point("Bottom50", "2000:Q1", 3.0),
            point("TopPt1", "2000:Q2", 4.0),
        ];

        let matrix = reshape(&points).unwrap();

        assert_eq!(matrix.categories, vec!["Next9", "TopPt1", "Bottom50"]);
    }

    #[test]
    fn test_reshape_date_union_cardinality() {
        let points = vec![
            point("A", "2000:Q1", 1.0),
            point("B", "2000:Q2", 1.0),
            point("A", "2000:Q3", 1.0),
            point("B", "2000:Q3", 1.0),
            point("C", "2001:Q1", 1.0),
        ];

        let matrix = reshape(&points).unwrap();

        assert_eq!(matrix.dates.len(), 4);
        let zeros = matrix.values.iter().flatten().filter(|v| **v == 0.0).count();
        assert_eq!(zeros, 4 * 3 - points.len());
    }

    #[test]
    fn test_reshape_is_idempotent() {
        let points = vec![
            point("A", "2000:Q1", 1.5),
            point("B", "2000:Q2", 2.5),
            point("A", "2000:Q2", 3.5),
        ];

        assert_eq!(reshape(&points).unwrap(), reshape(&points).unwrap());
    }

    #[test]
    fn test_reshape_later_duplicate_wins() {
        let points = vec![point("A", "2000:Q1", 1.0), point("A", "2000:Q1", 2.0)];

        let matrix = reshape(&points).unwrap();

        assert_eq!(matrix.dates.len(), 1);
        assert_eq!(matrix.value(date(2000, 1, 1), "A"), Some(2.0));
    }

    #[test]
    fn test_reshape_propagates_invalid_period() {
        let points = vec![point("A", "2000:Q1", 1.0), point("A", "2000:Q5", 2.0)];

        assert_eq!(
            reshape(&points),
            Err(ReshapeError::InvalidPeriod("2000:Q5".to_string()))
        );
    }

    #[test]
    fn test_reshape_empty_input() {
        let matrix = reshape(&[]).unwrap();
        assert!(matrix.is_empty());
    }
}
