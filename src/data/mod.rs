//! Core data models for networth-terms
//!
//! This module contains the records produced by the two dataset clients: presidential
//! terms from Wikidata and net-worth levels from the Federal Reserve.

pub mod leaders;
pub mod networth;

pub use leaders::{LeadersClient, LeadersError};
pub use networth::{NetWorthClient, NetWorthError};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A contiguous interval during which one leader held office
///
/// The same leader may hold several terms (non-consecutive service).
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderTerm {
    /// Display name of the leader
    pub name: String,
    /// When the term started
    pub start: DateTime<Utc>,
    /// When the term ended
    pub end: DateTime<Utc>,
    /// Party colors as hex strings without a leading `#`, in source order
    pub party_colors: Vec<String>,
}

impl LeaderTerm {
    /// The first listed party color, which is the one used for rendering
    pub fn primary_color(&self) -> Option<&str> {
        self.party_colors.first().map(String::as_str)
    }

    /// The primary color as a `#RRGGBB` string
    pub fn band_color_hex(&self) -> Option<String> {
        self.primary_color().map(|color| format!("#{}", color))
    }
}

/// One row of the net-worth levels CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetWorthPoint {
    /// Wealth percentile bracket, e.g. "TopPt1" or "Bottom50"
    #[serde(rename = "Category")]
    pub category: String,
    /// Period label in `YYYY:Qn` form
    #[serde(rename = "Date")]
    pub period: String,
    /// Net worth of the bracket for the period
    #[serde(rename = "Net worth")]
    pub net_worth: f64,
}
