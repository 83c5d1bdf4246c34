//! Backend-independent chart geometry
//!
//! X coordinates are fractional days since 1970-01-01 so dates and timestamps
//! share one axis.

use chrono::{DateTime, NaiveDate, Utc};
use plotters::style::RGBColor;
use tracing::{debug, warn};

use super::ChartError;
use crate::data::LeaderTerm;
use crate::reshape::NetWorthMatrix;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Opacity of term bands
pub const BAND_ALPHA: f64 = 0.15;

/// Horizontal offset of a label from its band start, as a fraction of the plot width
const LABEL_OFFSET: f64 = 0.01;

/// Band color used when a term has no usable party color
const FALLBACK_BAND_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Multiplicative headroom above and below the data on the log axis
const Y_PADDING_FACTOR: f64 = 1.5;

/// Layer colors, cycled when there are more categories than colors
const SERIES_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// One stacked area, between `lower` and `upper`, aligned with `ChartLayout::x_values`
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayer {
    pub category: String,
    pub color: RGBColor,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Translucent vertical band covering the visible part of one term
#[derive(Debug, Clone, PartialEq)]
pub struct TermBand {
    pub name: String,
    pub start: f64,
    pub end: f64,
    pub color: RGBColor,
}

/// Rotated leader name anchored near the top of the plot
#[derive(Debug, Clone, PartialEq)]
pub struct TermLabel {
    pub name: String,
    /// Left edge of the label as a fraction of the plot width
    pub x_fraction: f64,
}

/// Everything drawn on the chart, in plot coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    /// X position of each matrix row
    pub x_values: Vec<f64>,
    /// Visible x-range, first to last date
    pub x_range: (f64, f64),
    /// Visible y-range; both bounds are positive
    pub y_range: (f64, f64),
    /// One layer per category, bottom first
    pub layers: Vec<StackLayer>,
    pub bands: Vec<TermBand>,
    pub labels: Vec<TermLabel>,
}

impl ChartLayout {
    /// Lays out the stacked net-worth series and the term overlays
    ///
    /// # Arguments
    /// * `matrix` - Reshaped net worth; column order is the stacking and legend order
    /// * `terms` - Terms to overlay as bands
    /// * `label_terms` - Whether to add name labels for terms visible on screen
    ///
    /// # Returns
    /// * `Err(ChartError::EmptyData)` if the matrix has no rows or columns
    /// * `Err(ChartError::NoPositiveValues)` if no stacked value is above zero
    pub fn build(matrix: &NetWorthMatrix, terms: &[LeaderTerm], label_terms: bool) -> Result<Self, ChartError> {
        if matrix.is_empty() {
            return Err(ChartError::EmptyData);
        }

        let x_values: Vec<f64> = matrix.dates.iter().map(|date| date_number(*date)).collect();
        let x_range = visible_x_range(&x_values);
        let layers = stack_layers(matrix);
        let y_range = log_y_range(&layers)?;

        let bands: Vec<TermBand> = terms
            .iter()
            .filter_map(|term| clip_band(term, x_range))
            .collect();
        if bands.len() < terms.len() {
            debug!(
                hidden = terms.len() - bands.len(),
                "terms outside the visible date range"
            );
        }

        let labels = if label_terms {
            terms.iter().filter_map(|term| place_label(term, x_range)).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            x_values,
            x_range,
            y_range,
            layers,
            bands,
            labels,
        })
    }

    /// Position of `x` as a fraction of the visible x-range
    pub fn x_fraction(&self, x: f64) -> f64 {
        fraction_of(x, self.x_range)
    }
}

/// Converts a date to fractional days since 1970-01-01
pub fn date_number(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| timestamp_number(midnight.and_utc()))
        .unwrap_or_default()
}

/// Converts a UTC timestamp to fractional days since 1970-01-01
fn timestamp_number(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp() as f64 / SECONDS_PER_DAY
}

/// Parses a `RRGGBB` hex color, with or without a leading `#`
pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn fraction_of(x: f64, (left, right): (f64, f64)) -> f64 {
    (x - left) / (right - left)
}

/// First to last x value; a single date is widened by a day on each side
fn visible_x_range(x_values: &[f64]) -> (f64, f64) {
    let first = x_values.first().copied().unwrap_or_default();
    let last = x_values.last().copied().unwrap_or_default();
    if last > first {
        (first, last)
    } else {
        (first - 1.0, first + 1.0)
    }
}

/// Cumulative sums per row, in column order
fn stack_layers(matrix: &NetWorthMatrix) -> Vec<StackLayer> {
    let mut running = vec![0.0; matrix.dates.len()];

    matrix
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let lower = running.clone();
            for (total, value) in running.iter_mut().zip(matrix.column(index)) {
                *total += value;
            }
            StackLayer {
                category: category.clone(),
                color: SERIES_COLORS[index % SERIES_COLORS.len()],
                lower,
                upper: running.clone(),
            }
        })
        .collect()
}

/// Padded range covering every positive layer boundary
fn log_y_range(layers: &[StackLayer]) -> Result<(f64, f64), ChartError> {
    let positives = layers
        .iter()
        .flat_map(|layer| layer.lower.iter().chain(layer.upper.iter()))
        .copied()
        .filter(|value| *value > 0.0 && value.is_finite());

    let (min, max) = positives.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    });

    if !min.is_finite() || !max.is_finite() {
        return Err(ChartError::NoPositiveValues);
    }

    Ok((min / Y_PADDING_FACTOR, max * Y_PADDING_FACTOR))
}

fn band_color(term: &LeaderTerm) -> RGBColor {
    match term.primary_color() {
        Some(hex) => parse_hex_color(hex).unwrap_or_else(|| {
            warn!(leader = %term.name, color = hex, "unparseable party color, using gray");
            FALLBACK_BAND_COLOR
        }),
        None => FALLBACK_BAND_COLOR,
    }
}

/// Band for the part of a term inside the visible range, if any
fn clip_band(term: &LeaderTerm, (left, right): (f64, f64)) -> Option<TermBand> {
    let start = timestamp_number(term.start).max(left);
    let end = timestamp_number(term.end).min(right);
    if start > end {
        return None;
    }

    Some(TermBand {
        name: term.name.clone(),
        start,
        end,
        color: band_color(term),
    })
}

/// Label for a term with at least one boundary strictly inside the visible range
///
/// Terms that started off-screen to the left are pinned near the left edge.
fn place_label(term: &LeaderTerm, x_range: (f64, f64)) -> Option<TermLabel> {
    let start = fraction_of(timestamp_number(term.start), x_range);
    let end = fraction_of(timestamp_number(term.end), x_range);
    let on_screen = |fraction: f64| fraction > 0.0 && fraction < 1.0;

    if !on_screen(start) && !on_screen(end) {
        return None;
    }

    Some(TermLabel {
        name: term.name.clone(),
        x_fraction: start.max(0.0) + LABEL_OFFSET,
    })
}
