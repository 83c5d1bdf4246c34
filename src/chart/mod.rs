//! Chart rendering for net worth and presidential terms
//!
//! Rendering is split in two steps. `ChartLayout` computes everything that ends up
//! on the chart (stacked layers, axis ranges, term bands and labels) without
//! touching a drawing backend. `ChartRenderer` owns the output settings and draws
//! a layout with plotters. Nothing is kept in global state, so renders are
//! independent of each other.

mod layout;
mod render;

pub use layout::{date_number, parse_hex_color, ChartLayout, StackLayer, TermBand, TermLabel};
pub use render::{ChartRenderer, ImageFormat};

use std::path::PathBuf;
use thiserror::Error;

/// Chart title
pub const CHART_TITLE: &str = "Net Worth vs Date by Wealth Percentile";

/// Errors that can occur when laying out or drawing the chart
#[derive(Debug, Error)]
pub enum ChartError {
    /// There is nothing to plot
    #[error("Cannot render a chart without data")]
    EmptyData,

    /// A logarithmic axis needs at least one positive value
    #[error("Cannot render a logarithmic chart without positive values")]
    NoPositiveValues,

    /// The output file or its directory could not be created
    #[error("Chart output {path} could not be written: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plotting backend reported an error
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
}
