//! Drawing a `ChartLayout` with plotters

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontTransform};
use tracing::info;

use super::layout::BAND_ALPHA;
use super::{ChartError, ChartLayout, CHART_TITLE};

/// Share of the image width given to the plot; the rest holds the legend
const PLOT_WIDTH_FRACTION: f64 = 0.7;

/// Label anchor height as a fraction of the plot height, from the bottom
const LABEL_Y_FRACTION: f64 = 0.99;

const FONT_FAMILY: &str = "sans-serif";
const LEGEND_LEFT: i32 = 16;
const LEGEND_TOP: i32 = 60;
const LEGEND_ROW_HEIGHT: i32 = 24;
const LEGEND_SWATCH: i32 = 14;

/// Output file format, chosen from the output path extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// SVG for a `.svg` extension (any case), PNG otherwise
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Png,
        }
    }
}

/// Explicit rendering context: where and how large the chart is drawn
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output: PathBuf,
    width: u32,
    height: u32,
}

impl ChartRenderer {
    /// Creates a renderer writing a `width` x `height` image to `output`
    pub fn new(output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            width,
            height,
        }
    }

    /// Path the chart is written to
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Image format derived from the output path
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_path(&self.output)
    }

    /// Draws `layout` and writes the image file
    pub fn render(&self, layout: &ChartLayout) -> Result<(), ChartError> {
        /* Create parent directory if it doesn't exist */
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ChartError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let size = (self.width, self.height);
        match self.format() {
            ImageFormat::Png => draw_chart(BitMapBackend::new(&self.output, size).into_drawing_area(), layout)?,
            ImageFormat::Svg => draw_chart(SVGBackend::new(&self.output, size).into_drawing_area(), layout)?,
        }

        info!("Chart written: {:?}", self.output);
        Ok(())
    }
}

fn label_font<'a>() -> FontDesc<'a> {
    (FONT_FAMILY, 14).into_font()
}

fn drawing_error<E: std::fmt::Display>(error: E) -> ChartError {
    ChartError::Drawing(error.to_string())
}

/// Formats an x coordinate (days since 1970-01-01) as a calendar date
fn format_day_number(days: f64) -> String {
    DateTime::from_timestamp((days * 86_400.0).round() as i64, 0)
        .map(|timestamp| timestamp.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn draw_chart<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, layout: &ChartLayout) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(drawing_error)?;

    let (width, _) = root.dim_in_pixel();
    let (plot_area, legend_area) = root.split_horizontally((width as f64 * PLOT_WIDTH_FRACTION) as i32);

    let (x_min, x_max) = layout.x_range;
    let (y_min, y_max) = layout.y_range;

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(CHART_TITLE, (FONT_FAMILY, 28).into_font().color(&BLACK))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, (y_min..y_max).log_scale())
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Net worth")
        .axis_desc_style((FONT_FAMILY, 15).into_font().color(&BLACK))
        .x_labels(12)
        .x_label_formatter(&|x| format_day_number(*x))
        // Tick labels should sit at 45 degrees; plotters only rotates text by quarter turns
        .x_label_style((FONT_FAMILY, 13).into_font().transform(FontTransform::Rotate90).color(&BLACK))
        .y_label_formatter(&|y| format!("{:e}", y))
        .draw()
        .map_err(drawing_error)?;

    for layer in &layout.layers {
        let upper = layout.x_values.iter().zip(&layer.upper);
        let lower = layout.x_values.iter().zip(&layer.lower).rev();
        let outline: Vec<(f64, f64)> = upper
            .chain(lower)
            .map(|(x, y)| (*x, y.max(y_min)))
            .collect();

        chart
            .draw_series(std::iter::once(Polygon::new(outline, layer.color.filled())))
            .map_err(drawing_error)?;
    }

    chart
        .draw_series(layout.bands.iter().map(|band| {
            Rectangle::new(
                [(band.start, y_min), (band.end, y_max)],
                band.color.mix(BAND_ALPHA).filled(),
            )
        }))
        .map_err(drawing_error)?;

    // Labels are placed in pixels relative to the plotting area
    let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
    let plot_width = f64::from(x_pixels.end - x_pixels.start);
    let plot_height = f64::from(y_pixels.end - y_pixels.start);
    let label_top = y_pixels.start + ((1.0 - LABEL_Y_FRACTION) * plot_height) as i32;

    for label in &layout.labels {
        let x = x_pixels.start + (label.x_fraction * plot_width) as i32;
        let font = label_font().transform(FontTransform::Rotate270);

        let shadow = font.color(&RGBColor(128, 128, 128)).pos(Pos::new(HPos::Right, VPos::Top));
        root.draw(&Text::new(label.name.as_str(), (x + 1, label_top + 1), shadow))
            .map_err(drawing_error)?;

        let text = font.color(&BLACK).pos(Pos::new(HPos::Right, VPos::Top));
        root.draw(&Text::new(label.name.as_str(), (x, label_top), text))
            .map_err(drawing_error)?;
    }

    draw_legend(&legend_area, layout)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}

/// One swatch and name per layer, top to bottom in stacking order
fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, layout: &ChartLayout) -> Result<(), ChartError> {
    for (index, layer) in layout.layers.iter().enumerate() {
        let top = LEGEND_TOP + index as i32 * LEGEND_ROW_HEIGHT;

        area.draw(&Rectangle::new(
            [(LEGEND_LEFT, top), (LEGEND_LEFT + LEGEND_SWATCH, top + LEGEND_SWATCH)],
            layer.color.filled(),
        ))
        .map_err(drawing_error)?;

        area.draw(&Text::new(
            layer.category.as_str(),
            (LEGEND_LEFT + LEGEND_SWATCH + 8, top),
            label_font().color(&BLACK),
        ))
        .map_err(drawing_error)?;
    }

    Ok(())
}
