//! Static Chart Renderer
//! Renders the percentile and trend charts to PNG for download.
//!
//! Charts are drawn with plotters into an RGB buffer, then encoded with the
//! `image` crate so the bytes can be written wherever the user chooses.

use super::{
    padded_range, palette_rgb, percentile_file_name, percentile_title, present_runs,
    trend_file_name, trend_title,
};
use crate::stats::{PercentileResult, SeriesResult};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exported image size, matching the dashboard's trend chart.
pub const EXPORT_WIDTH: u32 = 1200;
pub const EXPORT_HEIGHT: u32 = 600;

const QUARTILE_GRAY: RGBColor = RGBColor(170, 170, 170);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn color(index: usize) -> RGBColor {
    let (r, g, b) = palette_rgb(index);
    RGBColor(r, g, b)
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render a percentile chart to PNG bytes.
    pub fn render_percentile_png(
        result: &PercentileResult,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_percentile(&mut buffer, result, width, height)?;
        Self::encode_png(buffer, width, height)
    }

    /// Render a trend chart to PNG bytes.
    pub fn render_trend_png(
        result: &SeriesResult,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        Self::draw_trend(&mut buffer, result, width, height)?;
        Self::encode_png(buffer, width, height)
    }

    /// Write `<attribute>_percentile_chart.png` into `dir`.
    pub fn write_percentile_chart(
        result: &PercentileResult,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let bytes = Self::render_percentile_png(result, EXPORT_WIDTH, EXPORT_HEIGHT)?;
        let path = dir.join(percentile_file_name(&result.attribute));
        std::fs::write(&path, bytes)?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write `<attribute>_line_chart.png` into `dir`.
    pub fn write_trend_chart(result: &SeriesResult, dir: &Path) -> Result<PathBuf, RenderError> {
        let bytes = Self::render_trend_png(result, EXPORT_WIDTH, EXPORT_HEIGHT)?;
        let path = dir.join(trend_file_name(&result.attribute));
        std::fs::write(&path, bytes)?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }

    fn draw_percentile(
        buffer: &mut [u8],
        result: &PercentileResult,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let quartiles: Vec<f64> = result
            .summary
            .quartiles
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        let (y_min, y_max) =
            padded_range(result.points.iter().map(|p| p.value).chain(quartiles.iter().copied()));

        let mut chart = ChartBuilder::on(&root)
            .caption(percentile_title(&result.attribute), ("sans-serif", 28).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..100f64, y_min..y_max)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Percentile")
            .y_desc("Value")
            .x_labels(5)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()
            .map_err(drawing)?;

        for q in quartiles {
            chart
                .draw_series(LineSeries::new(
                    [(0.0, q), (100.0, q)],
                    QUARTILE_GRAY.stroke_width(1),
                ))
                .map_err(drawing)?;
        }

        for (idx, point) in result.points.iter().enumerate() {
            let c = color(idx);
            chart
                .draw_series(std::iter::once(Circle::new(
                    (point.percentile, point.value),
                    7,
                    c.filled(),
                )))
                .map_err(drawing)?
                .label(format!("{} (Value: {:.3})", point.entity, point.value))
                .legend(move |(x, y)| Circle::new((x, y), 5, c.filled()));
        }

        if !result.points.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing)?;
        }

        root.present().map_err(drawing)?;
        Ok(())
    }

    fn draw_trend(
        buffer: &mut [u8],
        result: &SeriesResult,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let (x_min, x_max) = match (result.years.first(), result.years.last()) {
            (Some(&first), Some(&last)) => (f64::from(first) - 0.5, f64::from(last) + 0.5),
            _ => (0.0, 1.0),
        };
        let (y_min, y_max) = padded_range(
            result
                .series
                .iter()
                .flat_map(|s| s.values.iter().flatten().copied()),
        );

        let mut chart = ChartBuilder::on(&root)
            .caption(trend_title(&result.attribute), ("sans-serif", 28).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(result.attribute.as_str())
            .x_labels(result.years.len().clamp(2, 20))
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()
            .map_err(drawing)?;

        for (idx, series) in result.series.iter().enumerate() {
            let c = color(idx);

            for run in present_runs(&result.years, &series.values) {
                chart
                    .draw_series(LineSeries::new(run, c.stroke_width(2)))
                    .map_err(drawing)?;
            }

            chart
                .draw_series(
                    series
                        .present(&result.years)
                        .map(|(year, value)| Circle::new((f64::from(year), value), 4, c.filled())),
                )
                .map_err(drawing)?
                .label(series.entity.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], c.stroke_width(2))
                });
        }

        if !result.series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing)?;
        }

        root.present().map_err(drawing)?;
        Ok(())
    }

    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("image buffer has the wrong size".to_string()))?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
