//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use super::{palette_rgb, present_runs};
use crate::stats::{PercentileResult, SeriesResult, QUARTILE_POINTS};
use egui::Color32;
use egui_plot::{GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};

const QUARTILE_COLOR: Color32 = Color32::from_rgb(150, 150, 150);

/// Creates the dashboard's interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the county at `index` in the selection.
    pub fn entity_color(index: usize) -> Color32 {
        let (r, g, b) = palette_rgb(index);
        Color32::from_rgb(r, g, b)
    }

    /// Draw percentile scatter chart
    /// X-axis: percentile (0 to 100), Y-axis: attribute value
    pub fn draw_percentile_chart(ui: &mut egui::Ui, result: &PercentileResult, height: f32) {
        let quartiles = result.summary.quartiles;

        Plot::new(format!("percentile_{}_{}", result.year, result.attribute))
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Percentile")
            .y_axis_label("Value")
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(100.0)
            .x_grid_spacer(|_input| {
                QUARTILE_POINTS
                    .iter()
                    .map(|&p| GridMark {
                        value: p,
                        step_size: 25.0,
                    })
                    .collect()
            })
            .x_axis_formatter(|mark, _range| {
                if (0.0..=100.0).contains(&mark.value) {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                // Dashed reference lines at the distribution's quartiles
                for value in quartiles.iter().copied().filter(|v| v.is_finite()) {
                    plot_ui.hline(
                        HLine::new(value)
                            .color(QUARTILE_COLOR)
                            .style(LineStyle::dashed_loose())
                            .name("Quartiles"),
                    );
                }

                for (idx, point) in result.points.iter().enumerate() {
                    plot_ui.points(
                        Points::new(vec![[point.percentile, point.value]])
                            .radius(6.0)
                            .color(Self::entity_color(idx))
                            .name(format!("{} (Value: {:.3})", point.entity, point.value)),
                    );
                }
            });
    }

    /// Draw trend line chart
    /// X-axis: year, Y-axis: attribute value; lines break at missing years
    pub fn draw_trend_chart(ui: &mut egui::Ui, result: &SeriesResult, height: f32) {
        let years = result.years.clone();

        Plot::new(format!("trend_{}", result.attribute))
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Year")
            .y_axis_label(result.attribute.clone())
            .allow_scroll(false)
            .x_grid_spacer(move |_input| {
                years
                    .iter()
                    .map(|&year| GridMark {
                        value: f64::from(year),
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract() == 0.0 {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (idx, series) in result.series.iter().enumerate() {
                    let color = Self::entity_color(idx);

                    for run in present_runs(&result.years, &series.values) {
                        let points: PlotPoints = run.iter().map(|&(x, y)| [x, y]).collect();
                        plot_ui.line(
                            Line::new(points)
                                .color(color)
                                .width(2.0)
                                .name(&series.entity),
                        );
                    }

                    let markers: PlotPoints = series
                        .present(&result.years)
                        .map(|(year, value)| [f64::from(year), value])
                        .collect();
                    plot_ui.points(
                        Points::new(markers)
                            .radius(4.0)
                            .color(color)
                            .name(&series.entity),
                    );
                }
            });
    }
}
