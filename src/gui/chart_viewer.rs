//! Chart Viewer Widget
//! Right side scrollable panel showing one card per chart.

use county_health_dashboard::charts::ChartPlotter;
use county_health_dashboard::stats::{AttributePercentiles, PercentileResult, SeriesResult};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const PERCENTILE_HEIGHT: f32 = 380.0;
const TREND_HEIGHT: f32 = 450.0;
const CARD_BORDER: Color32 = Color32::from_rgb(100, 149, 237);
const NOTICE_COLOR: Color32 = Color32::from_rgb(230, 160, 30);

/// Results of the last computation.
#[derive(Debug, Clone)]
pub enum ChartSet {
    Percentile {
        year: i32,
        outcomes: Vec<AttributePercentiles>,
    },
    Trend(SeriesResult),
}

/// Actions triggered from the chart cards
#[derive(Debug, Clone, PartialEq)]
pub enum ChartViewerAction {
    None,
    /// Export the percentile chart at this outcome index.
    ExportPercentile(usize),
    ExportTrend,
}

/// Scrollable chart display area.
#[derive(Default)]
pub struct ChartViewer {
    pub charts: Option<ChartSet>,
    /// Shown instead of charts when the selection cannot be charted.
    pub warning: Option<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.charts = None;
        self.warning = None;
    }

    pub fn set_charts(&mut self, charts: ChartSet) {
        self.charts = Some(charts);
        self.warning = None;
    }

    pub fn set_warning(&mut self, warning: &str) {
        self.charts = None;
        self.warning = Some(warning.to_string());
    }

    /// The percentile result behind an export request.
    pub fn percentile_result(&self, idx: usize) -> Option<&PercentileResult> {
        match &self.charts {
            Some(ChartSet::Percentile { outcomes, .. }) => match outcomes.get(idx) {
                Some(AttributePercentiles::Ranked(result)) => Some(result),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn trend_result(&self) -> Option<&SeriesResult> {
        match &self.charts {
            Some(ChartSet::Trend(result)) => Some(result),
            _ => None,
        }
    }

    /// Draw the chart viewer
    pub fn show(&self, ui: &mut egui::Ui) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        if let Some(warning) = &self.warning {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(format!("⚠ {}", warning)).size(18.0).color(NOTICE_COLOR));
            });
            return action;
        }

        let Some(charts) = &self.charts else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return action;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match charts {
                ChartSet::Percentile { year, outcomes } => {
                    for (idx, outcome) in outcomes.iter().enumerate() {
                        match outcome {
                            AttributePercentiles::Ranked(result) => {
                                if Self::draw_percentile_card(ui, result) {
                                    action = ChartViewerAction::ExportPercentile(idx);
                                }
                            }
                            AttributePercentiles::NoData { attribute } => {
                                notice(
                                    ui,
                                    &format!("No data available for the attribute: {}", attribute),
                                );
                            }
                            AttributePercentiles::UnknownAttribute { attribute } => {
                                notice(
                                    ui,
                                    &format!("'{}' is not part of the {} data.", attribute, year),
                                );
                            }
                        }
                        ui.add_space(CHART_SPACING);
                    }
                }
                ChartSet::Trend(result) => {
                    if Self::draw_trend_card(ui, result) {
                        action = ChartViewerAction::ExportTrend;
                    }
                }
            });

        action
    }

    /// Draw a percentile card. Returns true when its download button is clicked.
    fn draw_percentile_card(ui: &mut egui::Ui, result: &PercentileResult) -> bool {
        let mut export = false;

        card(ui, |ui| {
            ui.label(
                RichText::new(county_health_dashboard::charts::percentile_title(&result.attribute))
                    .size(18.0)
                    .strong()
                    .color(CARD_BORDER),
            );
            ui.add_space(8.0);

            ChartPlotter::draw_percentile_chart(ui, result, PERCENTILE_HEIGHT);

            ui.add_space(6.0);
            let summary = &result.summary;
            ui.label(
                RichText::new(format!(
                    "{} counties with data in {} · median {:.3} · mean {:.3} · std {:.3}",
                    result.distribution_size(),
                    result.year,
                    summary.quartiles[2],
                    summary.mean,
                    summary.std
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
            if !result.excluded.is_empty() {
                notice(ui, &format!("No value for: {}", result.excluded.join(", ")));
            }

            ui.add_space(6.0);
            if ui.button("⬇ Download Percentile Chart as Image").clicked() {
                export = true;
            }
        });

        export
    }

    /// Draw the trend card. Returns true when its download button is clicked.
    fn draw_trend_card(ui: &mut egui::Ui, result: &SeriesResult) -> bool {
        let mut export = false;

        card(ui, |ui| {
            ui.label(
                RichText::new(county_health_dashboard::charts::trend_title(&result.attribute))
                    .size(18.0)
                    .strong()
                    .color(CARD_BORDER),
            );
            ui.add_space(8.0);

            if result.is_all_missing() {
                notice(ui, &format!("No data available for the attribute: {}", result.attribute));
            }
            ChartPlotter::draw_trend_chart(ui, result, TREND_HEIGHT);

            if !result.years_without_data.is_empty() {
                let years: Vec<String> =
                    result.years_without_data.iter().map(i32::to_string).collect();
                ui.add_space(6.0);
                ui.label(
                    RichText::new(format!("No data for: {}", years.join(", ")))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }

            ui.add_space(6.0);
            if ui.button("⬇ Download Time Series Chart as Image").clicked() {
                export = true;
            }
        });

        export
    }
}

fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .rounding(8.0)
        .stroke(egui::Stroke::new(2.0, CARD_BORDER))
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.vertical(add_contents);
        });
}

fn notice(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(format!("⚠ {}", text)).size(13.0).color(NOTICE_COLOR));
}
