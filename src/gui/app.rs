//! County Health Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::gui::chart_viewer::{ChartSet, ChartViewerAction};
use crate::gui::control_panel::StatusLevel;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use county_health_dashboard::charts::{
    percentile_file_name, trend_file_name, ChartKind, ChartRenderer, EXPORT_HEIGHT, EXPORT_WIDTH,
};
use county_health_dashboard::data::{DatasetAccessor, YearWindow, YearlyTable};
use county_health_dashboard::stats::AnalyticsEngine;
use county_health_dashboard::Selection;
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

/// Year loading result from background thread
enum LoadResult {
    Complete(Arc<YearlyTable>),
    Error { year: i32, message: String },
}

/// Calculation result from background thread
enum CalcResult {
    Complete(ChartSet),
    /// The selection cannot be charted; the message tells the user what to fix.
    Invalid(String),
}

/// Main application window.
pub struct DashboardApp {
    accessor: Arc<DatasetAccessor>,
    window: YearWindow,
    table: Option<Arc<YearlyTable>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async year loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async calculation
    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,
    recalc_pending: bool,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        accessor: Arc<DatasetAccessor>,
        window: YearWindow,
        selection: Selection,
    ) -> Self {
        let year = selection.year;
        let years_with_data = accessor.available_years(window);
        log::info!(
            "{} of {} years have a data file",
            years_with_data.len(),
            window.len()
        );

        let mut app = Self {
            accessor,
            window,
            table: None,
            control_panel: ControlPanel::new(window.descending(), years_with_data, selection),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            calc_rx: None,
            is_calculating: false,
            recalc_pending: false,
        };
        app.start_load(year);
        app
    }

    /// Load the selected year's table in a background thread
    fn start_load(&mut self, year: i32) {
        self.table = None;
        self.is_loading = true;
        self.control_panel
            .set_status(StatusLevel::Info, &format!("Loading data for year {}...", year));

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let accessor = Arc::clone(&self.accessor);
        thread::spawn(move || {
            let result = match accessor.load_year(year) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error {
                    year,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(result);
        });
    }

    /// Check for year loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                self.is_loading = false;
                if table.year() != self.control_panel.selection.year {
                    // Superseded by a newer year choice
                    return;
                }

                if table.is_empty() {
                    self.control_panel.clear_options();
                    self.chart_viewer.clear();
                    self.control_panel.set_status(
                        StatusLevel::Error,
                        &format!("Data file for year {} not found.", table.year()),
                    );
                    self.table = Some(table);
                    return;
                }

                self.control_panel
                    .update_options(table.entities(), table.attributes());
                self.control_panel.set_status(
                    StatusLevel::Success,
                    &format!("Loaded data for year: {}", table.year()),
                );
                self.table = Some(table);
                self.start_calculation();
            }
            Ok(LoadResult::Error { year, message }) => {
                self.is_loading = false;
                self.control_panel.clear_options();
                self.chart_viewer.clear();
                self.control_panel.set_status(
                    StatusLevel::Error,
                    &format!("Error loading year {}: {}", year, message),
                );
            }
            Err(_) => {
                // Still loading
                self.load_rx = Some(rx);
            }
        }
    }

    /// Start calculation in background thread
    fn start_calculation(&mut self) {
        let Some(table) = self.table.clone().filter(|t| !t.is_empty()) else {
            return;
        };
        if self.is_calculating {
            self.recalc_pending = true;
            return;
        }

        let selection = self.control_panel.selection.clone();
        let kind = self.control_panel.chart_kind;
        let accessor = Arc::clone(&self.accessor);
        let window = self.window;

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;

        thread::spawn(move || {
            let result = match kind {
                ChartKind::Percentile => AnalyticsEngine::percentiles(&table, &selection)
                    .map(|outcomes| ChartSet::Percentile {
                        year: table.year(),
                        outcomes,
                    }),
                ChartKind::TimeSeries => {
                    AnalyticsEngine::assemble_series(&accessor, &selection, window)
                        .map(ChartSet::Trend)
                }
            };
            let _ = tx.send(match result {
                Ok(charts) => CalcResult::Complete(charts),
                Err(e) => CalcResult::Invalid(e.to_string()),
            });
        });
    }

    /// Check for calculation results
    fn check_calculation_results(&mut self) {
        let Some(rx) = self.calc_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(CalcResult::Complete(charts)) => {
                self.is_calculating = false;
                self.chart_viewer.set_charts(charts);
            }
            Ok(CalcResult::Invalid(message)) => {
                self.is_calculating = false;
                self.control_panel.set_status(StatusLevel::Warning, &message);
                self.chart_viewer.set_warning(&message);
            }
            Err(_) => {
                self.calc_rx = Some(rx);
                return;
            }
        }

        if std::mem::take(&mut self.recalc_pending) {
            self.start_calculation();
        }
    }

    /// Handle filter file upload; a bad file leaves the current filters alone
    fn handle_upload_filters(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Saved Filters", &["json"])
            .pick_file()
        else {
            return;
        };

        match Selection::load(&path) {
            Ok(selection) => {
                let year_changed = selection.year != self.control_panel.selection.year;
                self.control_panel.apply_selection(selection);
                if year_changed {
                    let year = self.control_panel.selection.year;
                    self.start_load(year);
                } else {
                    self.start_calculation();
                }
            }
            Err(e) => {
                log::warn!("Rejected filters file {}: {}", path.display(), e);
                self.control_panel
                    .set_status(StatusLevel::Error, &format!("Error loading filters: {}", e));
            }
        }
    }

    fn handle_download_filters(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Saved Filters", &["json"])
            .set_file_name("filters.json")
            .save_file()
        else {
            return;
        };

        match self.control_panel.selection.save(&path) {
            Ok(()) => self
                .control_panel
                .set_status(StatusLevel::Success, &format!("Filters saved to {}", path.display())),
            Err(e) => self
                .control_panel
                .set_status(StatusLevel::Error, &format!("Error saving filters: {}", e)),
        }
    }

    /// Render the requested chart to PNG and save it where the user chooses
    fn handle_export(&mut self, request: ChartViewerAction) {
        let rendered = match request {
            ChartViewerAction::ExportPercentile(idx) => {
                self.chart_viewer.percentile_result(idx).map(|result| {
                    (
                        percentile_file_name(&result.attribute),
                        ChartRenderer::render_percentile_png(result, EXPORT_WIDTH, EXPORT_HEIGHT),
                    )
                })
            }
            ChartViewerAction::ExportTrend => self.chart_viewer.trend_result().map(|result| {
                (
                    trend_file_name(&result.attribute),
                    ChartRenderer::render_trend_png(result, EXPORT_WIDTH, EXPORT_HEIGHT),
                )
            }),
            ChartViewerAction::None => None,
        };

        let Some((file_name, bytes)) = rendered else {
            return;
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                self.control_panel
                    .set_status(StatusLevel::Error, &format!("Render error: {}", e));
                return;
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(&file_name)
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, bytes) {
            Ok(()) => self
                .control_panel
                .set_status(StatusLevel::Success, &format!("Chart saved to {}", path.display())),
            Err(e) => self
                .control_panel
                .set_status(StatusLevel::Error, &format!("Error saving chart: {}", e)),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_calculation_results();

        self.control_panel.is_busy = self.is_loading || self.is_calculating;
        if self.control_panel.is_busy {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::YearChanged => {
                            let year = self.control_panel.selection.year;
                            self.start_load(year);
                        }
                        ControlPanelAction::FiltersChanged => self.start_calculation(),
                        ControlPanelAction::UploadFilters => self.handle_upload_filters(),
                        ControlPanelAction::DownloadFilters => self.handle_download_filters(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = self.chart_viewer.show(ui);
            if action != ChartViewerAction::None {
                self.handle_export(action);
            }
        });
    }
}
