//! Control Panel Widget
//! Left side panel with the year, chart type, county and attribute filters.

use county_health_dashboard::charts::ChartKind;
use county_health_dashboard::Selection;
use egui::{Color32, ComboBox, RichText, ScrollArea};

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 30);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const OK_COLOR: Color32 = Color32::from_rgb(40, 167, 69);

/// How a status message should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Left side control panel with the dashboard filters.
pub struct ControlPanel {
    pub selection: Selection,
    pub chart_kind: ChartKind,
    /// Year options, newest first.
    pub years: Vec<i32>,
    /// Years that have a data file; the others are marked in the picker.
    pub years_with_data: Vec<i32>,
    pub entity_options: Vec<String>,
    pub attribute_options: Vec<String>,
    entity_search: String,
    attribute_search: String,
    pub status: String,
    pub status_level: StatusLevel,
    pub is_busy: bool,
}

impl ControlPanel {
    pub fn new(years: Vec<i32>, years_with_data: Vec<i32>, selection: Selection) -> Self {
        Self {
            selection,
            chart_kind: ChartKind::default(),
            years,
            years_with_data,
            entity_options: Vec::new(),
            attribute_options: Vec::new(),
            entity_search: String::new(),
            attribute_search: String::new(),
            status: "Ready".to_string(),
            status_level: StatusLevel::Info,
            is_busy: false,
        }
    }

    /// Update the county and attribute pickers after a year loads.
    ///
    /// The current selection is kept as is; names missing from the new year
    /// simply drop out of the results.
    pub fn update_options(&mut self, entities: Vec<String>, attributes: Vec<String>) {
        self.entity_options = entities;
        self.attribute_options = attributes;
    }

    pub fn clear_options(&mut self) {
        self.entity_options.clear();
        self.attribute_options.clear();
    }

    /// Replace the whole selection, e.g. from an uploaded filters file.
    pub fn apply_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.entity_search.clear();
        self.attribute_search.clear();
    }

    /// Picker text for `year`.
    pub fn year_label(&self, year: i32) -> String {
        if self.years_with_data.contains(&year) {
            year.to_string()
        } else {
            format!("{} (no data)", year)
        }
    }

    pub fn set_status(&mut self, level: StatusLevel, status: &str) {
        self.status_level = level;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏥 County Health Rankings")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Dashboard").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Year & Chart Type =====
        ui.label(RichText::new("📅 Year").size(14.0).strong());
        ui.add_space(5.0);

        let year_options: Vec<(i32, String)> = self
            .years
            .iter()
            .map(|&year| (year, self.year_label(year)))
            .collect();

        ComboBox::from_id_salt("year")
            .width(150.0)
            .selected_text(self.year_label(self.selection.year))
            .show_ui(ui, |ui| {
                for (year, label) in year_options {
                    if ui
                        .selectable_label(self.selection.year == year, label)
                        .clicked()
                        && self.selection.year != year
                    {
                        self.selection.year = year;
                        action = ControlPanelAction::YearChanged;
                    }
                }
            });

        ui.add_space(10.0);
        ui.label(RichText::new("📈 Chart Type").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            for kind in [ChartKind::Percentile, ChartKind::TimeSeries] {
                if ui
                    .radio_value(&mut self.chart_kind, kind, kind.label())
                    .changed()
                {
                    action = ControlPanelAction::FiltersChanged;
                }
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Counties =====
        ui.label(
            RichText::new(format!(
                "🏘 Counties ({} selected)",
                self.selection.entities.len()
            ))
            .size(14.0)
            .strong(),
        );
        ui.add_space(5.0);
        if let Some(name) = checklist(
            ui,
            "counties",
            &self.entity_options,
            &mut self.entity_search,
            &self.selection.entities,
        ) {
            self.selection.toggle_entity(&name);
            action = ControlPanelAction::FiltersChanged;
        }
        if ui.small_button("Clear Counties").clicked() && !self.selection.entities.is_empty() {
            self.selection.entities.clear();
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(10.0);

        // ===== Attributes =====
        ui.label(
            RichText::new(format!(
                "🔬 Attributes ({} selected)",
                self.selection.attributes.len()
            ))
            .size(14.0)
            .strong(),
        );
        ui.add_space(5.0);
        if let Some(name) = checklist(
            ui,
            "attributes",
            &self.attribute_options,
            &mut self.attribute_search,
            &self.selection.attributes,
        ) {
            self.selection.toggle_attribute(&name);
            action = ControlPanelAction::FiltersChanged;
        }
        if ui.small_button("Clear Attributes").clicked() && !self.selection.attributes.is_empty() {
            self.selection.attributes.clear();
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Saved Filters =====
        ui.label(RichText::new("💾 Saved Filters").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if ui.button("📂 Upload Saved Filters").clicked() {
                action = ControlPanelAction::UploadFilters;
            }
            if ui.button("⬇ Download Filters").clicked() {
                action = ControlPanelAction::DownloadFilters;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.horizontal(|ui| {
            if self.is_busy {
                ui.spinner();
            }
            let color = match self.status_level {
                StatusLevel::Info => Color32::GRAY,
                StatusLevel::Success => OK_COLOR,
                StatusLevel::Warning => WARNING_COLOR,
                StatusLevel::Error => ERROR_COLOR,
            };
            ui.label(RichText::new(&self.status).size(11.0).color(color));
        });

        action
    }
}

/// Searchable list of checkboxes. Returns the name whose box was toggled.
fn checklist(
    ui: &mut egui::Ui,
    id: &str,
    options: &[String],
    search: &mut String,
    selected: &[String],
) -> Option<String> {
    let mut toggled = None;

    ui.add(egui::TextEdit::singleline(search).hint_text("🔍 Search..."));

    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(5.0)
        .show(ui, |ui| {
            ScrollArea::vertical()
                .id_salt(id)
                .max_height(180.0)
                .show(ui, |ui| {
                    if options.is_empty() {
                        ui.label(RichText::new("No data loaded").color(Color32::GRAY));
                    }
                    let needle = search.to_lowercase();
                    for name in options
                        .iter()
                        .filter(|name| name.to_lowercase().contains(&needle))
                    {
                        let mut checked = selected.contains(name);
                        if ui.checkbox(&mut checked, name.as_str()).changed() {
                            toggled = Some(name.clone());
                        }
                    }
                });
        });

    toggled
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    YearChanged,
    FiltersChanged,
    UploadFilters,
    DownloadFilters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_without_a_file_are_marked() {
        let panel =
            ControlPanel::new(vec![2012, 2011, 2010], vec![2010, 2012], Selection::new(2012));
        assert_eq!(panel.year_label(2012), "2012");
        assert_eq!(panel.year_label(2011), "2011 (no data)");
    }
}
