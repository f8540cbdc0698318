use std::collections::BTreeSet;
use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    logo(ui);
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    if state.dataset().is_empty() {
        ui.label("No data to display.");
        return;
    }

    // Clone the value lists so we can mutate state inside the loops.
    let statuses = state.dataset().statuses.clone();
    let regions = state.dataset().regions.clone();
    let schema = state.dataset().schema;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if schema.has_status {
                match category_filter(
                    ui,
                    "Order Status",
                    &statuses,
                    &state.selection.statuses,
                    |v| state.status_colors.color_for(v),
                ) {
                    CategoryAction::SelectAll => state.select_all_statuses(),
                    CategoryAction::SelectNone => state.select_no_statuses(),
                    CategoryAction::Toggle(value) => state.toggle_status(&value),
                    CategoryAction::None => {}
                }
            }

            if schema.has_region {
                match category_filter(
                    ui,
                    "Region",
                    &regions,
                    &state.selection.regions,
                    |v| state.region_colors.color_for(v),
                ) {
                    CategoryAction::SelectAll => state.select_all_regions(),
                    CategoryAction::SelectNone => state.select_no_regions(),
                    CategoryAction::Toggle(value) => state.toggle_region(&value),
                    CategoryAction::None => {}
                }
            }

            if schema.has_date {
                date_filter(ui, state);
            }
        });
}

/// What the user did inside a category filter this frame.
enum CategoryAction {
    SelectAll,
    SelectNone,
    Toggle(String),
    None,
}

fn category_filter(
    ui: &mut Ui,
    label: &str,
    values: &[String],
    selected: &BTreeSet<String>,
    color_for: impl Fn(&str) -> Color32,
) -> CategoryAction {
    let mut action = CategoryAction::None;

    let header_text = format!("{label}  ({}/{})", selected.len(), values.len());
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = CategoryAction::SelectAll;
                }
                if ui.small_button("None").clicked() {
                    action = CategoryAction::SelectNone;
                }
            });

            for value in values {
                let mut checked = selected.contains(value);
                let text = RichText::new(value).color(color_for(value));
                if ui.checkbox(&mut checked, text).changed() {
                    action = CategoryAction::Toggle(value.clone());
                }
            }
        });

    action
}

fn date_filter(ui: &mut Ui, state: &mut AppState) {
    let header = RichText::new("Date Range").strong();
    egui::CollapsingHeader::new(header)
        .id_salt("date_range")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let (Some(mut start), Some(mut end)) =
                (state.selection.date_start, state.selection.date_end)
            else {
                // Date column exists but no cell parsed to a date.
                ui.weak("No dates in the data.");
                return;
            };

            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                if ui
                    .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                    .changed()
                {
                    state.set_date_start(start);
                }
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                if ui
                    .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                    .changed()
                {
                    state.set_date_end(end);
                }
            });

            // A reversed range silently disables the date filter; nudge the
            // user back to sanity without blocking them.
            if state.selection.date_interval().is_none() {
                ui.weak("Range ignored (end before start).");
            }

            if ui.small_button("Reset").clicked() {
                state.reset_date_range();
            }
        });
}

fn logo(ui: &mut Ui) {
    if Path::new(crate::LOGO_PATH).exists() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(format!("file://{}", crate::LOGO_PATH))
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0)
                    .rounding(4.0),
            );
        });
    } else {
        ui.weak(format!("Logo '{}' not found.", crate::LOGO_PATH));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let can_export = !state.dataset().is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.dataset().is_empty() {
            ui.label(format!(
                "{} orders loaded, {} matching filters",
                state.dataset().len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered orders")
        .set_file_name(export::EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = {
            let view = state.filtered();
            export::write_csv_file(&view, &path).map(|()| view.len())
        };
        match result {
            Ok(rows) => {
                log::info!("exported {rows} rows to {}", path.display());
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}
