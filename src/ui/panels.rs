use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use cohort_view::color::ColorScheme;
use cohort_view::plotting::{CategoricalMode, ColumnKind, ContinuousMode};

use crate::state::{AppState, SelectionSource, View};

// ---------------------------------------------------------------------------
// Left side panel – view options and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        ui.heading("Cohort");
        ui.separator();
        ui.label("No table loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = table.column_names.clone();
    let unique = table.unique_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            view_options(ui, state, &columns);
            ui.separator();

            ui.heading("Filters");
            if let SelectionSource::File(path) = &state.selection_source {
                ui.label(
                    RichText::new(format!("Selection from {}", path.display()))
                        .italics()
                        .weak(),
                );
            }

            // ---- Per-column filter widgets (collapsible) ----
            for col in &columns {
                let Some(all_values) = unique.get(col) else {
                    continue;
                };

                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .filters
                                .get(col)
                                .is_some_and(|selected| selected.contains(val));
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

fn view_options(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    ui.heading("View");
    let mut view = state.view;
    for v in View::ALL {
        ui.radio_value(&mut view, v, v.label());
    }
    if view != state.view {
        state.view = view;
        state.mark_dirty();
    }
    ui.separator();

    let mut changed = false;
    match state.view {
        View::Fractions => {
            ui.label("Continuous columns are bucketed:");
            changed |= ui
                .add(
                    DragValue::new(&mut state.config.correlation.n_out)
                        .range(1..=20)
                        .prefix("buckets: "),
                )
                .changed();
        }
        View::Correlation => {
            column_picker(ui, "x_column", "X", columns, state, true);
            column_picker(ui, "y_column", "Y", columns, state, false);

            let opts = &mut state.config.correlation;
            changed |= kind_picker(ui, "x_kind", "X kind", &mut opts.x_kind);
            changed |= kind_picker(ui, "y_kind", "Y kind", &mut opts.y_kind);
            changed |= enum_picker(
                ui,
                "cat_mode",
                "Mixed kinds",
                &mut opts.cat_mode,
                &CategoricalMode::ALL,
            );
            changed |= enum_picker(
                ui,
                "cont_mode",
                "Both continuous",
                &mut opts.cont_mode,
                &ContinuousMode::ALL,
            );
            changed |= enum_picker(ui, "corr_scheme", "Colors", &mut opts.scheme, &ColorScheme::ALL);
            changed |= ui
                .add(
                    DragValue::new(&mut opts.prefac)
                        .range(0.0..=100.0)
                        .speed(0.1)
                        .prefix("color scale: "),
                )
                .changed();
            changed |= ui
                .add(DragValue::new(&mut opts.n_out).range(1..=20).prefix("buckets: "))
                .changed();
            changed |= ui
                .add(
                    DragValue::new(&mut opts.n_levels)
                        .range(1..=30)
                        .prefix("density levels: "),
                )
                .changed();
            changed |= ui.checkbox(&mut opts.shade, "Shade density").changed();
        }
        View::Distribution => {
            column_picker(ui, "dist_column", "Column", columns, state, true);

            let opts = &mut state.config.distribution;
            changed |= kind_picker(ui, "dist_kind", "Kind", &mut opts.kind);
            changed |= enum_picker(
                ui,
                "dist_scheme",
                "Colors",
                &mut opts.scheme,
                &ColorScheme::ALL,
            );
            changed |= ui
                .add(DragValue::new(&mut opts.nbins).range(1..=200).prefix("bins: "))
                .changed();
        }
    }
    if changed {
        state.mark_dirty();
    }
}

fn column_picker(
    ui: &mut Ui,
    id: &str,
    label: &str,
    columns: &[String],
    state: &mut AppState,
    is_x: bool,
) {
    let current = if is_x {
        state.x_column.clone()
    } else {
        state.y_column.clone()
    }
    .unwrap_or_default();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for col in columns {
                    if ui.selectable_label(current == *col, col).clicked() {
                        if is_x {
                            state.set_x_column(col.clone());
                        } else {
                            state.set_y_column(col.clone());
                        }
                    }
                }
            });
    });
}

fn kind_picker(ui: &mut Ui, id: &str, label: &str, kind: &mut ColumnKind) -> bool {
    enum_picker(ui, id, label, kind, &ColumnKind::ALL)
}

fn enum_picker<T>(ui: &mut Ui, id: &str, label: &str, value: &mut T, options: &[T]) -> bool
where
    T: Copy + PartialEq + std::fmt::Display,
{
    let before = *value;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(value.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for &option in options {
                    ui.selectable_value(value, option, option.to_string());
                }
            });
    });
    *value != before
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open table…").clicked() {
                open_table_dialog(state);
                ui.close_menu();
            }
            let has_table = state.table.is_some();
            if ui
                .add_enabled(has_table, egui::Button::new("Open selection…"))
                .clicked()
            {
                open_selection_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_table, egui::Button::new("Use filter selection"))
                .clicked()
            {
                state.use_filter_selection();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} participants, {} selected",
                table.len(),
                state.selection.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_table_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open participant table")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match cohort_view::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} participants with columns {:?}",
                    table.len(),
                    table.column_names
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load table: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn open_selection_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open selection")
        .add_filter("Selection", &["json", "txt", "csv"])
        .pick_file();

    if let Some(path) = file {
        match cohort_view::data::loader::load_selection(&path) {
            Ok(selection) => {
                log::info!("Loaded selection of {} rows", selection.len());
                state.status_message = None;
                state.set_selection(selection, path);
            }
            Err(e) => {
                log::error!("Failed to load selection: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
