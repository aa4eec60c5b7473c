use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::ChartKind;
use crate::state::{AppState, TableKind};
use crate::summary::GroupedResult;

// ---------------------------------------------------------------------------
// Left side panel – filters and summary table
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let raw = match &state.raw {
        Some(table) => table,
        None => {
            ui.label("No raw posts loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns = raw.column_names.clone();
    let unique = raw.unique_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() * 0.55)
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let Some(all_values) = unique.get(col) else {
                    continue;
                };
                // Numeric measures are not useful as checkbox filters.
                if *col == state.config.columns.likes {
                    continue;
                }

                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let header_text = format!("{col}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let mut checked =
                                state.filters.get(col).is_some_and(|s| s.contains(val));
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });

    ui.separator();
    ui.heading("Summary");
    match &state.summaries {
        Some(result) => summary_table(ui, result),
        None => {
            ui.label("No rows to summarise.");
        }
    }
}

/// Five-number summary per group.
fn summary_table(ui: &mut Ui, result: &GroupedResult) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(40.0), 6)
        .header(20.0, |mut header| {
            for title in ["Group", "Min", "Q1", "Median", "Q3", "Max", "IQR"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (group, s) in result.iter() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(group);
                    });
                    for value in [s.min, s.q1, s.median, s.q3, s.max, s.iqr] {
                        row.col(|ui| {
                            ui.label(format!("{value:.1}"));
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for kind in [TableKind::Raw, TableKind::Averages, TableKind::Timeline] {
                if ui.button(format!("Open {}…", kind.label())).clicked() {
                    open_file_dialog(state, kind);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Export SVG…").clicked() {
                export_svg_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for kind in ChartKind::ALL {
            if ui
                .selectable_label(state.active_chart == kind, kind.title())
                .clicked()
            {
                state.active_chart = kind;
            }
        }

        ui.separator();

        if let Some(raw) = &state.raw {
            ui.label(format!(
                "{} posts loaded, {} visible",
                raw.len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, kind: TableKind) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {} data", kind.label()))
        .set_directory(&state.config.data_dir)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(kind, &path);
    }
}

pub fn export_svg_dialog(state: &mut AppState) {
    let kind = state.active_chart;
    let scene = match state.scene(kind) {
        Ok(scene) => scene,
        Err(e) => {
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    };

    let file = rfd::FileDialog::new()
        .set_title("Export chart as SVG")
        .set_file_name(format!("{}.svg", kind.slug()))
        .add_filter("SVG", &["svg"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = crate::chart::svg::write_svg(&scene, &path) {
            log::error!("Failed to export chart: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
