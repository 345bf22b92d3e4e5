use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::correlation::Method;
use crate::chart::{ChartKind, ChartSelector};
use crate::data::loader::{load_table, LoadOptions};
use crate::session::{load_overview_scatter, overview_summaries, SessionState, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar with the tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data file…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open reference workbook…").clicked() {
                open_workbook_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            if ui
                .selectable_label(state.tab == tab, tab.label())
                .clicked()
            {
                state.tab = tab;
            }
        }

        ui.separator();

        if let (Some(table), Some(name)) = (&state.table, &state.source_name) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                table.row_count(),
                table.column_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Side panel (analysis selectors)
// ---------------------------------------------------------------------------

/// Render the left selector panel for the active tab.
pub fn side_panel(ui: &mut Ui, state: &mut SessionState) {
    match state.tab {
        Tab::Analysis => analysis_panel(ui, state),
        Tab::Overview => overview_panel(ui, state),
        Tab::Chat => {
            ui.heading("Chat");
            ui.separator();
            ui.label("Conversation with the completion service runs in the central panel.");
        }
    }
}

fn overview_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Overview");
    ui.separator();
    match &state.overview.workbook {
        Some(path) => {
            ui.label(format!(
                "Reference workbook: {}",
                path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("(unnamed)")
            ));
        }
        None => {
            ui.label("No reference workbook loaded.");
        }
    }
    if ui.button("Open reference workbook…").clicked() {
        open_workbook_dialog(state);
    }
}

fn analysis_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading("Analysis");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Skip leading rows");
        let drag = egui::DragValue::new(&mut state.skip_rows).range(0..=50);
        ui.add(drag);
    });
    ui.small("Applied on the next file open; the header is the first kept row.");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };
    let columns = table.column_names();
    let row_count = table.row_count();

    // ---- Chart kind picker ----
    let current = state.chart.selector();
    let mut switched = None;
    egui::ComboBox::from_label("Chart type")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for selector in ChartSelector::ALL {
                if ui
                    .selectable_label(current == selector, selector.label())
                    .clicked()
                    && selector != current
                {
                    switched = Some(selector);
                }
            }
        });
    if let Some(selector) = switched {
        state.switch_chart(selector);
    }
    ui.separator();

    // ---- Per-kind parameter widgets ----
    let mut dirty = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &mut state.chart {
            ChartKind::GroupedScatter {
                x,
                y,
                ranges,
                title,
            } => {
                dirty |= column_combo(ui, "gs_x", "X column", x, &columns);
                dirty |= column_combo(ui, "gs_y", "Y column", y, &columns);

                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Title");
                    dirty |= ui.text_edit_singleline(title).changed();
                });
                ui.separator();
                ui.strong("Row ranges");

                let max = row_count.saturating_sub(1);
                for (i, range) in ranges.iter_mut().enumerate() {
                    ui.push_id(i, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            dirty |= ui.text_edit_singleline(&mut range.label).changed();
                        });
                        ui.horizontal(|ui: &mut Ui| {
                            dirty |= ui
                                .add(egui::DragValue::new(&mut range.start).range(0..=max))
                                .changed();
                            ui.label("to");
                            dirty |= ui
                                .add(egui::DragValue::new(&mut range.end).range(0..=max))
                                .changed();
                        });
                    });
                }
            }

            ChartKind::Distribution {
                columns: selected,
                standardize,
            } => {
                dirty |= ui
                    .checkbox(standardize, "Standardize (zero mean, unit variance)")
                    .changed();
                ui.separator();
                dirty |= column_multiselect(ui, selected, &columns);
            }

            ChartKind::CorrelationHeatmap {
                columns: selected,
                method,
            } => {
                ui.horizontal(|ui: &mut Ui| {
                    for m in [Method::Pearson, Method::Spearman] {
                        if ui.selectable_label(*method == m, m.label()).clicked() && *method != m {
                            *method = m;
                            dirty = true;
                        }
                    }
                });
                ui.separator();
                dirty |= column_multiselect(ui, selected, &columns);
            }

            ChartKind::Contour { x, y, z } => {
                dirty |= column_combo(ui, "ct_x", "X column", x, &columns);
                dirty |= column_combo(ui, "ct_y", "Y column", y, &columns);
                dirty |= column_combo(ui, "ct_z", "Z column", z, &columns);
            }
        });

    if dirty {
        state.mark_chart_dirty();
    }

    // ---- Warnings from the last derivation pass ----
    if !state.warnings.is_empty() {
        ui.separator();
        for warning in &state.warnings {
            ui.label(RichText::new(warning).color(Color32::YELLOW));
        }
    }
}

/// Single-column picker.  Returns true when the selection changed.
fn column_combo(ui: &mut Ui, id: &str, label: &str, current: &mut String, columns: &[String]) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                if ui.selectable_label(current == col, col).clicked() && current != col {
                    *current = col.clone();
                    changed = true;
                }
            }
        });
    ui.label(label);
    changed
}

/// Checkbox list over all columns.  Returns true when membership changed.
fn column_multiselect(ui: &mut Ui, selected: &mut Vec<String>, columns: &[String]) -> bool {
    let mut changed = false;
    ui.strong("Columns");
    for col in columns {
        let mut checked = selected.contains(col);
        if ui.checkbox(&mut checked, col).changed() {
            if checked {
                selected.push(col.clone());
            } else {
                selected.retain(|c| c != col);
            }
            changed = true;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Open measurement data")
        .add_filter("Supported files", &["csv", "xlsx", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    let Some(path) = file else { return };
    let options = LoadOptions {
        skip_rows: state.skip_rows,
    };
    match load_table(&path, options) {
        Ok(table) => {
            log::info!(
                "Loaded {} rows, columns {:?}",
                table.row_count(),
                table.column_names()
            );
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("dataset")
                .to_string();
            state.set_table(table, name);
        }
        Err(e) => {
            // The previous table (if any) stays usable.
            log::error!("Failed to load file: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

fn open_workbook_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Open reference workbook")
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    let Some(path) = file else { return };
    match load_overview_scatter(&path) {
        Ok(sample) => {
            log::info!("Overview scatter: {} points from {path:?}", sample.len());
            state.overview.scatter = Some(sample);
        }
        Err(e) => {
            log::error!("Overview scatter failed: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
    match load_table(&path, LoadOptions::default()) {
        Ok(table) => state.overview.summaries = overview_summaries(&table),
        Err(e) => log::warn!("No categorical breakdowns: {e}"),
    }
    state.overview.workbook = Some(path);
}
