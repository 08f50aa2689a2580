use crate::app::InspectorApp;
use crate::command::Command;

pub fn history_panel(app: &mut InspectorApp, ctx: &egui::Context) {
    egui::SidePanel::right("history_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("History");

            // Undo/Redo section
            ui.horizontal(|ui| {
                let can_undo = app.history().can_undo();
                let can_redo = app.history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
            });

            let mut tracking = app.history.is_tracking_enabled();
            if ui.checkbox(&mut tracking, "Record edits").changed() {
                log::info!("edit tracking {}", if tracking { "enabled" } else { "disabled" });
                app.history.set_tracking_enabled(tracking);
            }

            ui.separator();

            let history = app.history();
            ui.label(format!("Groups: {} (cursor {})", history.len(), history.cursor()));
            ui.label(format!("Trackers: {}", history.tracked_value_count()));
            if let Some(report) = history.last_replay() {
                ui.label(format!(
                    "Last replay: {} applied, {} failed",
                    report.applied, report.failed
                ));
            }

            egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                egui::Grid::new("history_grid")
                    .num_columns(3)
                    .spacing([12.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.strong("#");
                        ui.strong("Frame");
                        ui.strong("Commands");
                        ui.end_row();

                        for index in 0..history.len() {
                            let Some(group) = history.group(index) else {
                                continue;
                            };
                            let summary = group
                                .commands()
                                .map(command_label)
                                .collect::<Vec<_>>()
                                .join(", ");
                            if index < history.cursor() {
                                ui.label(index.to_string());
                                ui.label(group.frame().to_string());
                                ui.label(summary);
                            } else {
                                // Undone groups, discarded by the next edit
                                ui.weak(index.to_string());
                                ui.weak(group.frame().to_string());
                                ui.weak(summary);
                            }
                            ui.end_row();
                        }
                    });
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Clear history").clicked() {
                    app.history.clear();
                }
                if ui.button("Reset scene").clicked() {
                    app.reset_scene();
                }
            });
        });
}

/// Short name of a command taken from its debug output
fn command_label(command: &dyn Command) -> String {
    let text = format!("{:?}", command);
    text.split([' ', '(', '{', '<'])
        .next()
        .unwrap_or_default()
        .to_owned()
}
