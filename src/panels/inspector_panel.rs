use crate::app::{AttributeRef, InspectorApp, SceneAction};
use crate::value::{Reflect, Value};

/// Attributes that cannot be removed from a node
const FIXED_ATTRIBUTES: [&str; 1] = ["Name"];

pub fn inspector_panel(app: &mut InspectorApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Inspector");
        let Some(node) = app.selected else {
            ui.label("Nothing selected");
            return;
        };

        // Read everything up front; tracked edits write to the scene.
        let (node_attributes, components) = {
            let scene = app.scene().read();
            let Some(selected) = scene.get_node(node) else {
                return;
            };
            let components: Vec<_> = selected
                .components()
                .iter()
                .filter_map(|&id| {
                    let component = scene.get_component(id)?;
                    Some((id, component.type_name().to_owned(), read_attributes(component)))
                })
                .collect();
            (read_attributes(selected), components)
        };

        attribute_grid(ui, app, AttributeRef::Node(node), &node_attributes);

        for (id, type_name, attributes) in components {
            ui.separator();
            ui.horizontal(|ui| {
                ui.strong(format!("{} ({})", type_name, id));
                if ui.small_button("Remove").clicked() {
                    app.request(SceneAction::RemoveComponent(id));
                }
            });
            attribute_grid(ui, app, AttributeRef::Component(id), &attributes);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Attribute");
            ui.text_edit_singleline(&mut app.new_attribute);
            let defaults = [
                ("Float", Value::Float(0.0)),
                ("Text", Value::Text(String::new())),
                ("Bool", Value::Bool(false)),
            ];
            for (label, value) in defaults {
                if ui.button(format!("+ {}", label)).clicked() && !app.new_attribute.is_empty() {
                    let name = std::mem::take(&mut app.new_attribute);
                    app.request(SceneAction::SetAttribute {
                        target: AttributeRef::Node(node),
                        name,
                        value,
                    });
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("Component");
            ui.text_edit_singleline(&mut app.new_component);
            if ui.button("Add").clicked() && !app.new_component.is_empty() {
                let type_name = app.new_component.clone();
                app.request(SceneAction::AddComponent { node, type_name });
            }
        });
    });
}

fn read_attributes(object: &dyn Reflect) -> Vec<(String, Value)> {
    object
        .attribute_names()
        .into_iter()
        .filter_map(|name| {
            let value = object.attribute(&name)?;
            Some((name, value))
        })
        .collect()
}

/// One row per attribute, each edited through a tracked value scope
fn attribute_grid(
    ui: &mut egui::Ui,
    app: &mut InspectorApp,
    target: AttributeRef,
    attributes: &[(String, Value)],
) {
    egui::Grid::new(("attributes", target))
        .num_columns(3)
        .striped(true)
        .show(ui, |ui| {
            for (name, value) in attributes {
                ui.label(name);

                let id = ui.make_persistent_id((target, name.as_str()));
                let handle = app.attribute_target(target);
                let mut scope = app
                    .history
                    .track_attribute(id, handle, name, value.clone());
                let (modified, active) = value_editor(ui, scope.value_mut());
                scope.set_modified(modified);
                scope.set_input_active(active);
                drop(scope);

                if !FIXED_ATTRIBUTES.contains(&name.as_str())
                    && ui.small_button("x").on_hover_text("Remove").clicked()
                {
                    app.request(SceneAction::SetAttribute {
                        target,
                        name: name.clone(),
                        value: Value::Empty,
                    });
                }
                ui.end_row();
            }
        });
}

/// Show an editor for `value`. Returns (changed this frame, input still held).
fn value_editor(ui: &mut egui::Ui, value: &mut Value) -> (bool, bool) {
    match value {
        Value::Empty => {
            ui.weak("empty");
            (false, false)
        }
        Value::Bool(flag) => (ui.checkbox(flag, "").changed(), false),
        Value::Int(number) => drag_state(&ui.add(egui::DragValue::new(number))),
        Value::Float(number) => drag_state(&ui.add(egui::DragValue::new(number).speed(0.1))),
        Value::Text(text) => {
            let response = ui.text_edit_singleline(text);
            (response.changed(), response.has_focus())
        }
        Value::Vector3(vector) => {
            ui.horizontal(|ui| {
                vector.iter_mut().fold((false, false), |(modified, active), axis| {
                    let (changed, held) =
                        drag_state(&ui.add(egui::DragValue::new(axis).speed(0.05)));
                    (modified || changed, active || held)
                })
            })
            .inner
        }
        Value::Color(rgba) => {
            let response = ui.color_edit_button_rgba_unmultiplied(rgba);
            (response.changed(), false)
        }
    }
}

fn drag_state(response: &egui::Response) -> (bool, bool) {
    (response.changed(), response.dragged() || response.has_focus())
}
