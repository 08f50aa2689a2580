use crate::app::{InspectorApp, SceneAction};
use crate::document::{NodeId, Scene};

pub fn scene_panel(app: &mut InspectorApp, ctx: &egui::Context) {
    let mut actions = Vec::new();

    egui::SidePanel::left("scene_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Scene");
            let scene = app.scene().read();

            egui::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                node_tree(ui, &scene, scene.root(), app.selected, &mut actions);
            });

            let Some(selected) = app.selected else {
                return;
            };
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Add child").clicked() {
                    actions.push(SceneAction::AddChild(selected));
                }
                let is_root = selected == scene.root();
                if ui.add_enabled(!is_root, egui::Button::new("Delete")).clicked() {
                    actions.push(SceneAction::Delete(selected));
                }
            });

            if selected != scene.root() {
                let mut candidates = Vec::new();
                collect_nodes(&scene, scene.root(), &mut candidates);
                egui::ComboBox::from_label("Move under")
                    .selected_text("choose parent")
                    .show_ui(ui, |ui| {
                        for (node, name) in candidates {
                            // A node cannot move under itself or its own subtree
                            if scene.is_ancestor_or_self(selected, node) {
                                continue;
                            }
                            if ui.selectable_label(false, name).clicked() {
                                actions.push(SceneAction::Reparent {
                                    node: selected,
                                    parent: node,
                                });
                            }
                        }
                    });
            }
        });

    for action in actions {
        app.request(action);
    }
}

fn node_tree(
    ui: &mut egui::Ui,
    scene: &Scene,
    id: NodeId,
    selected: Option<NodeId>,
    actions: &mut Vec<SceneAction>,
) {
    let Some(node) = scene.get_node(id) else {
        return;
    };
    let label = format!("{} ({})", node.name(), id);
    if ui.selectable_label(selected == Some(id), label).clicked() {
        actions.push(SceneAction::Select(id));
    }
    if node.children().is_empty() {
        return;
    }
    ui.indent(id, |ui| {
        for &child in node.children() {
            node_tree(ui, scene, child, selected, actions);
        }
    });
}

fn collect_nodes(scene: &Scene, id: NodeId, out: &mut Vec<(NodeId, String)>) {
    let Some(node) = scene.get_node(id) else {
        return;
    };
    out.push((id, format!("{} ({})", node.name(), id)));
    for &child in node.children() {
        collect_nodes(scene, child, out);
    }
}
