use log::{info, warn};
use std::path::Path;

use crate::command::{
    AttributeTarget, CommandError, CreateComponent, CreateNode, DeleteComponent, DeleteNode,
    EditAttribute, History, ReparentNode,
};
use crate::config::HistoryConfig;
use crate::document::{ComponentId, NodeId, Scene, SceneDocument, Shared};
use crate::error::DocumentError;
use crate::panels::{history_panel, inspector_panel, scene_panel};
use crate::value::Value;

/// Optional history configuration read at startup
const CONFIG_PATH: &str = "history.json";

/// Structural edits requested by the panels, applied once no document lock is held
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    Select(NodeId),
    AddChild(NodeId),
    Delete(NodeId),
    Reparent { node: NodeId, parent: NodeId },
    AddComponent { node: NodeId, type_name: String },
    RemoveComponent(ComponentId),
    SetAttribute { target: AttributeRef, name: String, value: Value },
}

/// Object in the scene an attribute belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeRef {
    Node(NodeId),
    Component(ComponentId),
}

/// Scene inspector driving a [`History`]
pub struct InspectorApp {
    pub(crate) scene: Shared<Scene>,
    pub(crate) history: History,
    pub(crate) selected: Option<NodeId>,
    pub(crate) new_attribute: String,
    pub(crate) new_component: String,
    pending_actions: Vec<SceneAction>,
}

impl Default for InspectorApp {
    fn default() -> Self {
        Self::with_scene(sample_scene(), HistoryConfig::default())
    }
}

impl InspectorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let scene = cc
            .storage
            .and_then(|storage| eframe::get_value::<Scene>(storage, eframe::APP_KEY))
            .unwrap_or_else(sample_scene);
        Self::with_scene(scene, load_config())
    }

    pub fn with_scene(scene: Scene, config: HistoryConfig) -> Self {
        info!("opening scene {} with {} nodes", scene.id(), scene.node_count());
        Self {
            selected: Some(scene.root()),
            scene: scene.into_shared(),
            history: History::with_config(config),
            new_attribute: String::new(),
            new_component: String::from("Light"),
            pending_actions: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Shared<Scene> {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Queue an action for the end of the frame
    pub fn request(&mut self, action: SceneAction) {
        self.pending_actions.push(action);
    }

    pub fn undo(&mut self) {
        if !self.history.undo() {
            info!("nothing to undo");
        }
        self.fix_selection();
    }

    pub fn redo(&mut self) {
        if !self.history.redo() {
            info!("nothing to redo");
        }
        self.fix_selection();
    }

    /// Replace the document. Commands recorded against the old one are dropped.
    pub fn reset_scene(&mut self) {
        let scene = sample_scene();
        self.selected = Some(scene.root());
        self.scene = scene.into_shared();
        self.history.clear();
    }

    fn apply_pending(&mut self) {
        for action in std::mem::take(&mut self.pending_actions) {
            if let Err(error) = self.apply(action.clone()) {
                warn!("{:?} failed: {}", action, error);
            }
        }
        self.fix_selection();
    }

    pub fn apply(&mut self, action: SceneAction) -> Result<(), CommandError> {
        match action {
            SceneAction::Select(node) => self.selected = Some(node),
            SceneAction::AddChild(parent) => {
                let name = format!("Node {}", self.scene.read().node_count());
                let node = self.scene.write().create_child(parent, &name)?;
                self.history.add(CreateNode::capture(&self.scene, node)?);
                self.selected = Some(node);
            }
            SceneAction::Delete(node) => {
                self.history.execute(DeleteNode::capture(&self.scene, node)?)?;
            }
            SceneAction::Reparent { node, parent } => {
                self.history
                    .execute(ReparentNode::capture(&self.scene, node, parent)?)?;
            }
            SceneAction::AddComponent { node, type_name } => {
                let component = self.scene.write().create_component(node, &type_name)?;
                self.history
                    .add(CreateComponent::capture(&self.scene, component)?);
            }
            SceneAction::RemoveComponent(component) => {
                self.history
                    .execute(DeleteComponent::capture(&self.scene, component)?)?;
            }
            SceneAction::SetAttribute {
                target,
                name,
                value,
            } => {
                let target = self.attribute_target(target);
                self.history
                    .execute(EditAttribute::capture(target, &name, value)?)?;
            }
        }
        Ok(())
    }

    pub fn attribute_target(&self, target: AttributeRef) -> AttributeTarget {
        match target {
            AttributeRef::Node(id) => AttributeTarget::node(&self.scene, id),
            AttributeRef::Component(id) => AttributeTarget::component(&self.scene, id),
        }
    }

    fn fix_selection(&mut self) {
        let scene = self.scene.read();
        if !self
            .selected
            .is_some_and(|node| scene.contains_node(node))
        {
            self.selected = Some(scene.root());
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let redo = ctx.input_mut(|input| {
            input.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
        });
        let undo = ctx.input_mut(|input| input.consume_key(egui::Modifiers::COMMAND, egui::Key::Z));
        if redo {
            self.redo();
        } else if undo {
            self.undo();
        }
    }
}

impl eframe::App for InspectorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &*self.scene.read());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        history_panel::history_panel(self, ctx);
        scene_panel::scene_panel(self, ctx);
        inspector_panel::inspector_panel(self, ctx);

        self.apply_pending();
        self.history.end_frame();
    }
}

fn load_config() -> HistoryConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        return HistoryConfig::default();
    }
    HistoryConfig::load(path).unwrap_or_else(|error| {
        warn!("ignoring {}: {}", CONFIG_PATH, error);
        HistoryConfig::default()
    })
}

/// The scene shown on first start
pub fn sample_scene() -> Scene {
    build_sample_scene().unwrap_or_else(|error| {
        warn!("failed to build sample scene: {}", error);
        Scene::default()
    })
}

fn build_sample_scene() -> Result<Scene, DocumentError> {
    let mut scene = Scene::new("Scene");
    let root = scene.root();

    let camera = scene.create_child(root, "Camera")?;
    set(&mut scene, camera, "Fov", Value::Float(60.0))?;
    set(&mut scene, camera, "Position", Value::Vector3([0.0, 1.5, -5.0]))?;

    let light = scene.create_child(root, "Light")?;
    let point = scene.create_component(light, "PointLight")?;
    if let Some(component) = scene.component_mut(point) {
        component.set_attribute("Intensity", Value::Float(2.5));
        component.set_attribute("Color", Value::Color([1.0, 0.9, 0.7, 1.0]));
    }

    let mesh = scene.create_child(root, "Mesh")?;
    set(&mut scene, mesh, "Visible", Value::Bool(true))?;
    set(&mut scene, mesh, "Segments", Value::Int(16))?;
    Ok(scene)
}

fn set(scene: &mut Scene, node: NodeId, name: &str, value: Value) -> Result<(), DocumentError> {
    scene
        .node_mut(node)
        .ok_or(DocumentError::NodeNotFound(node))?
        .set_attribute(name, value);
    Ok(())
}
