use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

use super::{Command, CommandError, CommandResult};
use crate::document::{
    ComponentId, ElementPath, NodeId, SceneDocument, Shared, UiDocument, WeakScene, WeakUi,
    downgrade_scene, downgrade_ui, upgrade,
};
use crate::error::DocumentError;
use crate::value::{Reflect, Value};

/// The object an attribute edit applies to.
///
/// The variant is chosen once when the edit is captured and decides how the
/// object is found again on replay: scene objects by id, ui elements by index
/// path from their root, anything else through a direct weak handle.
#[derive(Clone)]
pub enum AttributeTarget {
    Node { scene: WeakScene, id: NodeId },
    Component { scene: WeakScene, id: ComponentId },
    UiElement { root: WeakUi, path: ElementPath },
    Other(Weak<RwLock<dyn Reflect>>),
}

impl AttributeTarget {
    pub fn node<S: SceneDocument + 'static>(scene: &Shared<S>, id: NodeId) -> Self {
        Self::Node {
            scene: downgrade_scene(scene),
            id,
        }
    }

    pub fn component<S: SceneDocument + 'static>(scene: &Shared<S>, id: ComponentId) -> Self {
        Self::Component {
            scene: downgrade_scene(scene),
            id,
        }
    }

    pub fn ui_element<U: UiDocument + 'static>(root: &Shared<U>, path: ElementPath) -> Self {
        Self::UiElement {
            root: downgrade_ui(root),
            path,
        }
    }

    pub fn other<T: Reflect + 'static>(object: &Shared<T>) -> Self {
        let weak: Weak<RwLock<T>> = Arc::downgrade(object);
        Self::Other(weak)
    }

    /// True once the document (or standalone object) behind the target has been dropped
    pub fn is_expired(&self) -> bool {
        match self {
            Self::Node { scene, .. } | Self::Component { scene, .. } => scene.strong_count() == 0,
            Self::UiElement { root, .. } => root.strong_count() == 0,
            Self::Other(object) => object.strong_count() == 0,
        }
    }

    /// Read the attribute's current value
    pub fn read(&self, name: &str) -> Result<Option<Value>, CommandError> {
        self.with_target(|target| target.attribute(name))
    }

    /// Set the attribute and let the target apply it
    pub fn write(&self, name: &str, value: Value) -> CommandResult {
        self.with_target(|target| {
            if !target.set_attribute(name, value) {
                return Err(CommandError::AttributeRejected {
                    target: target.type_name().to_owned(),
                    attribute: name.to_owned(),
                });
            }
            target.apply_attributes();
            Ok(())
        })?
    }

    fn with_target<R>(&self, f: impl FnOnce(&mut dyn Reflect) -> R) -> Result<R, CommandError> {
        match self {
            Self::Node { scene, id } => {
                let handle = upgrade(scene)?;
                let mut scene = handle.write();
                let target = scene
                    .node_mut(*id)
                    .ok_or(DocumentError::NodeNotFound(*id))?;
                Ok(f(target))
            }
            Self::Component { scene, id } => {
                let handle = upgrade(scene)?;
                let mut scene = handle.write();
                let target = scene
                    .component_mut(*id)
                    .ok_or(DocumentError::ComponentNotFound(*id))?;
                Ok(f(target))
            }
            Self::UiElement { root, path } => {
                let handle = upgrade(root)?;
                let mut root = handle.write();
                let target = root
                    .element_mut(path)
                    .ok_or_else(|| DocumentError::ElementNotFound(path.clone()))?;
                Ok(f(target))
            }
            Self::Other(object) => {
                let handle = upgrade(object)?;
                let mut target = handle.write();
                Ok(f(&mut *target))
            }
        }
    }
}

impl fmt::Debug for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node { id, .. } => f.debug_tuple("Node").field(id).finish(),
            Self::Component { id, .. } => f.debug_tuple("Component").field(id).finish(),
            Self::UiElement { path, .. } => f.debug_tuple("UiElement").field(path).finish(),
            Self::Other(_) => write!(f, "Other"),
        }
    }
}

/// Records a change of one named attribute
#[derive(Debug)]
pub struct EditAttribute {
    target: AttributeTarget,
    name: String,
    old_value: Value,
    new_value: Value,
}

impl EditAttribute {
    pub fn new(target: AttributeTarget, name: &str, old_value: Value, new_value: Value) -> Self {
        Self {
            target,
            name: name.to_owned(),
            old_value,
            new_value,
        }
    }

    /// Capture the attribute's current value as the old value. Call it before the edit is applied.
    /// A missing attribute is captured as [`Value::Empty`].
    pub fn capture(target: AttributeTarget, name: &str, new_value: Value) -> Result<Self, CommandError> {
        let old_value = target.read(name)?.unwrap_or_default();
        Ok(Self::new(target, name, old_value, new_value))
    }

    pub fn target(&self) -> &AttributeTarget {
        &self.target
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn old_value(&self) -> &Value {
        &self.old_value
    }

    pub fn new_value(&self) -> &Value {
        &self.new_value
    }
}

impl Command for EditAttribute {
    fn undo(&mut self) -> CommandResult {
        self.target.write(&self.name, self.old_value.clone())
    }

    fn redo(&mut self) -> CommandResult {
        self.target.write(&self.name, self.new_value.clone())
    }
}
