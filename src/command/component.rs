use std::fmt;

use super::{Command, CommandError, CommandResult};
use crate::document::{ComponentId, NodeId, SceneDocument, Shared, WeakScene, downgrade_scene, upgrade};
use crate::error::DocumentError;

/// Owner and serialized state of a component at capture time
struct ComponentSnapshot {
    scene: WeakScene,
    node: NodeId,
    component: ComponentId,
    data: Vec<u8>,
}

impl ComponentSnapshot {
    fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        component: ComponentId,
    ) -> Result<Self, CommandError> {
        let (node, data) = {
            let document = scene.read();
            let node = document
                .component_owner(component)
                .ok_or(DocumentError::ComponentNotFound(component))?;
            (node, document.save_component(component)?)
        };
        Ok(Self {
            scene: downgrade_scene(scene),
            node,
            component,
            data,
        })
    }

    fn restore(&self) -> CommandResult {
        let handle = upgrade(&self.scene)?;
        let mut scene = handle.write();
        scene.load_component(self.node, &self.data)?;
        Ok(())
    }

    fn remove(&self) -> CommandResult {
        let handle = upgrade(&self.scene)?;
        let mut scene = handle.write();
        if scene.component_owner(self.component) != Some(self.node) {
            return Err(CommandError::Unresolved(format!(
                "component {} on node {}",
                self.component, self.node
            )));
        }
        scene.remove_component(self.component)?;
        Ok(())
    }
}

impl fmt::Debug for ComponentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSnapshot")
            .field("node", &self.node)
            .field("component", &self.component)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Records a component being attached to a node. Capture it after the component exists.
#[derive(Debug)]
pub struct CreateComponent(ComponentSnapshot);

impl CreateComponent {
    pub fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        component: ComponentId,
    ) -> Result<Self, CommandError> {
        ComponentSnapshot::capture(scene, component).map(Self)
    }

    pub fn component(&self) -> ComponentId {
        self.0.component
    }
}

impl Command for CreateComponent {
    fn undo(&mut self) -> CommandResult {
        self.0.remove()
    }

    fn redo(&mut self) -> CommandResult {
        self.0.restore()
    }
}

/// Records a component being removed from its node. Capture it before removal.
#[derive(Debug)]
pub struct DeleteComponent(ComponentSnapshot);

impl DeleteComponent {
    pub fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        component: ComponentId,
    ) -> Result<Self, CommandError> {
        ComponentSnapshot::capture(scene, component).map(Self)
    }

    pub fn component(&self) -> ComponentId {
        self.0.component
    }
}

impl Command for DeleteComponent {
    fn undo(&mut self) -> CommandResult {
        self.0.restore()
    }

    fn redo(&mut self) -> CommandResult {
        self.0.remove()
    }
}
