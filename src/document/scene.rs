use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::{ComponentId, NodeId, SceneDocument, Shared};
use crate::error::DocumentError;
use crate::value::{Reflect, Value, store_attribute};

const NAME_ATTRIBUTE: &str = "Name";

/// A node in the scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ComponentId>,
    attributes: BTreeMap<String, Value>,
}

impl Node {
    fn new(id: NodeId, name: &str, parent: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.to_owned(),
            parent,
            children: Vec::new(),
            components: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

impl Reflect for Node {
    fn type_name(&self) -> &str {
        "Node"
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        if name == NAME_ATTRIBUTE {
            return Some(Value::Text(self.name.clone()));
        }
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> bool {
        if name == NAME_ATTRIBUTE {
            return match value {
                Value::Text(text) => {
                    self.name = text;
                    true
                }
                _ => false,
            };
        }
        store_attribute(&mut self.attributes, name, value);
        true
    }

    fn attribute_names(&self) -> Vec<String> {
        std::iter::once(NAME_ATTRIBUTE.to_owned())
            .chain(self.attributes.keys().cloned())
            .collect()
    }
}

/// A component attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    id: ComponentId,
    node: NodeId,
    type_name: String,
    attributes: BTreeMap<String, Value>,
}

impl Component {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

impl Reflect for Component {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> bool {
        store_attribute(&mut self.attributes, name, value);
        true
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ComponentSnapshot {
    id: ComponentId,
    type_name: String,
    attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeSnapshot {
    id: NodeId,
    name: String,
    attributes: BTreeMap<String, Value>,
    components: Vec<ComponentSnapshot>,
    children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    fn collect_ids(&self, nodes: &mut Vec<NodeId>, components: &mut Vec<ComponentId>) {
        nodes.push(self.id);
        components.extend(self.components.iter().map(|component| component.id));
        for child in &self.children {
            child.collect_ids(nodes, components);
        }
    }
}

/// In-memory scene: a tree of named nodes carrying attributes and components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    id: Uuid,
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    components: HashMap<ComponentId, Component>,
    next_node_id: u32,
    next_component_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl Scene {
    pub fn new(name: &str) -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new(root, name, None));
        Self {
            id: Uuid::new_v4(),
            root,
            nodes,
            components: HashMap::new(),
            next_node_id: root.0 + 1,
            next_component_id: 1,
        }
    }

    pub fn into_shared(self) -> Shared<Self> {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Create an empty child node appended to `parent`
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, DocumentError> {
        let id = NodeId(self.next_node_id);
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(DocumentError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, name, Some(parent)));
        Ok(id)
    }

    /// Attach a new component of the given type to `node`
    pub fn create_component(
        &mut self,
        node: NodeId,
        type_name: &str,
    ) -> Result<ComponentId, DocumentError> {
        let id = ComponentId(self.next_component_id);
        let owner = self
            .nodes
            .get_mut(&node)
            .ok_or(DocumentError::NodeNotFound(node))?;
        owner.components.push(id);
        self.next_component_id += 1;
        self.components.insert(
            id,
            Component {
                id,
                node,
                type_name: type_name.to_owned(),
                attributes: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    fn snapshot(&self, id: NodeId) -> Result<NodeSnapshot, DocumentError> {
        let node = self.nodes.get(&id).ok_or(DocumentError::NodeNotFound(id))?;
        let components = node
            .components
            .iter()
            .map(|component_id| self.component_snapshot(*component_id))
            .collect::<Result<Vec<_>, _>>()?;
        let children = node
            .children
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NodeSnapshot {
            id,
            name: node.name.clone(),
            attributes: node.attributes.clone(),
            components,
            children,
        })
    }

    fn component_snapshot(&self, id: ComponentId) -> Result<ComponentSnapshot, DocumentError> {
        let component = self
            .components
            .get(&id)
            .ok_or(DocumentError::ComponentNotFound(id))?;
        Ok(ComponentSnapshot {
            id,
            type_name: component.type_name.clone(),
            attributes: component.attributes.clone(),
        })
    }

    fn insert_component(&mut self, node: NodeId, snapshot: ComponentSnapshot) {
        let ComponentSnapshot { id, type_name, attributes } = snapshot;
        self.next_component_id = self.next_component_id.max(id.0 + 1);
        self.components.insert(
            id,
            Component {
                id,
                node,
                type_name,
                attributes,
            },
        );
    }

    /// Insert the snapshot's nodes and components. Ids must already be known to be free.
    /// The caller links the returned node into its parent's child list.
    fn restore(&mut self, snapshot: NodeSnapshot, parent: NodeId) -> NodeId {
        let NodeSnapshot {
            id,
            name,
            attributes,
            components,
            children,
        } = snapshot;

        let mut node = Node::new(id, &name, Some(parent));
        node.attributes = attributes;
        node.components = components.iter().map(|component| component.id).collect();
        for component in components {
            self.insert_component(id, component);
        }
        self.next_node_id = self.next_node_id.max(id.0 + 1);
        self.nodes.insert(id, node);

        for child in children {
            let child_id = self.restore(child, id);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    fn detach_from_parent(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|node| node.parent);
        if let Some(parent) = parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for component in &node.components {
                self.components.remove(component);
            }
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }
}

fn insert_at<T>(items: &mut Vec<T>, index: Option<usize>, item: T) {
    match index {
        Some(index) => items.insert(index.min(items.len()), item),
        None => items.push(item),
    }
}

impl SceneDocument for Scene {
    fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes.get(&self.parent_of(id)?)?;
        parent.children.iter().position(|child| *child == id)
    }

    fn node(&self, id: NodeId) -> Option<&dyn Reflect> {
        self.nodes.get(&id).map(|node| node as &dyn Reflect)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn Reflect> {
        self.nodes.get_mut(&id).map(|node| node as &mut dyn Reflect)
    }

    fn component(&self, id: ComponentId) -> Option<&dyn Reflect> {
        self.components.get(&id).map(|component| component as &dyn Reflect)
    }

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut dyn Reflect> {
        self.components
            .get_mut(&id)
            .map(|component| component as &mut dyn Reflect)
    }

    fn component_owner(&self, id: ComponentId) -> Option<NodeId> {
        self.components.get(&id).map(|component| component.node)
    }

    fn save_node(&self, id: NodeId) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(&self.snapshot(id)?)?)
    }

    fn load_node(
        &mut self,
        parent: NodeId,
        index: Option<usize>,
        data: &[u8],
    ) -> Result<NodeId, DocumentError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DocumentError::NodeNotFound(parent));
        }
        let snapshot: NodeSnapshot = serde_json::from_slice(data)?;

        let mut node_ids = Vec::new();
        let mut component_ids = Vec::new();
        snapshot.collect_ids(&mut node_ids, &mut component_ids);
        if let Some(id) = node_ids.iter().find(|id| self.nodes.contains_key(*id)) {
            return Err(DocumentError::NodeIdInUse(*id));
        }
        if let Some(id) = component_ids.iter().find(|id| self.components.contains_key(*id)) {
            return Err(DocumentError::ComponentIdInUse(*id));
        }

        let id = self.restore(snapshot, parent);
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(DocumentError::NodeNotFound(parent))?;
        insert_at(&mut parent_node.children, index, id);
        Ok(id)
    }

    fn remove_node(&mut self, id: NodeId) -> Result<(), DocumentError> {
        if id == self.root {
            return Err(DocumentError::RootNode);
        }
        if !self.nodes.contains_key(&id) {
            return Err(DocumentError::NodeNotFound(id));
        }
        self.detach_from_parent(id);
        self.drop_subtree(id);
        Ok(())
    }

    fn reparent_node(
        &mut self,
        id: NodeId,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), DocumentError> {
        if id == self.root {
            return Err(DocumentError::RootNode);
        }
        if !self.nodes.contains_key(&id) {
            return Err(DocumentError::NodeNotFound(id));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(DocumentError::NodeNotFound(parent));
        }
        if self.is_ancestor_or_self(id, parent) {
            return Err(DocumentError::CyclicParent { node: id, parent });
        }

        self.detach_from_parent(id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            insert_at(&mut parent_node.children, index, id);
        }
        Ok(())
    }

    fn save_component(&self, id: ComponentId) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(&self.component_snapshot(id)?)?)
    }

    fn load_component(&mut self, node: NodeId, data: &[u8]) -> Result<ComponentId, DocumentError> {
        if !self.nodes.contains_key(&node) {
            return Err(DocumentError::NodeNotFound(node));
        }
        let snapshot: ComponentSnapshot = serde_json::from_slice(data)?;
        let id = snapshot.id;
        if self.components.contains_key(&id) {
            return Err(DocumentError::ComponentIdInUse(id));
        }

        self.insert_component(node, snapshot);
        if let Some(owner) = self.nodes.get_mut(&node) {
            owner.components.push(id);
        }
        Ok(id)
    }

    fn remove_component(&mut self, id: ComponentId) -> Result<(), DocumentError> {
        let component = self
            .components
            .remove(&id)
            .ok_or(DocumentError::ComponentNotFound(id))?;
        if let Some(owner) = self.nodes.get_mut(&component.node) {
            owner.components.retain(|component| *component != id);
        }
        Ok(())
    }
}
