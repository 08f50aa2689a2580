//! Facades over the live, externally owned document.
//!
//! Commands never own a document. They keep a [`Weak`] handle to the document
//! root plus stable identifiers or index paths, and resolve them again every
//! time they are replayed.

pub mod scene;
pub mod ui;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::command::CommandError;
use crate::error::DocumentError;
use crate::value::{Reflect, Value};

pub use scene::{Component, Node, Scene};
pub use ui::{StyleSheet, UiElement, UiRoot};

/// A document shared between its owner and the commands targeting it
pub type Shared<D> = Arc<RwLock<D>>;

/// Non-owning handle to a scene document
pub type WeakScene = Weak<RwLock<dyn SceneDocument>>;

/// Non-owning handle to a ui document
pub type WeakUi = Weak<RwLock<dyn UiDocument>>;

/// Stable identifier of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier of a component attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Location of a ui element as child indices walked from the root.
///
/// The empty path is the root element itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the parent element, `None` for the root
    pub fn parent(&self) -> Option<ElementPath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Index of this element within its parent, `None` for the root
    pub fn last_index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, index: usize) -> ElementPath {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// True if `self` is `other` or one of its ancestors
    pub fn contains(&self, other: &ElementPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Where this path points once the element at `removed` is taken out.
    /// `None` if this path lies inside the removed subtree.
    pub fn after_removal(&self, removed: &ElementPath) -> Option<ElementPath> {
        if removed.contains(self) {
            return None;
        }
        let mut path = self.clone();
        if let Some((&index, parent)) = removed.0.split_last() {
            let depth = parent.len();
            if self.0.len() > depth && self.0.starts_with(parent) && self.0[depth] > index {
                path.0[depth] -= 1;
            }
        }
        Some(path)
    }

    /// Where this path points once an element is inserted at `inserted`
    pub fn after_insertion(&self, inserted: &ElementPath) -> ElementPath {
        let mut path = self.clone();
        if let Some((&index, parent)) = inserted.0.split_last() {
            let depth = parent.len();
            if self.0.len() > depth && self.0.starts_with(parent) && self.0[depth] >= index {
                path.0[depth] += 1;
            }
        }
        path
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// Facade over a scene of nodes and components.
///
/// Node and component ids are stable for the lifetime of the object and are
/// preserved by `save_*` / `load_*` round-trips.
pub trait SceneDocument {
    fn contains_node(&self, id: NodeId) -> bool;

    fn parent_of(&self, id: NodeId) -> Option<NodeId>;

    /// Position of the node among its parent's children
    fn child_index(&self, id: NodeId) -> Option<usize>;

    fn node(&self, id: NodeId) -> Option<&dyn Reflect>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut dyn Reflect>;

    fn component(&self, id: ComponentId) -> Option<&dyn Reflect>;

    fn component_mut(&mut self, id: ComponentId) -> Option<&mut dyn Reflect>;

    /// Node the component is attached to
    fn component_owner(&self, id: ComponentId) -> Option<NodeId>;

    /// Serialize the node and its whole subtree
    fn save_node(&self, id: NodeId) -> Result<Vec<u8>, DocumentError>;

    /// Recreate a saved subtree under `parent`, keeping the saved ids.
    /// `index` of `None` appends.
    fn load_node(
        &mut self,
        parent: NodeId,
        index: Option<usize>,
        data: &[u8],
    ) -> Result<NodeId, DocumentError>;

    /// Remove the node and its subtree
    fn remove_node(&mut self, id: NodeId) -> Result<(), DocumentError>;

    /// Move the node under `parent`. `index` of `None` appends.
    fn reparent_node(
        &mut self,
        id: NodeId,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), DocumentError>;

    fn save_component(&self, id: ComponentId) -> Result<Vec<u8>, DocumentError>;

    /// Recreate a saved component on `node`, keeping the saved id
    fn load_component(&mut self, node: NodeId, data: &[u8]) -> Result<ComponentId, DocumentError>;

    fn remove_component(&mut self, id: ComponentId) -> Result<(), DocumentError>;
}

/// Facade over a ui element tree with a shared style sheet
pub trait UiDocument {
    fn element(&self, path: &ElementPath) -> Option<&dyn Reflect>;

    fn element_mut(&mut self, path: &ElementPath) -> Option<&mut dyn Reflect>;

    /// Name of the style applied to the element
    fn element_style(&self, path: &ElementPath) -> Option<String>;

    fn save_element(&self, path: &ElementPath) -> Result<Vec<u8>, DocumentError>;

    /// Insert a saved element as child `index` of `parent` (clamped to the child count)
    fn load_element(
        &mut self,
        parent: &ElementPath,
        index: usize,
        data: &[u8],
    ) -> Result<(), DocumentError>;

    fn remove_element(&mut self, path: &ElementPath) -> Result<(), DocumentError>;

    /// Move the element under `parent`, both given as paths before the move.
    /// `index` of `None` appends. Returns the element's new path.
    fn reparent_element(
        &mut self,
        path: &ElementPath,
        parent: &ElementPath,
        index: Option<usize>,
    ) -> Result<ElementPath, DocumentError>;

    /// Apply a named style to the element: its attributes are overwritten with
    /// the style's entries. `None` clears the style and keeps the attributes.
    fn apply_element_style(
        &mut self,
        path: &ElementPath,
        style: Option<&str>,
    ) -> Result<(), DocumentError>;

    fn style_value(&self, style: &str, attribute: &str) -> Option<Value>;

    /// Set a style sheet entry. [`Value::Empty`] removes it.
    fn set_style_value(&mut self, style: &str, attribute: &str, value: Value);
}

/// Downgrade a concrete scene handle to the type-erased weak handle commands keep
pub fn downgrade_scene<S: SceneDocument + 'static>(scene: &Shared<S>) -> WeakScene {
    let weak: Weak<RwLock<S>> = Arc::downgrade(scene);
    weak
}

/// Downgrade a concrete ui handle to the type-erased weak handle commands keep
pub fn downgrade_ui<U: UiDocument + 'static>(root: &Shared<U>) -> WeakUi {
    let weak: Weak<RwLock<U>> = Arc::downgrade(root);
    weak
}

/// Resolve a weak document handle, failing with [`CommandError::ExpiredTarget`]
pub(crate) fn upgrade<D: ?Sized>(handle: &Weak<RwLock<D>>) -> Result<Arc<RwLock<D>>, CommandError> {
    handle.upgrade().ok_or(CommandError::ExpiredTarget)
}
