use thiserror::Error;

use crate::document::{ComponentId, ElementPath, NodeId};

/// Errors reported by a document facade when an operation cannot be performed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("component {0} does not exist")]
    ComponentNotFound(ComponentId),

    #[error("ui element {0} does not exist")]
    ElementNotFound(ElementPath),

    #[error("node id {0} is already in use")]
    NodeIdInUse(NodeId),

    #[error("component id {0} is already in use")]
    ComponentIdInUse(ComponentId),

    #[error("the root node cannot be removed or moved")]
    RootNode,

    #[error("the root ui element cannot be removed or moved")]
    RootElement,

    #[error("node {node} cannot become a child of its descendant {parent}")]
    CyclicParent { node: NodeId, parent: NodeId },

    #[error("ui element {element} cannot become a child of {parent} inside it")]
    CyclicElement {
        element: ElementPath,
        parent: ElementPath,
    },

    #[error("ui element {0} has no style applied")]
    MissingStyle(ElementPath),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(error: serde_json::Error) -> Self {
        DocumentError::Snapshot(error.to_string())
    }
}

/// Errors returned by a command when it cannot be replayed.
///
/// None of these are fatal: the history absorbs them per command and keeps
/// processing the rest of the group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The document the command points into has been dropped
    #[error("target document no longer exists")]
    ExpiredTarget,

    /// An identifier or path no longer resolves in the live document
    #[error("{0} could not be resolved")]
    Unresolved(String),

    #[error("{target} rejected attribute `{attribute}`")]
    AttributeRejected { target: String, attribute: String },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors that can occur while loading or saving a history configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
