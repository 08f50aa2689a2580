use log::debug;
use std::fmt;

use super::{Command, CommandError, CommandResult};
use crate::document::{NodeId, SceneDocument, Shared, WeakScene, downgrade_scene, upgrade};
use crate::error::DocumentError;

/// Parent, position and serialized subtree of a node at capture time
struct NodeSnapshot {
    parent: NodeId,
    index: usize,
    data: Vec<u8>,
}

impl NodeSnapshot {
    fn capture(scene: &dyn SceneDocument, node: NodeId) -> Result<Self, DocumentError> {
        if !scene.contains_node(node) {
            return Err(DocumentError::NodeNotFound(node));
        }
        let parent = scene.parent_of(node).ok_or(DocumentError::RootNode)?;
        Ok(Self {
            parent,
            index: scene.child_index(node).unwrap_or_default(),
            data: scene.save_node(node)?,
        })
    }

    fn restore(&self, scene: &WeakScene) -> CommandResult {
        let handle = upgrade(scene)?;
        let mut scene = handle.write();
        scene.load_node(self.parent, Some(self.index), &self.data)?;
        Ok(())
    }

    fn remove(&self, scene: &WeakScene, node: NodeId) -> CommandResult {
        let handle = upgrade(scene)?;
        let mut scene = handle.write();
        if scene.parent_of(node) != Some(self.parent) {
            return Err(CommandError::Unresolved(format!(
                "node {} under {}",
                node, self.parent
            )));
        }
        scene.remove_node(node)?;
        Ok(())
    }
}

/// Records creation of a node. Capture it after the node has been added to the scene.
pub struct CreateNode {
    scene: WeakScene,
    node: NodeId,
    snapshot: NodeSnapshot,
}

impl CreateNode {
    pub fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        node: NodeId,
    ) -> Result<Self, CommandError> {
        let snapshot = NodeSnapshot::capture(&*scene.read(), node)?;
        Ok(Self {
            scene: downgrade_scene(scene),
            node,
            snapshot,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl fmt::Debug for CreateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateNode")
            .field("node", &self.node)
            .field("parent", &self.snapshot.parent)
            .field("index", &self.snapshot.index)
            .finish()
    }
}

impl Command for CreateNode {
    fn undo(&mut self) -> CommandResult {
        self.snapshot.remove(&self.scene, self.node)
    }

    fn redo(&mut self) -> CommandResult {
        self.snapshot.restore(&self.scene)
    }
}

/// Records removal of a node and its subtree. Capture it before the node is removed.
pub struct DeleteNode {
    scene: WeakScene,
    node: NodeId,
    snapshot: NodeSnapshot,
}

impl DeleteNode {
    pub fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        node: NodeId,
    ) -> Result<Self, CommandError> {
        let snapshot = NodeSnapshot::capture(&*scene.read(), node)?;
        Ok(Self {
            scene: downgrade_scene(scene),
            node,
            snapshot,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl fmt::Debug for DeleteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteNode")
            .field("node", &self.node)
            .field("parent", &self.snapshot.parent)
            .field("index", &self.snapshot.index)
            .finish()
    }
}

impl Command for DeleteNode {
    fn undo(&mut self) -> CommandResult {
        self.snapshot.restore(&self.scene)
    }

    fn redo(&mut self) -> CommandResult {
        self.snapshot.remove(&self.scene, self.node)
    }
}

#[derive(Debug, Clone, Copy)]
struct Move {
    node: NodeId,
    old_parent: NodeId,
    old_index: usize,
}

/// Records moving one or more nodes under a new parent. Capture it before the move.
#[derive(Debug)]
pub struct ReparentNode {
    scene: WeakScene,
    moves: Vec<Move>,
    new_parent: NodeId,
    new_index: Option<usize>,
}

impl ReparentNode {
    pub fn capture<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        node: NodeId,
        new_parent: NodeId,
    ) -> Result<Self, CommandError> {
        Self::capture_many(scene, &[node], new_parent)
    }

    pub fn capture_many<S: SceneDocument + 'static>(
        scene: &Shared<S>,
        nodes: &[NodeId],
        new_parent: NodeId,
    ) -> Result<Self, CommandError> {
        let moves = {
            let document = scene.read();
            if !document.contains_node(new_parent) {
                return Err(DocumentError::NodeNotFound(new_parent).into());
            }
            nodes
                .iter()
                .map(|&node| {
                    if !document.contains_node(node) {
                        return Err(DocumentError::NodeNotFound(node));
                    }
                    let old_parent = document.parent_of(node).ok_or(DocumentError::RootNode)?;
                    Ok(Move {
                        node,
                        old_parent,
                        old_index: document.child_index(node).unwrap_or_default(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            scene: downgrade_scene(scene),
            moves,
            new_parent,
            new_index: None,
        })
    }

    /// Insert the moved nodes starting at `index` instead of appending them
    pub fn at_index(mut self, index: usize) -> Self {
        self.new_index = Some(index);
        self
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.moves.iter().map(|entry| entry.node)
    }

    /// Apply every move that still resolves. Fails only if none of them did.
    fn apply_all(
        &self,
        moves: &[Move],
        mut apply: impl FnMut(&mut dyn SceneDocument, &Move) -> Result<(), DocumentError>,
    ) -> CommandResult {
        let handle = upgrade(&self.scene)?;
        let mut scene = handle.write();
        let mut first_error = None;
        let mut applied = 0;
        for entry in moves {
            match apply(&mut *scene, entry) {
                Ok(()) => applied += 1,
                Err(error) => {
                    debug!("skipping move of node {}: {}", entry.node, error);
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) if applied == 0 => Err(error.into()),
            _ => Ok(()),
        }
    }
}

impl Command for ReparentNode {
    fn undo(&mut self) -> CommandResult {
        self.apply_all(&self.moves, |scene, entry| {
            scene.reparent_node(entry.node, entry.old_parent, None)
        })?;
        // Ascending old index, so every node lands back at its old position.
        let mut moves = self.moves.clone();
        moves.sort_by_key(|entry| entry.old_index);
        self.apply_all(&moves, |scene, entry| {
            if scene.parent_of(entry.node) != Some(entry.old_parent) {
                return Err(DocumentError::NodeNotFound(entry.node));
            }
            scene.reparent_node(entry.node, entry.old_parent, Some(entry.old_index))
        })
    }

    fn redo(&mut self) -> CommandResult {
        let new_parent = self.new_parent;
        self.apply_all(&self.moves, |scene, entry| {
            if !scene.contains_node(new_parent) {
                return Err(DocumentError::NodeNotFound(new_parent));
            }
            scene.reparent_node(entry.node, new_parent, None)
        })?;
        // Every moved node now sits at the end of the new parent, so indices
        // below them no longer shift while they are placed one by one.
        if let Some(index) = self.new_index {
            let mut placed = 0;
            self.apply_all(&self.moves, |scene, entry| {
                if scene.parent_of(entry.node) != Some(new_parent) {
                    return Err(DocumentError::NodeNotFound(entry.node));
                }
                scene.reparent_node(entry.node, new_parent, Some(index + placed))?;
                placed += 1;
                Ok(())
            })?;
        }
        Ok(())
    }
}
