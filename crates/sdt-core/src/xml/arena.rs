use super::node::XmlNodeData;
use super::xname::XName;
use crate::error::{Result, SdtError};
use indextree::{Arena, NodeId};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Arena-backed mutable XML tree.
///
/// Every instance carries a unique `tree_id`, and a `revision` that is bumped
/// on each structural mutation. Query caches key on both so that results
/// computed against one tree (or an older shape of the same tree) are never
/// served for another.
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
    tree_id: u64,
    revision: u64,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            tree_id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn tree_id(&self) -> u64 {
        self.tree_id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        let node = self.arena.get(id)?;
        if node.is_removed() {
            return None;
        }
        Some(node.get())
    }

    pub fn name(&self, id: NodeId) -> Option<&XName> {
        self.get(id)?.name()
    }

    pub fn is_named(&self, id: NodeId, namespace: &str, local_name: &str) -> bool {
        self.get(id)
            .is_some_and(|data| data.is_named(namespace, local_name))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.text_content()
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        self.revision += 1;
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        self.revision += 1;
        child
    }

    pub fn add_before(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_before(new_node, &mut self.arena);
        self.revision += 1;
        new_node
    }

    /// Re-parent an existing node as the last child of `new_parent`.
    ///
    /// The node keeps its identity, attributes and whole subtree; it is
    /// detached from its old position first, so it is never present twice.
    pub fn move_into(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
        if !self.contains(node) || !self.contains(new_parent) {
            return Err(SdtError::Contract(
                "cannot move a node that is not attached to this tree".to_string(),
            ));
        }
        if self.ancestors(new_parent).any(|ancestor| ancestor == node) {
            return Err(SdtError::Contract(
                "cannot move a node into its own subtree".to_string(),
            ));
        }
        node.detach(&mut self.arena);
        new_parent
            .checked_append(node, &mut self.arena)
            .map_err(|e| SdtError::Contract(format!("move failed: {e}")))?;
        self.revision += 1;
        Ok(())
    }

    /// True if `node` is live and reachable from this document's root.
    pub fn contains(&self, node: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        if self.get(node).is_none() {
            return false;
        }
        self.ancestors(node).last() == Some(root)
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    /// Ancestors starting with `node` itself, ending at the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    /// Element-only path of `node` from the root, e.g.
    /// `/document[1]/body[1]/sdt[1]/sdtContent[1]/p[1]`.
    ///
    /// Positions count same-named element siblings, so the path describes
    /// where the node is *now*.
    pub fn path(&self, node: NodeId) -> String {
        let mut segments: Vec<String> = Vec::new();
        for id in self.ancestors(node) {
            let Some(name) = self.name(id) else {
                continue;
            };
            let position = match self.parent(id) {
                Some(parent) => {
                    self.children(parent)
                        .take_while(|&sibling| sibling != id)
                        .filter(|&sibling| self.name(sibling) == Some(name))
                        .count()
                        + 1
                }
                None => 1,
            };
            segments.push(format!("{}[{}]", name.local_name, position));
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
