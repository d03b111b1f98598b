use super::{NodeId, ParamValue, Position, StructuredNode};
use crate::config::LayoutConfig;
use crate::error::WorkspaceError;

/// The live block graph of one document.
///
/// Nodes live in an arena and reference each other by `NodeId`. Top-level
/// chains are tracked by their heads in `roots`, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    nodes: Vec<Option<StructuredNode>>,
    roots: Vec<NodeId>,
}

/// Iterator over a chain of nodes linked through `next`.
pub struct Chain<'a> {
    workspace: &'a Workspace,
    cursor: Option<NodeId>,
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cursor?;
        self.cursor = self.workspace.get(id).and_then(|n| n.next);
        Some(id)
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&StructuredNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut StructuredNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn node(&self, id: NodeId) -> Result<&StructuredNode, WorkspaceError> {
        self.get(id).ok_or(WorkspaceError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut StructuredNode, WorkspaceError> {
        self.get_mut(id).ok_or(WorkspaceError::NodeNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StructuredNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i), n)))
    }

    /// Heads of the top-level chains in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Walks a chain starting at `head`.
    pub fn chain(&self, head: Option<NodeId>) -> Chain<'_> {
        Chain {
            workspace: self,
            cursor: head,
        }
    }

    /// Adds a detached node as the head of a new top-level chain.
    pub fn add(&mut self, mut node: StructuredNode) -> NodeId {
        node.next = None;
        node.prev = None;
        node.container = None;
        for slot in &mut node.slots {
            slot.first = None;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        self.roots.push(id);
        id
    }

    /// Moves the chain starting at `id` so that it follows `prev`.
    ///
    /// Whatever followed `prev` before is re-attached after the moved chain's tail.
    pub fn connect_next(&mut self, prev: NodeId, id: NodeId) -> Result<(), WorkspaceError> {
        self.node(prev)?;
        self.node(id)?;
        if self.subtree_contains(id, prev) {
            return Err(WorkspaceError::Cycle {
                parent: prev,
                child: id,
            });
        }

        self.detach(id)?;
        let tail = self.chain_tail(id);
        let container = self.node(prev)?.container;
        let old_next = self.node(prev)?.next;

        self.node_mut(prev)?.next = Some(id);
        self.node_mut(id)?.prev = Some(prev);
        self.set_chain_container(id, container);
        if let Some(old_next) = old_next {
            self.node_mut(tail)?.next = Some(old_next);
            self.node_mut(old_next)?.prev = Some(tail);
        }
        Ok(())
    }

    /// Moves the chain starting at `id` to the top of `parent`'s `slot`.
    pub fn connect_into(
        &mut self,
        parent: NodeId,
        slot: &str,
        id: NodeId,
    ) -> Result<(), WorkspaceError> {
        if self.node(parent)?.slot(slot).is_none() {
            return Err(WorkspaceError::SlotNotFound {
                node: parent,
                slot: slot.to_string(),
            });
        }
        self.node(id)?;
        if self.subtree_contains(id, parent) {
            return Err(WorkspaceError::Cycle { parent, child: id });
        }

        self.detach(id)?;
        let tail = self.chain_tail(id);
        let old_first = self.node(parent)?.slot_head(slot);

        if let Some(s) = self.node_mut(parent)?.slot_mut(slot) {
            s.first = Some(id);
        }
        self.set_chain_container(id, Some(parent));
        if let Some(old_first) = old_first {
            self.node_mut(tail)?.next = Some(old_first);
            self.node_mut(old_first)?.prev = Some(tail);
        }
        Ok(())
    }

    /// Cuts the chain starting at `id` loose and makes it a top-level chain.
    pub fn disconnect(&mut self, id: NodeId) -> Result<(), WorkspaceError> {
        self.detach(id)?;
        self.roots.push(id);
        Ok(())
    }

    /// Deletes `id` together with everything nested in its slots.
    /// The chain it was part of is healed around it.
    pub fn remove(&mut self, id: NodeId) -> Result<(), WorkspaceError> {
        let node = self.node(id)?;
        let (prev, next, container) = (node.prev, node.next, node.container);

        match (prev, container) {
            (Some(prev), _) => self.node_mut(prev)?.next = next,
            (None, Some(container)) => {
                if let Some(slot) = self
                    .node_mut(container)?
                    .slots
                    .iter_mut()
                    .find(|s| s.first == Some(id))
                {
                    slot.first = next;
                }
            }
            (None, None) => match (self.roots.iter().position(|r| *r == id), next) {
                (Some(pos), Some(next)) => self.roots[pos] = next,
                (Some(pos), None) => {
                    self.roots.remove(pos);
                }
                (None, _) => {}
            },
        }
        if let Some(next) = next {
            self.node_mut(next)?.prev = prev;
        }

        let mut doomed = vec![id];
        let mut stack: Vec<NodeId> = self.node(id)?.slots.iter().filter_map(|s| s.first).collect();
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            stack.extend(node.next);
            stack.extend(node.slots.iter().filter_map(|s| s.first));
            doomed.push(current);
        }
        for dead in doomed {
            self.nodes[dead.0] = None;
        }
        Ok(())
    }

    pub fn set_param(
        &mut self,
        id: NodeId,
        name: &str,
        value: ParamValue,
    ) -> Result<(), WorkspaceError> {
        self.node_mut(id)?.params.insert(name.to_string(), value);
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<(), WorkspaceError> {
        self.node_mut(id)?.position = Some(Position { x, y });
        Ok(())
    }

    /// Drops every node. Ids handed out before are invalid afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    /// Top-level chain heads in reading order: by canvas `y` then `x` when every
    /// head has a position, insertion order otherwise.
    pub fn top_level_ordered(&self) -> Vec<NodeId> {
        let mut heads = self.roots.clone();
        let positions: Option<Vec<Position>> = heads
            .iter()
            .map(|id| self.get(*id).and_then(|n| n.position))
            .collect();
        if let Some(positions) = positions {
            let mut keyed: Vec<(Position, NodeId)> = positions.into_iter().zip(heads).collect();
            keyed.sort_by(|(a, _), (b, _)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
            heads = keyed.into_iter().map(|(_, id)| id).collect();
        }
        heads
    }

    /// Stacks top-level chains vertically with a fixed spacing.
    pub fn layout_vertical(&mut self, layout: &LayoutConfig) {
        let roots = self.roots.clone();
        for (index, id) in roots.into_iter().enumerate() {
            if let Some(node) = self.get_mut(id) {
                node.position = Some(Position {
                    x: layout.origin_x,
                    y: layout.origin_y + layout.spacing * index as f64,
                });
            }
        }
    }

    /// Unlinks the chain starting at `id` from its predecessor, slot, or the roots.
    fn detach(&mut self, id: NodeId) -> Result<(), WorkspaceError> {
        let node = self.node(id)?;
        let (prev, container) = (node.prev, node.container);
        match (prev, container) {
            (Some(prev), _) => self.node_mut(prev)?.next = None,
            (None, Some(container)) => {
                if let Some(slot) = self
                    .node_mut(container)?
                    .slots
                    .iter_mut()
                    .find(|s| s.first == Some(id))
                {
                    slot.first = None;
                }
            }
            (None, None) => self.roots.retain(|r| *r != id),
        }
        self.node_mut(id)?.prev = None;
        self.set_chain_container(id, None);
        Ok(())
    }

    fn chain_tail(&self, head: NodeId) -> NodeId {
        self.chain(Some(head)).last().unwrap_or(head)
    }

    fn set_chain_container(&mut self, head: NodeId, container: Option<NodeId>) {
        let members: Vec<NodeId> = self.chain(Some(head)).collect();
        for id in members {
            if let Some(node) = self.get_mut(id) {
                node.container = container;
            }
        }
    }

    /// True if `target` is `head`, follows it, or is nested anywhere below that chain.
    fn subtree_contains(&self, head: NodeId, target: NodeId) -> bool {
        let mut stack = vec![head];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if let Some(node) = self.get(current) {
                stack.extend(node.next);
                stack.extend(node.slots.iter().filter_map(|s| s.first));
            }
        }
        false
    }
}
