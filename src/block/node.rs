use super::{ParamMap, ParamValue};
use serde::Serialize;
use std::fmt;

/// Index of a node inside a `Workspace` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named statement input holding the head of a nested chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub name: String,
    pub first: Option<NodeId>,
}

/// Canvas coordinates of a top-level node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One recognized operation inside the visual workspace.
///
/// A node only names its operation by `kind`; the definition itself lives in the
/// `Catalog`. Links (`next`, `prev`, `container`) are maintained by the workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredNode {
    pub kind: String,
    pub params: ParamMap,
    pub slots: Vec<Slot>,
    pub next: Option<NodeId>,
    pub prev: Option<NodeId>,
    /// The node whose slot holds this node's chain. `None` for top-level chains.
    pub container: Option<NodeId>,
    pub position: Option<Position>,
}

impl StructuredNode {
    pub fn new(kind: impl Into<String>, params: ParamMap) -> Self {
        Self {
            kind: kind.into(),
            params,
            slots: Vec::new(),
            next: None,
            prev: None,
            container: None,
            position: None,
        }
    }

    /// Declares empty statement slots, in order.
    pub fn with_slots<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slots.extend(names.into_iter().map(|name| Slot {
            name: name.into(),
            first: None,
        }));
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    /// Head of the chain nested in `name`, if the slot exists and is filled.
    pub fn slot_head(&self, name: &str) -> Option<NodeId> {
        self.slot(name).and_then(|s| s.first)
    }
}
