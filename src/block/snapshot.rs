use super::{NodeId, ParamMap, ParamValue, Workspace};
use crate::catalog::control::{IF_ELSE, add_elif_arm, add_else_arm, arm_count, has_else};
use crate::catalog::Catalog;
use crate::error::SnapshotError;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A workspace in the nested block-JSON shape visual editors exchange.
///
/// ```json
/// { "blocks": { "languageVersion": 0, "blocks": [
///     { "type": "forever", "id": "b0", "x": 20, "y": 20,
///       "inputs": { "DO": { "block": { "type": "display_clear", "id": "b1" } } } }
/// ] } }
/// ```
///
/// Every statement nests inside the one before it, so even a flat program
/// gives a structure as deep as it is long. Parsing, serialization and drop
/// are all safe at any depth.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub blocks: BlockList,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockList {
    #[serde(default, rename = "languageVersion", alias = "language_version")]
    pub language_version: u32,
    #[serde(default)]
    pub blocks: Vec<BlockState>,
}

/// One block with everything nested below and after it.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Connection>,
    #[serde(
        default,
        rename = "extraState",
        alias = "extra_state",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_state: Option<ArmState>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub block: Box<BlockState>,
}

// Unlinks descendants onto a worklist so dropping a long chain does not recurse.
impl Drop for BlockState {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut block) = pending.pop() {
            detach_children(&mut block, &mut pending);
        }
    }
}

fn detach_children(block: &mut BlockState, pending: &mut Vec<Box<BlockState>>) {
    pending.extend(block.next.take().map(|c| c.block));
    pending.extend(std::mem::take(&mut block.inputs).into_values().map(|c| c.block));
}

/// Arm layout of an `if_else` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmState {
    #[serde(default, rename = "elseIfCount", alias = "else_if_count")]
    pub else_if_count: usize,
    #[serde(default, rename = "hasElse", alias = "has_else")]
    pub has_else: bool,
}

enum Attach {
    Root,
    Next(NodeId),
    Slot(NodeId, String),
}

impl WorkspaceSnapshot {
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let heads = workspace.top_level_ordered();
        let mut built = export_blocks(workspace, &heads);
        let blocks = heads.iter().filter_map(|head| built.remove(head)).collect();
        Self {
            blocks: BlockList {
                language_version: 0,
                blocks,
            },
        }
    }

    /// Parses a snapshot. The recursion limit is lifted and the stack grows
    /// on the heap as nesting deepens.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let snapshot = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::pretty(&mut out);
        self.serialize(serde_stacker::Serializer::new(&mut ser))?;
        Ok(String::from_utf8(out)?)
    }

    /// Rebuilds a workspace, validating every block against the catalog.
    pub fn into_workspace(&self, catalog: &Catalog) -> Result<Workspace, SnapshotError> {
        let mut workspace = Workspace::new();
        let mut stack: Vec<(&BlockState, Attach)> = self
            .blocks
            .blocks
            .iter()
            .rev()
            .map(|block| (block, Attach::Root))
            .collect();

        while let Some((block, attach)) = stack.pop() {
            let operation = catalog.lookup(&block.kind).ok_or_else(|| SnapshotError::UnknownKind {
                id: block.id.clone(),
                kind: block.kind.clone(),
            })?;
            let schema = operation.schema();
            let invalid = |source| SnapshotError::Instantiate {
                id: block.id.clone(),
                source,
            };

            let mut params = ParamMap::default();
            for (name, raw) in &block.fields {
                // Extra arm conditions share the type of the first one.
                let spec = schema
                    .fields
                    .iter()
                    .find(|f| f.name == name.as_str())
                    .or_else(|| (block.kind == IF_ELSE).then(|| schema.fields.first()).flatten());
                match spec.and_then(|spec| spec.from_json(raw)) {
                    Some(value) => {
                        params.insert(name.clone(), value);
                    }
                    None => tracing::debug!(block = %block.id, field = %name, "ignoring unknown field"),
                }
            }

            let mut node = operation.instantiate(params).map_err(invalid)?;
            if block.kind == IF_ELSE {
                let arms = block.extra_state.unwrap_or_default();
                let condition = schema.fields.first();
                for index in 1..=arms.else_if_count {
                    let value = node
                        .param(&format!("IF{}", index))
                        .cloned()
                        .or_else(|| condition.map(|c| c.default_value()))
                        .unwrap_or(ParamValue::Choice(String::new()));
                    if let Some(condition) = condition {
                        condition.check(&block.kind, &value).map_err(invalid)?;
                    }
                    add_elif_arm(&mut node, value);
                }
                if arms.has_else {
                    add_else_arm(&mut node);
                }
            }

            let id = workspace.add(node);
            if let (Some(x), Some(y)) = (block.x, block.y) {
                workspace.set_position(id, x, y)?;
            }
            match attach {
                Attach::Root => {}
                Attach::Next(prev) => workspace.connect_next(prev, id)?,
                Attach::Slot(parent, slot) => workspace.connect_into(parent, &slot, id)?,
            }

            if let Some(next) = &block.next {
                stack.push((next.block.as_ref(), Attach::Next(id)));
            }
            for (slot, input) in block.inputs.iter().rev() {
                stack.push((input.block.as_ref(), Attach::Slot(id, slot.clone())));
            }
        }
        Ok(workspace)
    }
}

/// Exports every node reachable from `heads`, children before parents.
///
/// Nodes are listed in pre-order with an explicit stack, then built in reverse
/// so each node's `next` and slot heads are finished before the node itself.
/// The map holds only blocks not yet linked into another block.
fn export_blocks(workspace: &Workspace, heads: &[NodeId]) -> AHashMap<NodeId, BlockState> {
    let mut order = Vec::new();
    let mut seen = AHashSet::new();
    let mut stack: Vec<NodeId> = heads.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(node) = workspace.get(id) else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        stack.extend(node.next);
        stack.extend(node.slots.iter().rev().filter_map(|slot| slot.first));
    }

    let mut built: AHashMap<NodeId, BlockState> = AHashMap::with_capacity(order.len());
    for id in order.into_iter().rev() {
        let Some(node) = workspace.get(id) else {
            continue;
        };
        let inputs = node
            .slots
            .iter()
            .filter_map(|slot| {
                let block = built.remove(&slot.first?)?;
                Some((
                    slot.name.clone(),
                    Connection {
                        block: Box::new(block),
                    },
                ))
            })
            .collect();
        let next = node
            .next
            .and_then(|next| built.remove(&next))
            .map(|block| Connection {
                block: Box::new(block),
            });
        let extra_state = (node.kind == IF_ELSE).then(|| ArmState {
            else_if_count: arm_count(node).saturating_sub(1),
            has_else: has_else(node),
        });
        let block = BlockState {
            kind: node.kind.clone(),
            id: format!("b{}", id.0),
            x: node.position.map(|p| p.x),
            y: node.position.map(|p| p.y),
            fields: node
                .params
                .iter()
                .map(|(name, value)| (name.clone(), param_to_json(value)))
                .collect(),
            inputs,
            next,
            extra_state,
        };
        built.insert(id, block);
    }
    built
}

fn param_to_json(value: &ParamValue) -> serde_json::Value {
    match value {
        ParamValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => serde_json::Value::from(*n as i64),
        ParamValue::Number(n) => serde_json::Value::from(*n),
        ParamValue::Text(s) | ParamValue::Choice(s) => serde_json::Value::from(s.as_str()),
    }
}
