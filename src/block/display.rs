use super::{NodeId, Workspace};
use itertools::Itertools;
use std::fmt;

/// A wrapper to display a workspace as a tree of chains and slots.
/// Used by the CLI and when debugging imports.
pub struct DisplayWorkspace<'a> {
    pub workspace: &'a Workspace,
}

impl<'a> fmt::Display for DisplayWorkspace<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Workspace ({} blocks)", self.workspace.len())?;
        let heads = self.workspace.top_level_ordered();
        let chains: Vec<NodeId> = heads
            .into_iter()
            .flat_map(|head| self.workspace.chain(Some(head)))
            .collect();
        self.fmt_chain(&chains, f, "")
    }
}

impl<'a> DisplayWorkspace<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    fn fmt_chain(&self, ids: &[NodeId], f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            self.fmt_as_tree(*id, f, prefix, i + 1 == ids.len())?;
        }
        Ok(())
    }

    /// Formats one node, then each of its slots with the chain nested in it.
    fn fmt_as_tree(
        &self,
        id: NodeId,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        let Some(node) = self.workspace.get(id) else {
            return writeln!(f, "{} <missing>", id);
        };
        let params = node
            .params
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(name, value)| format!("{}={}", name, value))
            .join(" ");
        if params.is_empty() {
            writeln!(f, "{} {}", id, node.kind)?;
        } else {
            writeln!(f, "{} {} {}", id, node.kind, params)?;
        }

        for (i, slot) in node.slots.iter().enumerate() {
            let last_slot = i + 1 == node.slots.len();
            writeln!(
                f,
                "{}{}{}",
                child_prefix,
                if last_slot { "└── " } else { "├── " },
                slot.name
            )?;
            let slot_prefix = format!("{}{}", child_prefix, if last_slot { "    " } else { "│   " });
            let body: Vec<NodeId> = self.workspace.chain(slot.first).collect();
            if body.is_empty() {
                writeln!(f, "{}└── <empty>", slot_prefix)?;
            } else {
                self.fmt_chain(&body, f, &slot_prefix)?;
            }
        }
        Ok(())
    }
}
