use super::NodeId;
use serde::Serialize;

/// Notifications from the visual surface about its workspace.
///
/// Only structural events change the program; viewport and selection events
/// are reported too but never trigger text generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkspaceEvent {
    Created { node: NodeId },
    Deleted { node: NodeId },
    /// A node was connected, disconnected or dragged.
    Moved { node: NodeId },
    FieldChanged { node: NodeId, field: String },
    ViewportChanged,
    SelectionChanged { node: Option<NodeId> },
}

impl WorkspaceEvent {
    pub fn is_semantic(&self) -> bool {
        match self {
            WorkspaceEvent::Created { .. }
            | WorkspaceEvent::Deleted { .. }
            | WorkspaceEvent::Moved { .. }
            | WorkspaceEvent::FieldChanged { .. } => true,
            WorkspaceEvent::ViewportChanged | WorkspaceEvent::SelectionChanged { .. } => false,
        }
    }
}
