use crate::block::WorkspaceEvent;
use std::sync::mpsc::Sender;

/// Everything the surfaces can tell the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The text buffer now holds this program.
    TextChanged(String),
    Visual(WorkspaceEvent),
    /// The user asked to switch between text and blocks.
    ToggleMode,
    /// A render reported as pending has finished.
    RenderComplete,
}

/// Sending half of the orchestrator's event channel, handed to the views.
///
/// Sends never block. A send after the orchestrator is gone is dropped and
/// reported as `false`.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    sender: Sender<SyncEvent>,
}

impl SyncHandle {
    pub(crate) fn new(sender: Sender<SyncEvent>) -> Self {
        Self { sender }
    }

    pub fn send(&self, event: SyncEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn text_changed(&self, text: impl Into<String>) -> bool {
        self.send(SyncEvent::TextChanged(text.into()))
    }

    pub fn visual(&self, event: WorkspaceEvent) -> bool {
        self.send(SyncEvent::Visual(event))
    }

    pub fn toggle_mode(&self) -> bool {
        self.send(SyncEvent::ToggleMode)
    }

    pub fn render_complete(&self) -> bool {
        self.send(SyncEvent::RenderComplete)
    }
}
