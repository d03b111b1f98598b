use crate::block::Workspace;
use crate::catalog::{BlockSchema, Palette};
use crate::error::SurfaceError;

/// The text-editing widget, seen from the orchestrator.
pub trait TextSurface {
    /// Replaces the buffer content.
    fn set_text(&mut self, text: &str);

    /// Shows a dismissible banner above the buffer.
    fn show_error(&mut self, message: &str);

    fn clear_error(&mut self);
}

/// Result of asking the visual surface to draw a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Done,
    /// Drawing continues in the background; a `SyncEvent::RenderComplete`
    /// follows when it is done.
    Pending,
}

/// The visual-block widget, seen from the orchestrator.
pub trait VisualSurface {
    /// Disposes every block currently shown.
    fn clear(&mut self) -> Result<(), SurfaceError>;

    fn render(&mut self, workspace: &Workspace) -> Result<RenderStatus, SurfaceError>;

    fn set_loading(&mut self, loading: bool);
}

/// Receives block definitions and the toolbox once per session.
pub trait SchemaRegistrar {
    fn register_schemas(
        &mut self,
        schemas: &[BlockSchema],
        palette: &Palette,
    ) -> Result<(), SurfaceError>;
}
