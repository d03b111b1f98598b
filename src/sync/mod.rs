//! Editor synchronization: the mode state machine between the text buffer
//! and the block workspace, and the traits the two views implement.

mod clock;
mod debounce;
mod event;
mod orchestrator;
mod session;
mod state;
mod surface;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::Debouncer;
pub use event::{SyncEvent, SyncHandle};
pub use orchestrator::Orchestrator;
pub use session::Session;
pub use state::{EditorMode, SyncFlags, SyncStats};
pub use surface::{RenderStatus, SchemaRegistrar, TextSurface, VisualSurface};
