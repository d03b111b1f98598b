pub mod display;
pub mod event;
pub mod node;
pub mod snapshot;
pub mod value;
pub mod workspace;

pub use display::*;
pub use event::*;
pub use node::*;
pub use snapshot::*;
pub use value::*;
pub use workspace::*;
