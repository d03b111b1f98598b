//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the bitbridge crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use bitbridge::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = SyncConfig::from_file("path/to/config.json")?;
//! let catalog = Catalog::builtin();
//!
//! let program = std::fs::read_to_string("path/to/main.py")?;
//! let result = validate(&catalog, &program, &config);
//! if let Some(message) = result.error_message() {
//!     println!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```

// Catalog
pub use crate::catalog::{
    BlockSchema, Catalog, Category, Emit, FieldKind, FieldSpec, Operation, Palette, Role,
    TemplateOperation,
};

// Block model
pub use crate::block::{
    DisplayWorkspace, NodeId, ParamMap, ParamValue, StructuredNode, Workspace, WorkspaceEvent,
    WorkspaceSnapshot,
};

// Conversion
pub use crate::convert::{
    GenerateOptions, GenerateReport, Generator, ImportReport, Importer, OmittedNode,
    ValidationResult, match_line, validate, validate_for_import,
};

// Synchronization
pub use crate::sync::{
    EditorMode, Orchestrator, RenderStatus, SchemaRegistrar, Session, SyncEvent, SyncFlags,
    SyncHandle, SyncStats, TextSurface, VisualSurface,
};

pub use crate::config::SyncConfig;

// Error types
pub use crate::error::{GenerateError, InstantiateError, SnapshotError, SyncError, WorkspaceError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
