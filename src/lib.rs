//! # bitbridge - Text/Block Synchronization for micro:bit Programs
//!
//! **bitbridge** keeps two views of one micro:bit MicroPython program in sync:
//! the program text and a workspace of visual blocks. The user can switch
//! between them without losing meaning.
//!
//! ## Core Workflow
//!
//! 1.  **Catalog**: every convertible statement shape is an [`catalog::Operation`]
//!     registered in a [`catalog::Catalog`], with a text pattern, a block schema, a
//!     parameter extractor, a generator and a block constructor.
//! 2.  **Validate**: [`convert::validate`] checks that every line of a program is
//!     recognized before a switch to blocks is allowed.
//! 3.  **Import**: [`convert::Importer`] builds a [`block::Workspace`] from text,
//!     skipping recognized lines whose values are out of range.
//! 4.  **Generate**: [`convert::Generator`] renders the workspace back to text.
//! 5.  **Synchronize**: [`sync::Orchestrator`] drives both conversions from editor
//!     events and prevents the two views from feeding back into each other.
//!
//! ## Quick Start
//!
//! ```rust
//! use bitbridge::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let catalog = Catalog::builtin();
//! let config = SyncConfig::default();
//! let program = "from microbit import *\n\nwhile True:\n    display.scroll(\"Hi\")\n    sleep(500)\n";
//!
//! // Every line is recognized, so a switch to blocks is allowed.
//! assert!(validate(&catalog, program, &config).is_valid);
//!
//! // The import line produces no block; the loop holds the other two.
//! let report = Importer::new(&catalog, &config).import(program);
//! assert_eq!(report.workspace.len(), 3);
//!
//! let text = Generator::new(&catalog, GenerateOptions::from(&config)).generate(&report.workspace)?;
//! assert_eq!(text, program);
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod prelude;
pub mod sync;
