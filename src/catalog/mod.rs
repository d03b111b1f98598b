use ahash::AHashMap;
use serde::Serialize;

mod builtin;
pub mod control;
mod field;
mod operation;
mod palette;
mod pattern;
mod template;

pub use builtin::{IMAGES, MELODIES, STATEMENT_KINDS, create_operation_by_kind};
pub use control::{ArmOperation, CONDITIONS, IfElseOperation, PlaceholderOperation};
pub use field::{FieldKind, FieldSpec};
pub use operation::{BlockSchema, Category, Emit, Operation, Role};
pub use palette::{Palette, PaletteCategory};
pub use pattern::{Pattern, PatternMatch};
pub use template::TemplateOperation;

/// Documentation entry pairing a kind with its recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternDoc {
    pub kind: String,
    pub pattern: String,
    pub sample: String,
}

/// The registry of convertible operations.
///
/// Registration order is match priority: when two patterns accept the same
/// line, the operation registered first wins. Re-registering a kind replaces
/// the earlier definition in place, keeping its priority.
pub struct Catalog {
    operations: Vec<Box<dyn Operation>>,
    index: AHashMap<String, usize>,
    palette: Palette,
}

pub struct CatalogBuilder {
    operations: Vec<Box<dyn Operation>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Registers the micro:bit operations ahead of anything added later.
    pub fn with_builtins(mut self) -> Self {
        match builtin::builtin_operations() {
            Ok(ops) => self.operations.extend(ops),
            Err(e) => tracing::error!(error = %e, "built-in operations failed to compile"),
        }
        self
    }

    pub fn with_operation(mut self, operation: Box<dyn Operation>) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn build(self) -> Catalog {
        let mut catalog = Catalog {
            operations: Vec::new(),
            index: AHashMap::new(),
            palette: Palette::default(),
        };
        for op in self.operations {
            catalog.insert(op);
        }
        catalog.refresh_palette();
        catalog
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The built-in micro:bit catalog.
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    /// Adds an operation. A duplicate kind replaces the earlier definition.
    pub fn register(&mut self, operation: Box<dyn Operation>) {
        self.insert(operation);
        self.refresh_palette();
    }

    fn insert(&mut self, operation: Box<dyn Operation>) {
        let kind = operation.kind().to_string();
        match self.index.get(&kind) {
            Some(&slot) => {
                tracing::debug!(kind = %kind, "replacing registered operation");
                self.operations[slot] = operation;
            }
            None => {
                self.index.insert(kind, self.operations.len());
                self.operations.push(operation);
            }
        }
    }

    fn refresh_palette(&mut self) {
        self.palette = Palette::from_operations(&self.operations);
    }

    pub fn lookup(&self, kind: &str) -> Option<&dyn Operation> {
        self.index.get(kind).map(|&i| self.operations[i].as_ref())
    }

    /// All operations in match-priority order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Operation> {
        self.operations.iter().map(|op| op.as_ref())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Schemas of every block-producing operation, in priority order.
    pub fn schemas(&self) -> Vec<BlockSchema> {
        self.all()
            .filter(|op| op.role() == Role::Statement)
            .map(|op| op.schema())
            .collect()
    }

    /// Kind to pattern source, for help and tooling surfaces.
    pub fn pattern_docs(&self) -> Vec<PatternDoc> {
        self.all()
            .map(|op| PatternDoc {
                kind: op.kind().to_string(),
                pattern: op.pattern().source().to_string(),
                sample: op.sample(),
            })
            .collect()
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("kinds", &self.all().map(|op| op.kind()).collect::<Vec<_>>())
            .finish()
    }
}
