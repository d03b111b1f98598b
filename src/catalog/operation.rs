use super::field::FieldSpec;
use super::pattern::{Pattern, PatternMatch};
use crate::block::{ParamMap, StructuredNode};
use crate::error::InstantiateError;
use serde::Serialize;

/// A palette category with its display hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub colour: u16,
}

impl Category {
    pub const BASIC: Category = Category::new("Basic", 230);
    pub const DISPLAY: Category = Category::new("Display", 290);
    pub const LOOPS: Category = Category::new("Loops", 120);
    pub const LOGIC: Category = Category::new("Logic", 210);
    pub const PINS: Category = Category::new("Pins", 0);
    pub const MUSIC: Category = Category::new("Music", 20);
    pub const RADIO: Category = Category::new("Radio", 260);

    pub const fn new(name: &'static str, colour: u16) -> Self {
        Self { name, colour }
    }
}

/// How the importer treats a matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Creates a block.
    Statement,
    /// Recognized but produces no block (imports, `pass`).
    Placeholder,
    /// Extends the block of kind `of` directly above it instead of creating one.
    Continuation { of: &'static str },
}

/// One item of generated output for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// A statement line, without indentation or newline.
    Line(String),
    /// The chain nested in the named slot, one level deeper.
    Body(String),
}

/// The visual description of a block, handed to the visual surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSchema {
    pub kind: String,
    pub category: &'static str,
    pub colour: u16,
    /// Label with `%1`, `%2`... standing for fields in order.
    pub message: String,
    pub fields: Vec<FieldSpec>,
    pub slots: Vec<String>,
    pub previous_statement: bool,
    pub next_statement: bool,
    pub tooltip: String,
}

/// Defines the contract for one convertible statement kind.
///
/// Implementations must uphold the round-trip law: for any line the pattern
/// matches, `generate(instantiate(extract(m)))` renders that line again up to
/// whitespace.
pub trait Operation: Send + Sync {
    fn kind(&self) -> &str;

    fn category(&self) -> Category;

    fn pattern(&self) -> &Pattern;

    fn schema(&self) -> BlockSchema;

    fn extract(&self, m: &PatternMatch) -> ParamMap;

    fn instantiate(&self, params: ParamMap) -> Result<StructuredNode, InstantiateError>;

    fn generate(&self, node: &StructuredNode) -> Vec<Emit>;

    /// A canonical line this operation recognizes.
    fn sample(&self) -> String;

    fn role(&self) -> Role {
        Role::Statement
    }

    /// Import lines the generated program needs for this operation.
    fn imports(&self) -> &[&'static str] {
        &[]
    }

    /// The slot a header line opens for the indented lines below it.
    fn body_slot(&self, _node: &StructuredNode) -> Option<String> {
        None
    }

    /// Applies a continuation line to the block it continues and returns the
    /// slot that receives the continuation's indented body.
    fn extend(
        &self,
        _target: &mut StructuredNode,
        _params: ParamMap,
    ) -> Result<String, InstantiateError> {
        Err(InstantiateError::OrphanContinuation {
            kind: self.kind().to_string(),
            expected: "statement".to_string(),
        })
    }
}

/// Checks every field of `params` against its field definition, in declaration order.
pub(crate) fn check_fields(
    kind: &str,
    fields: &[FieldSpec],
    params: &ParamMap,
) -> Result<(), InstantiateError> {
    for field in fields {
        let value = params
            .get(field.name)
            .ok_or_else(|| InstantiateError::MissingParam {
                kind: kind.to_string(),
                param: field.name.to_string(),
            })?;
        field.check(kind, value)?;
    }
    Ok(())
}
