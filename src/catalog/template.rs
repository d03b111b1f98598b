use super::field::{FieldSpec, literal_to_regex};
use super::operation::{BlockSchema, Category, Emit, Operation, check_fields};
use super::pattern::{Pattern, PatternMatch};
use crate::block::{ParamMap, StructuredNode};
use crate::error::{CatalogError, InstantiateError};

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Field(usize),
}

/// An operation described by a single line of source text with `{FIELD}` placeholders.
///
/// The text pattern is derived from the template, so the pattern and the
/// generator can never disagree about the shape of a statement.
///
/// ```rust
/// use bitbridge::catalog::{Category, FieldSpec, TemplateOperation};
///
/// let op = TemplateOperation::new(
///     "sleep",
///     Category::BASIC,
///     "sleep({MS})",
///     vec![FieldSpec::integer("MS", 0.0, 3_600_000.0)],
/// )
/// .unwrap();
/// assert_eq!(op.template(), "sleep({MS})");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateOperation {
    kind: String,
    category: Category,
    template: String,
    segments: Vec<Segment>,
    fields: Vec<FieldSpec>,
    pattern: Pattern,
    imports: Vec<&'static str>,
    body: Option<&'static str>,
    tooltip: String,
}

impl TemplateOperation {
    pub fn new(
        kind: &str,
        category: Category,
        template: &str,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, CatalogError> {
        let segments = parse_template(kind, template, &fields)?;

        let mut source = String::new();
        let mut after_field = false;
        for segment in &segments {
            match segment {
                Segment::Literal(text) => {
                    source.push_str(&literal_to_regex(text, after_field));
                    after_field = false;
                }
                Segment::Field(index) => {
                    source.push_str(&fields[*index].regex());
                    after_field = true;
                }
            }
        }
        let pattern = Pattern::new(&source).map_err(|source| CatalogError::Pattern {
            kind: kind.to_string(),
            source,
        })?;

        Ok(Self {
            kind: kind.to_string(),
            category,
            template: template.to_string(),
            segments,
            fields,
            pattern,
            imports: Vec::new(),
            body: None,
            tooltip: String::new(),
        })
    }

    pub fn with_imports(mut self, imports: &[&'static str]) -> Self {
        self.imports.extend_from_slice(imports);
        self
    }

    /// Makes the template a block header whose indented body lands in `slot`.
    pub fn with_body(mut self, slot: &'static str) -> Self {
        self.body = Some(slot);
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn render(&self, params: &ParamMap) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Field(index) => {
                    let field = &self.fields[*index];
                    match params.get(field.name) {
                        Some(value) => field.render(value),
                        None => field.render(&field.default_value()),
                    }
                }
            })
            .collect()
    }
}

impl Operation for TemplateOperation {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn category(&self) -> Category {
        self.category
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn schema(&self) -> BlockSchema {
        let mut message = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => message.push_str(text),
                Segment::Field(index) => message.push_str(&format!("%{}", index + 1)),
            }
        }
        BlockSchema {
            kind: self.kind.clone(),
            category: self.category.name,
            colour: self.category.colour,
            message,
            fields: self.fields.clone(),
            slots: self.body.iter().map(|s| s.to_string()).collect(),
            previous_statement: true,
            next_statement: true,
            tooltip: self.tooltip.clone(),
        }
    }

    fn extract(&self, m: &PatternMatch) -> ParamMap {
        self.fields
            .iter()
            .filter_map(|f| f.extract(m).map(|v| (f.name.to_string(), v)))
            .collect()
    }

    fn instantiate(&self, params: ParamMap) -> Result<StructuredNode, InstantiateError> {
        check_fields(&self.kind, &self.fields, &params)?;
        Ok(StructuredNode::new(self.kind.clone(), params).with_slots(self.body))
    }

    fn generate(&self, node: &StructuredNode) -> Vec<Emit> {
        let mut out = vec![Emit::Line(self.render(&node.params))];
        if let Some(slot) = self.body {
            out.push(Emit::Body(slot.to_string()));
        }
        out
    }

    fn sample(&self) -> String {
        self.render(&ParamMap::default())
    }

    fn imports(&self) -> &[&'static str] {
        &self.imports
    }

    fn body_slot(&self, _node: &StructuredNode) -> Option<String> {
        self.body.map(str::to_string)
    }
}

fn parse_template(
    kind: &str,
    template: &str,
    fields: &[FieldSpec],
) -> Result<Vec<Segment>, CatalogError> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }
        let close = rest[open..]
            .find('}')
            .ok_or_else(|| CatalogError::UnclosedPlaceholder {
                kind: kind.to_string(),
            })?;
        let name = &rest[open + 1..open + close];
        let index = fields.iter().position(|f| f.name == name).ok_or_else(|| {
            CatalogError::UnknownField {
                kind: kind.to_string(),
                field: name.to_string(),
            }
        })?;
        segments.push(Segment::Field(index));
        rest = &rest[open + close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}
