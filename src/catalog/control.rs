use super::field::{FieldSpec, literal_to_regex};
use super::operation::{BlockSchema, Category, Emit, Operation, Role, check_fields};
use super::pattern::{Pattern, PatternMatch};
use crate::block::{ParamMap, ParamValue, Slot, StructuredNode};
use crate::error::{CatalogError, InstantiateError};

/// Condition shapes accepted by `if`, `elif` and `while`.
pub const CONDITIONS: &[&str] = &[
    "True",
    "button_a.is_pressed()",
    "button_b.is_pressed()",
    "button_a.was_pressed()",
    "button_b.was_pressed()",
    "pin0.is_touched()",
    "pin1.is_touched()",
    "pin2.is_touched()",
    "pin_logo.is_touched()",
    "accelerometer.was_gesture(\"shake\")",
    "accelerometer.was_gesture(\"up\")",
    "accelerometer.was_gesture(\"down\")",
    "accelerometer.was_gesture(\"left\")",
    "accelerometer.was_gesture(\"right\")",
    "accelerometer.was_gesture(\"face up\")",
    "accelerometer.was_gesture(\"face down\")",
];

pub const IF_ELSE: &str = "if_else";
const ELSE_SLOT: &str = "ELSE";

pub fn condition_field(name: &'static str) -> FieldSpec {
    FieldSpec::choice(name, CONDITIONS)
}

fn arm_condition(index: usize) -> String {
    format!("IF{}", index)
}

fn arm_slot(index: usize) -> String {
    format!("DO{}", index)
}

/// Number of condition arms (`if` plus every `elif`) declared by an `if_else` node.
pub fn arm_count(node: &StructuredNode) -> usize {
    node.slots.iter().filter(|s| s.name.starts_with("DO")).count()
}

pub fn has_else(node: &StructuredNode) -> bool {
    node.slot(ELSE_SLOT).is_some()
}

/// Appends an `elif` arm to an `if_else` node and returns the new arm's slot.
pub fn add_elif_arm(node: &mut StructuredNode, condition: ParamValue) -> String {
    let index = arm_count(node);
    node.params.insert(arm_condition(index), condition);
    let slot = arm_slot(index);
    let at = node
        .slots
        .iter()
        .position(|s| s.name == ELSE_SLOT)
        .unwrap_or(node.slots.len());
    node.slots.insert(
        at,
        Slot {
            name: slot.clone(),
            first: None,
        },
    );
    slot
}

/// Adds the default arm to an `if_else` node.
pub fn add_else_arm(node: &mut StructuredNode) -> String {
    if !has_else(node) {
        node.slots.push(Slot {
            name: ELSE_SLOT.to_string(),
            first: None,
        });
    }
    ELSE_SLOT.to_string()
}

fn header_pattern(
    kind: &str,
    keyword: &str,
    field: Option<&FieldSpec>,
) -> Result<Pattern, CatalogError> {
    let source = match field {
        Some(field) => format!(
            "{}{}{}",
            literal_to_regex(&format!("{} ", keyword), false),
            field.regex(),
            literal_to_regex(":", true)
        ),
        None => literal_to_regex(&format!("{}:", keyword), false),
    };
    Pattern::new(&source).map_err(|source| CatalogError::Pattern {
        kind: kind.to_string(),
        source,
    })
}

/// The multi-arm conditional: `if`, any number of `elif`, optional `else`.
///
/// Arms are stored as `IF0..IFn` condition params with matching `DO0..DOn`
/// slots, and an optional trailing `ELSE` slot.
pub struct IfElseOperation {
    pattern: Pattern,
    condition: FieldSpec,
}

impl IfElseOperation {
    pub fn new() -> Result<Self, CatalogError> {
        let condition = condition_field("IF0");
        Ok(Self {
            pattern: header_pattern(IF_ELSE, "if", Some(&condition))?,
            condition,
        })
    }
}

impl Operation for IfElseOperation {
    fn kind(&self) -> &str {
        IF_ELSE
    }

    fn category(&self) -> Category {
        Category::LOGIC
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn schema(&self) -> BlockSchema {
        BlockSchema {
            kind: IF_ELSE.to_string(),
            category: Category::LOGIC.name,
            colour: Category::LOGIC.colour,
            message: "if %1:".to_string(),
            fields: vec![self.condition.clone()],
            slots: vec![arm_slot(0)],
            previous_statement: true,
            next_statement: true,
            tooltip: "Runs the first arm whose condition holds, otherwise the else arm.".to_string(),
        }
    }

    fn extract(&self, m: &PatternMatch) -> ParamMap {
        self.condition
            .extract(m)
            .map(|v| (self.condition.name.to_string(), v))
            .into_iter()
            .collect()
    }

    fn instantiate(&self, params: ParamMap) -> Result<StructuredNode, InstantiateError> {
        check_fields(IF_ELSE, std::slice::from_ref(&self.condition), &params)?;
        Ok(StructuredNode::new(IF_ELSE, params).with_slots([arm_slot(0)]))
    }

    fn generate(&self, node: &StructuredNode) -> Vec<Emit> {
        let mut out = Vec::new();
        for index in 0..arm_count(node) {
            let condition = node
                .param(&arm_condition(index))
                .map(|v| self.condition.render(v))
                .unwrap_or_else(|| CONDITIONS[0].to_string());
            let keyword = if index == 0 { "if" } else { "elif" };
            out.push(Emit::Line(format!("{} {}:", keyword, condition)));
            out.push(Emit::Body(arm_slot(index)));
        }
        if has_else(node) {
            out.push(Emit::Line("else:".to_string()));
            out.push(Emit::Body(ELSE_SLOT.to_string()));
        }
        out
    }

    fn sample(&self) -> String {
        "if button_a.is_pressed():".to_string()
    }

    fn imports(&self) -> &[&'static str] {
        &["from microbit import *"]
    }

    fn body_slot(&self, _node: &StructuredNode) -> Option<String> {
        Some(arm_slot(0))
    }
}

/// A line that continues the `if_else` block above it.
pub struct ArmOperation {
    kind: &'static str,
    keyword: &'static str,
    pattern: Pattern,
    condition: Option<FieldSpec>,
}

impl ArmOperation {
    pub fn elif() -> Result<Self, CatalogError> {
        let condition = condition_field("COND");
        Ok(Self {
            kind: "elif_arm",
            keyword: "elif",
            pattern: header_pattern("elif_arm", "elif", Some(&condition))?,
            condition: Some(condition),
        })
    }

    pub fn otherwise() -> Result<Self, CatalogError> {
        Ok(Self {
            kind: "else_arm",
            keyword: "else",
            pattern: header_pattern("else_arm", "else", None)?,
            condition: None,
        })
    }

    fn header(&self, params: &ParamMap) -> String {
        match &self.condition {
            Some(field) => {
                let value = params
                    .get(field.name)
                    .cloned()
                    .unwrap_or_else(|| field.default_value());
                format!("{} {}:", self.keyword, field.render(&value))
            }
            None => format!("{}:", self.keyword),
        }
    }
}

impl Operation for ArmOperation {
    fn kind(&self) -> &str {
        self.kind
    }

    fn category(&self) -> Category {
        Category::LOGIC
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn schema(&self) -> BlockSchema {
        BlockSchema {
            kind: self.kind.to_string(),
            category: Category::LOGIC.name,
            colour: Category::LOGIC.colour,
            message: match self.condition {
                Some(_) => format!("{} %1:", self.keyword),
                None => format!("{}:", self.keyword),
            },
            fields: self.condition.iter().cloned().collect(),
            slots: vec!["DO".to_string()],
            previous_statement: false,
            next_statement: false,
            tooltip: format!("Adds an {} arm to the if block above.", self.keyword),
        }
    }

    fn extract(&self, m: &PatternMatch) -> ParamMap {
        self.condition
            .iter()
            .filter_map(|f| f.extract(m).map(|v| (f.name.to_string(), v)))
            .collect()
    }

    /// Standalone arms only exist while importing; as a node they keep their
    /// header text so a stray arm still renders the way it was written.
    fn instantiate(&self, params: ParamMap) -> Result<StructuredNode, InstantiateError> {
        check_fields(self.kind, self.condition.as_slice(), &params)?;
        Ok(StructuredNode::new(self.kind, params).with_slots(["DO"]))
    }

    fn generate(&self, node: &StructuredNode) -> Vec<Emit> {
        vec![
            Emit::Line(self.header(&node.params)),
            Emit::Body("DO".to_string()),
        ]
    }

    fn sample(&self) -> String {
        match &self.condition {
            Some(_) => format!("{} button_b.is_pressed():", self.keyword),
            None => format!("{}:", self.keyword),
        }
    }

    fn role(&self) -> Role {
        Role::Continuation { of: IF_ELSE }
    }

    fn extend(
        &self,
        target: &mut StructuredNode,
        params: ParamMap,
    ) -> Result<String, InstantiateError> {
        if target.kind != IF_ELSE {
            return Err(InstantiateError::OrphanContinuation {
                kind: self.kind.to_string(),
                expected: IF_ELSE.to_string(),
            });
        }
        if has_else(target) {
            return Err(InstantiateError::ArmAfterDefault {
                kind: self.kind.to_string(),
                target: IF_ELSE.to_string(),
            });
        }
        check_fields(self.kind, self.condition.as_slice(), &params)?;
        match &self.condition {
            Some(field) => {
                let condition = params
                    .get(field.name)
                    .cloned()
                    .unwrap_or_else(|| field.default_value());
                Ok(add_elif_arm(target, condition))
            }
            None => Ok(add_else_arm(target)),
        }
    }
}

/// A recognized line that produces no block, such as an import or `pass`.
///
/// The whole line is kept in the `LINE` param so that instantiating and
/// generating a placeholder still reproduces it.
pub struct PlaceholderOperation {
    kind: &'static str,
    pattern: Pattern,
    sample: &'static str,
}

impl PlaceholderOperation {
    pub fn new(
        kind: &'static str,
        source: &str,
        sample: &'static str,
    ) -> Result<Self, CatalogError> {
        let pattern = Pattern::new(source).map_err(|source| CatalogError::Pattern {
            kind: kind.to_string(),
            source,
        })?;
        Ok(Self {
            kind,
            pattern,
            sample,
        })
    }

    pub fn imports() -> Result<Self, CatalogError> {
        Self::new(
            "import_module",
            r"from\s+[A-Za-z_][\w.]*\s+import\s+(?:\*|[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)|import\s+[A-Za-z_][\w.]*(?:\s*,\s*[A-Za-z_][\w.]*)*",
            "from microbit import *",
        )
    }

    pub fn pass() -> Result<Self, CatalogError> {
        Self::new("pass", "pass", "pass")
    }
}

impl Operation for PlaceholderOperation {
    fn kind(&self) -> &str {
        self.kind
    }

    fn category(&self) -> Category {
        Category::BASIC
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn schema(&self) -> BlockSchema {
        BlockSchema {
            kind: self.kind.to_string(),
            category: Category::BASIC.name,
            colour: Category::BASIC.colour,
            message: self.sample.to_string(),
            fields: Vec::new(),
            slots: Vec::new(),
            previous_statement: false,
            next_statement: false,
            tooltip: String::new(),
        }
    }

    fn extract(&self, m: &PatternMatch) -> ParamMap {
        let mut params = ParamMap::default();
        params.insert("LINE".to_string(), ParamValue::Text(m.text().to_string()));
        params
    }

    fn instantiate(&self, params: ParamMap) -> Result<StructuredNode, InstantiateError> {
        Ok(StructuredNode::new(self.kind, params))
    }

    fn generate(&self, node: &StructuredNode) -> Vec<Emit> {
        let line = node
            .param("LINE")
            .and_then(ParamValue::as_str)
            .unwrap_or(self.sample);
        vec![Emit::Line(line.to_string())]
    }

    fn sample(&self) -> String {
        self.sample.to_string()
    }

    fn role(&self) -> Role {
        Role::Placeholder
    }
}
