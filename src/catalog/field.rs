use super::pattern::PatternMatch;
use crate::block::ParamValue;
use crate::error::InstantiateError;
use serde::Serialize;

/// The value domain of a block field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    /// A quoted string literal.
    Text,
    /// A bare Python name, such as a loop variable.
    Identifier,
    Choice {
        options: Vec<&'static str>,
    },
}

/// A named, typed field of a block.
///
/// A field drives all three directions of conversion: it contributes a capture
/// group to the text pattern, types the captured string, and renders the value
/// back into source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

// Secondary capture group for single-quoted text literals.
const SINGLE_QUOTED_SUFFIX: &str = "__sq";

impl FieldSpec {
    pub fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number {
                min: None,
                max: None,
                integer: false,
            },
        }
    }

    pub fn integer(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: FieldKind::Number {
                min: Some(min),
                max: Some(max),
                integer: true,
            },
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }

    pub fn identifier(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Identifier,
        }
    }

    pub fn choice(name: &'static str, options: &[&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Choice {
                options: options.to_vec(),
            },
        }
    }

    /// The regex fragment capturing this field.
    pub fn regex(&self) -> String {
        let name = self.name;
        match &self.kind {
            FieldKind::Number { integer: true, .. } => format!(r"(?P<{name}>-?\d+)"),
            FieldKind::Number { .. } => format!(r"(?P<{name}>-?\d+(?:\.\d+)?)"),
            FieldKind::Text => format!(
                r#"(?:"(?P<{name}>[^"\\]*)"|'(?P<{name}{SINGLE_QUOTED_SUFFIX}>[^'\\]*)')"#
            ),
            FieldKind::Identifier => format!(r"(?P<{name}>[A-Za-z_][A-Za-z0-9_]*)"),
            FieldKind::Choice { options } => {
                let alternatives: Vec<String> = options
                    .iter()
                    .map(|o| format!("(?:{})", literal_to_regex(o, false)))
                    .collect();
                format!("(?P<{name}>{})", alternatives.join("|"))
            }
        }
    }

    /// Types the raw capture for this field. Returns `None` if the field did not participate.
    pub fn extract(&self, m: &PatternMatch) -> Option<ParamValue> {
        let raw = m.get(self.name).or_else(|| {
            matches!(self.kind, FieldKind::Text)
                .then(|| m.get(&format!("{}{SINGLE_QUOTED_SUFFIX}", self.name)))
                .flatten()
        })?;
        Some(self.parse(raw))
    }

    /// Converts a raw string into a typed value without validating it.
    pub fn parse(&self, raw: &str) -> ParamValue {
        match &self.kind {
            FieldKind::Number { .. } => raw
                .trim()
                .parse::<f64>()
                .map(ParamValue::Number)
                .unwrap_or_else(|_| ParamValue::Text(raw.to_string())),
            FieldKind::Text | FieldKind::Identifier => ParamValue::Text(raw.to_string()),
            FieldKind::Choice { options } => {
                let wanted = squash(raw);
                options
                    .iter()
                    .find(|o| squash(o) == wanted)
                    .map(|o| ParamValue::Choice(o.to_string()))
                    .unwrap_or_else(|| ParamValue::Text(raw.to_string()))
            }
        }
    }

    /// Reads a field value from a JSON snapshot.
    pub fn from_json(&self, value: &serde_json::Value) -> Option<ParamValue> {
        match (&self.kind, value) {
            (FieldKind::Number { .. }, serde_json::Value::Number(n)) => {
                n.as_f64().map(ParamValue::Number)
            }
            (_, serde_json::Value::String(s)) => Some(self.parse(s)),
            _ => None,
        }
    }

    /// Validates a value against this field's domain.
    pub fn check(&self, kind: &str, value: &ParamValue) -> Result<(), InstantiateError> {
        let invalid = |message: String| InstantiateError::InvalidParam {
            kind: kind.to_string(),
            param: self.name.to_string(),
            value: value.clone(),
            message,
        };

        match (&self.kind, value) {
            (FieldKind::Number { min, max, integer }, ParamValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(invalid("expected a finite number".to_string()));
                }
                if *integer && n.fract() != 0.0 {
                    return Err(invalid("expected a whole number".to_string()));
                }
                if let Some(min) = min.filter(|min| n < min) {
                    return Err(invalid(format!("must be at least {}", ParamValue::Number(min))));
                }
                if let Some(max) = max.filter(|max| n > max) {
                    return Err(invalid(format!("must be at most {}", ParamValue::Number(max))));
                }
                Ok(())
            }
            (FieldKind::Number { .. }, _) => Err(invalid("expected a number".to_string())),
            (FieldKind::Text, ParamValue::Text(s)) => {
                // Mirrors the capture in `regex`, which has no escapes.
                if s.contains(['\n', '\r', '\\']) || (s.contains('"') && s.contains('\'')) {
                    Err(invalid("text cannot be written as a single literal".to_string()))
                } else {
                    Ok(())
                }
            }
            (FieldKind::Identifier, ParamValue::Text(s)) => {
                let mut chars = s.chars();
                let valid = chars
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
                if valid {
                    Ok(())
                } else {
                    Err(invalid("expected a Python name".to_string()))
                }
            }
            (FieldKind::Choice { options }, ParamValue::Choice(c))
                if options.iter().any(|o| *o == c.as_str()) =>
            {
                Ok(())
            }
            (FieldKind::Choice { options }, _) => {
                Err(invalid(format!("expected one of: {}", options.join(", "))))
            }
            (FieldKind::Text | FieldKind::Identifier, _) => {
                Err(invalid("expected text".to_string()))
            }
        }
    }

    /// Renders a value as source text.
    pub fn render(&self, value: &ParamValue) -> String {
        match (&self.kind, value) {
            (FieldKind::Text, ParamValue::Text(s)) if s.contains('"') => format!("'{}'", s),
            (FieldKind::Text, v) => format!("\"{}\"", v),
            (_, v) => v.to_string(),
        }
    }

    /// A representative value, used for schema defaults and generated programs.
    pub fn default_value(&self) -> ParamValue {
        match &self.kind {
            FieldKind::Number { min, max, .. } => {
                ParamValue::Number(min.unwrap_or(0.0).max(0.0).min(max.unwrap_or(f64::MAX)))
            }
            FieldKind::Text => ParamValue::Text("Hello".to_string()),
            FieldKind::Identifier => ParamValue::Text("i".to_string()),
            FieldKind::Choice { options } => {
                ParamValue::Choice(options.first().copied().unwrap_or_default().to_string())
            }
        }
    }
}

/// Turns literal template text into a whitespace-tolerant regex.
///
/// Whitespace after a word character must stay (`if x` is not `ifx`), other
/// whitespace becomes optional, and optional whitespace is allowed around
/// Python punctuation.
pub(crate) fn literal_to_regex(text: &str, after_word: bool) -> String {
    let mut out = String::new();
    let mut prev_is_word = after_word;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            out.push_str(if prev_is_word { r"\s+" } else { r"\s*" });
            prev_is_word = false;
            continue;
        }
        if matches!(c, '(' | ')' | ',' | '=' | ':' | '[' | ']') {
            out.push_str(r"\s*");
            out.push_str(&regex::escape(&c.to_string()));
            out.push_str(r"\s*");
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
        prev_is_word = c.is_alphanumeric() || c == '_';
    }
    out
}

/// Removes whitespace outside of string literals.
fn squash(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => continue,
            _ => {}
        }
        out.push(c);
    }
    out
}
