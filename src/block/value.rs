use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

/// A primitive parameter value carried by a block field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    /// One option out of a closed set, such as an image name or a button.
    Choice(String),
}

/// Field name to value, produced by a pattern match and consumed by `instantiate`.
pub type ParamMap = AHashMap<String, ParamValue>;

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload of a `Text` or `Choice` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) | ParamValue::Choice(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }
}

// Integral numbers print without a fractional part so `sleep(100)` stays `sleep(100)`.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Choice(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Number(n as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}
