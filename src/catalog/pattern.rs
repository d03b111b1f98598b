use ahash::AHashMap;
use regex::Regex;

/// A compiled, full-line text pattern.
///
/// Matching is a pure function of the input: a `Pattern` keeps no position
/// between calls, so the same line always yields the same captures.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
}

/// The named captures of one successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    text: String,
    captures: AHashMap<String, String>,
}

impl PatternMatch {
    /// The full matched line.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures.get(name).map(String::as_str)
    }
}

impl Pattern {
    /// Compiles `source` anchored to the whole line.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!(r"^(?:{})$", source))?;
        Ok(Self {
            regex,
            source: source.to_string(),
        })
    }

    /// The pattern as written, without the implicit anchors.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matches a single trimmed line.
    pub fn matches(&self, line: &str) -> Option<PatternMatch> {
        let caps = self.regex.captures(line)?;
        let captures = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Some(PatternMatch {
            text: line.to_string(),
            captures,
        })
    }
}
