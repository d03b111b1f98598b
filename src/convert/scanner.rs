use crate::block::ParamMap;
use crate::catalog::{Catalog, Operation};

/// A non-blank, non-comment source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// 1-based line number in the original text.
    pub number: usize,
    /// Leading whitespace width, with tabs expanded to the indent width.
    pub indent: usize,
    /// The statement with indentation and any trailing comment removed.
    pub content: String,
    /// The original line, without its line terminator.
    pub raw: String,
}

impl ScannedLine {
    /// Whether the line opens an indented block.
    pub fn is_header(&self) -> bool {
        self.content.ends_with(':')
    }
}

/// The first catalog entry accepting a line, with its extracted parameters.
pub struct LineMatch<'c> {
    pub operation: &'c dyn Operation,
    pub params: ParamMap,
}

/// Splits program text into candidate statement lines.
///
/// Blank lines and lines holding only a comment are dropped; they are never
/// candidates for matching and so can never be reported as unconvertible.
pub fn scan(text: &str, indent_width: usize, comment_marker: char) -> Vec<ScannedLine> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let content = strip_comment(raw, comment_marker).trim();
            if content.is_empty() {
                return None;
            }
            Some(ScannedLine {
                number: i + 1,
                indent: indent_of(raw, indent_width),
                content: content.to_string(),
                raw: raw.to_string(),
            })
        })
        .collect()
}

/// Returns the first operation, in registration order, whose pattern accepts
/// the whole line.
pub fn match_line<'c>(catalog: &'c Catalog, line: &str) -> Option<LineMatch<'c>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    catalog.all().find_map(|operation| {
        operation.pattern().matches(line).map(|m| LineMatch {
            operation,
            params: operation.extract(&m),
        })
    })
}

fn indent_of(raw: &str, indent_width: usize) -> usize {
    raw.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { indent_width } else { 1 })
        .sum()
}

/// Cuts a trailing comment, ignoring markers inside string literals.
fn strip_comment(line: &str, marker: char) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == marker => return &line[..i],
            None => {}
        }
    }
    line
}
