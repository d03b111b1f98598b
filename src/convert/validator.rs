use super::importer::{ImportReport, Importer, SkippedLine};
use super::scanner::{match_line, scan};
use crate::catalog::Catalog;
use crate::config::SyncConfig;
use serde::Serialize;

/// A line no catalog entry accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedLine {
    /// 1-based.
    pub line_number: usize,
    pub text: String,
}

/// Outcome of checking a whole program against the catalog.
///
/// `unmatched_lines` are lines no pattern accepts. `rejected_lines` are lines
/// whose shape is recognized but which still cannot become blocks: a value out
/// of range, unexpected indentation, an `elif` with no `if` above it. Either
/// kind makes the program invalid, since a switch to blocks would drop them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub unmatched_lines: Vec<UnmatchedLine>,
    pub rejected_lines: Vec<SkippedLine>,
}

impl ValidationResult {
    pub fn from_unmatched(unmatched_lines: Vec<UnmatchedLine>) -> Self {
        Self::new(unmatched_lines, Vec::new())
    }

    pub fn new(unmatched_lines: Vec<UnmatchedLine>, rejected_lines: Vec<SkippedLine>) -> Self {
        Self {
            is_valid: unmatched_lines.is_empty() && rejected_lines.is_empty(),
            unmatched_lines,
            rejected_lines,
        }
    }

    /// The banner text shown when a switch to blocks is refused.
    ///
    /// A single failure names its line; several failures give the count and
    /// the first failing line. Unrecognized lines are reported ahead of
    /// rejected ones.
    pub fn error_message(&self) -> Option<String> {
        if let Some(first) = self.unmatched_lines.first() {
            return Some(match self.unmatched_lines.len() {
                1 => format!(
                    "Line {} can't be converted to blocks: `{}`",
                    first.line_number, first.text
                ),
                n => format!(
                    "{} lines can't be converted to blocks (first at line {}: `{}`)",
                    n, first.line_number, first.text
                ),
            });
        }
        let first = self.rejected_lines.first()?;
        Some(match self.rejected_lines.len() {
            1 => format!(
                "Line {} can't be converted to blocks: `{}` ({})",
                first.line_number, first.text, first.reason
            ),
            n => format!(
                "{} lines can't be converted to blocks (first at line {}: `{}`, {})",
                n, first.line_number, first.text, first.reason
            ),
        })
    }
}

/// Checks that every statement line of `text` would survive a switch to blocks.
///
/// This is the all-or-nothing gate in front of that switch. It has no state of
/// its own: validating the same text twice gives the same result.
pub fn validate(catalog: &Catalog, text: &str, config: &SyncConfig) -> ValidationResult {
    validate_for_import(catalog, text, config).0
}

/// Validates `text` and, when every line is recognized, imports it once to
/// find the lines the import would drop.
///
/// The import is handed back so a caller that goes on to build blocks does
/// not convert the text a second time. It is `None` when some line matched
/// no pattern.
pub fn validate_for_import(
    catalog: &Catalog,
    text: &str,
    config: &SyncConfig,
) -> (ValidationResult, Option<ImportReport>) {
    let unmatched: Vec<UnmatchedLine> = scan(text, config.indent_width, config.comment_marker)
        .into_iter()
        .filter(|line| match_line(catalog, &line.content).is_none())
        .map(|line| UnmatchedLine {
            line_number: line.number,
            text: line.raw.trim().to_string(),
        })
        .collect();
    if !unmatched.is_empty() {
        return (ValidationResult::from_unmatched(unmatched), None);
    }
    let report = Importer::new(catalog, config).import(text);
    let result = ValidationResult::new(Vec::new(), report.skipped.clone());
    (result, Some(report))
}
