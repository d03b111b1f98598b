mod generator;
mod importer;
mod scanner;
mod validator;

pub use generator::{
    EMPTY_BODY, GenerateOptions, GenerateReport, Generator, OmittedNode, render_node,
};
pub use importer::{ImportReport, Importer, SkippedLine};
pub use scanner::{LineMatch, ScannedLine, match_line, scan};
pub use validator::{UnmatchedLine, ValidationResult, validate, validate_for_import};

/// Normalizes program text for equivalence checks.
///
/// Trailing whitespace, blank lines and runs of inner whitespace outside
/// string literals are ignored. Indentation is kept since it carries nesting.
pub fn normalized(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim_start().is_empty() {
            continue;
        }
        let indent = trimmed.len() - trimmed.trim_start().len();
        out.push_str(&trimmed[..indent]);
        out.push_str(&collapse(trimmed.trim_start()));
        out.push('\n');
    }
    out
}

fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    for c in text.chars() {
        if quote.is_none() && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_word = out.chars().last().is_some_and(|p| p.is_alphanumeric() || p == '_');
            let next_word = c.is_alphanumeric() || c == '_' || c == '"' || c == '\'';
            if prev_word && next_word {
                out.push(' ');
            }
            pending_space = false;
        }
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '"' || c == '\'' => quote = Some(c),
            _ => {}
        }
        out.push(c);
    }
    out
}
