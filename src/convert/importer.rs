use super::scanner::{ScannedLine, match_line, scan};
use super::validator::UnmatchedLine;
use crate::block::{NodeId, StructuredNode, Workspace};
use crate::catalog::{Catalog, Role};
use crate::config::SyncConfig;
use crate::error::WorkspaceError;
use serde::Serialize;

/// A recognized line that was dropped during a best-effort import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: String,
}

/// The workspace built from a program, plus what could not be carried over.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub workspace: Workspace,
    pub skipped: Vec<SkippedLine>,
    pub unmatched: Vec<UnmatchedLine>,
}

impl ImportReport {
    /// True when every statement line became (part of) a block.
    pub fn is_lossless(&self) -> bool {
        self.skipped.is_empty() && self.unmatched.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Container {
    Root,
    Slot { node: NodeId, slot: String },
    /// Body of a header that could not be converted; its lines are dropped.
    Discard,
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    container: Container,
    tail: Option<NodeId>,
}

/// A header line waiting for its indented body.
struct PendingBody {
    header_indent: usize,
    container: Container,
}

/// Builds a fresh `Workspace` from program text.
///
/// Nesting follows indentation and is tracked with an explicit stack of
/// frames, one per open block body, so deeply nested programs never recurse.
/// Lines that match but fail to instantiate are skipped, and so is the body of
/// a header that was skipped.
pub struct Importer<'a> {
    catalog: &'a Catalog,
    config: &'a SyncConfig,
}

impl<'a> Importer<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a SyncConfig) -> Self {
        Self { catalog, config }
    }

    pub fn import(&self, text: &str) -> ImportReport {
        let mut workspace = Workspace::new();
        let mut skipped = Vec::new();
        let mut unmatched = Vec::new();

        let lines = scan(text, self.config.indent_width, self.config.comment_marker);
        let mut stack = vec![Frame {
            indent: lines.first().map(|l| l.indent).unwrap_or(0),
            container: Container::Root,
            tail: None,
        }];
        let mut pending: Option<PendingBody> = None;

        for line in &lines {
            if let Some(body) = pending.take() {
                if line.indent > body.header_indent {
                    stack.push(Frame {
                        indent: line.indent,
                        container: body.container,
                        tail: None,
                    });
                }
            }
            while stack.len() > 1 && stack.last().is_some_and(|f| f.indent > line.indent) {
                stack.pop();
            }
            let Some(frame) = stack.last_mut() else {
                break;
            };
            if frame.container == Container::Root && line.indent < frame.indent {
                frame.indent = line.indent;
            }

            if frame.container == Container::Discard {
                skipped.push(skip(line, "inside a block that could not be converted"));
                continue;
            }
            if frame.indent != line.indent {
                skipped.push(skip(line, "unexpected indentation"));
                pending = discard_body(line);
                continue;
            }

            let Some(found) = match_line(self.catalog, &line.content) else {
                tracing::debug!(line = line.number, text = %line.content, "no operation matches line");
                unmatched.push(UnmatchedLine {
                    line_number: line.number,
                    text: line.raw.trim().to_string(),
                });
                pending = discard_body(line);
                continue;
            };
            let operation = found.operation;

            match operation.role() {
                Role::Placeholder => {}
                Role::Continuation { of } => {
                    let target = frame
                        .tail
                        .and_then(|id| workspace.get_mut(id).map(|node| (id, node)))
                        .filter(|(_, node)| node.kind == of);
                    let extended = match target {
                        Some((id, node)) => operation
                            .extend(node, found.params)
                            .map(|slot| (id, slot))
                            .map_err(|e| e.to_string()),
                        None => Err(format!("'{}' must follow a '{}' block", operation.kind(), of)),
                    };
                    match extended {
                        Ok((node, slot)) => {
                            pending = Some(PendingBody {
                                header_indent: line.indent,
                                container: Container::Slot { node, slot },
                            });
                        }
                        Err(reason) => {
                            tracing::debug!(line = line.number, %reason, "skipping continuation line");
                            skipped.push(skip(line, &reason));
                            pending = discard_body(line);
                        }
                    }
                }
                Role::Statement => match operation.instantiate(found.params) {
                    Ok(node) => {
                        let body_slot = operation.body_slot(&node);
                        match append(&mut workspace, frame, node) {
                            Ok(id) => {
                                pending = body_slot.map(|slot| PendingBody {
                                    header_indent: line.indent,
                                    container: Container::Slot { node: id, slot },
                                });
                            }
                            Err(e) => {
                                tracing::warn!(line = line.number, error = %e, "could not link block");
                                skipped.push(skip(line, &e.to_string()));
                                pending = discard_body(line);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!(line = line.number, error = %e, "skipping line that failed to instantiate");
                        skipped.push(skip(line, &e.to_string()));
                        pending = discard_body(line);
                    }
                },
            }
        }

        ImportReport {
            workspace,
            skipped,
            unmatched,
        }
    }
}

/// Adds `node` at the end of the frame's chain.
fn append(
    workspace: &mut Workspace,
    frame: &mut Frame,
    node: StructuredNode,
) -> Result<NodeId, WorkspaceError> {
    let id = workspace.add(node);
    match (&frame.container, frame.tail) {
        (_, Some(tail)) => workspace.connect_next(tail, id)?,
        (Container::Slot { node, slot }, None) => workspace.connect_into(*node, slot, id)?,
        (Container::Root | Container::Discard, None) => {}
    }
    frame.tail = Some(id);
    Ok(id)
}

fn discard_body(line: &ScannedLine) -> Option<PendingBody> {
    line.is_header().then(|| PendingBody {
        header_indent: line.indent,
        container: Container::Discard,
    })
}

fn skip(line: &ScannedLine, reason: &str) -> SkippedLine {
    SkippedLine {
        line_number: line.number,
        text: line.raw.trim().to_string(),
        reason: reason.to_string(),
    }
}
