use crate::block::{NodeId, StructuredNode, Workspace};
use crate::catalog::{Catalog, Emit};
use crate::config::SyncConfig;
use crate::error::GenerateError;
use ahash::AHashSet;
use itertools::Itertools;

/// The statement emitted for a block body that has no children.
pub const EMPTY_BODY: &str = "pass";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Emit the import lines declared by the operations in use.
    pub imports: bool,
    pub indent_width: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            imports: true,
            indent_width: 4,
        }
    }
}

impl From<&SyncConfig> for GenerateOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            imports: config.generate_imports,
            indent_width: config.indent_width,
        }
    }
}

/// Generated text plus the blocks that had to be left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub text: String,
    /// Nodes whose kind is not in the catalog. Each was dropped together with
    /// everything nested in its slots; the rest of its chain was kept.
    pub omitted: Vec<OmittedNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmittedNode {
    pub node: NodeId,
    pub kind: String,
}

impl GenerateReport {
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

enum Work {
    Node { id: NodeId, depth: usize },
    Line { text: String, depth: usize },
}

/// Renders a workspace back into program text.
///
/// Generation only reads the workspace. Nested bodies are expanded through an
/// explicit work stack rather than recursion. A block whose kind is not
/// registered is left out with its nested bodies and logged; broken links
/// abort generation.
pub struct Generator<'a> {
    catalog: &'a Catalog,
    options: GenerateOptions,
}

impl<'a> Generator<'a> {
    pub fn new(catalog: &'a Catalog, options: GenerateOptions) -> Self {
        Self { catalog, options }
    }

    pub fn generate(&self, workspace: &Workspace) -> Result<String, GenerateError> {
        self.generate_report(workspace).map(|report| report.text)
    }

    pub fn generate_report(&self, workspace: &Workspace) -> Result<GenerateReport, GenerateError> {
        let mut body = String::new();
        let mut imports: Vec<&'static str> = Vec::new();
        let mut visited: AHashSet<NodeId> = AHashSet::new();
        let mut omitted = Vec::new();

        let mut stack: Vec<Work> = workspace
            .top_level_ordered()
            .into_iter()
            .rev()
            .map(|id| Work::Node { id, depth: 0 })
            .collect();

        while let Some(work) = stack.pop() {
            match work {
                Work::Line { text, depth } => self.write_line(&mut body, &text, depth),
                Work::Node { id, depth } => {
                    if !visited.insert(id) {
                        return Err(GenerateError::Revisited(id));
                    }
                    let node = workspace.get(id).ok_or(GenerateError::DanglingNode(id))?;
                    if let Some(next) = node.next {
                        stack.push(Work::Node { id: next, depth });
                    }
                    let Some(operation) = self.catalog.lookup(&node.kind) else {
                        tracing::error!(node = %id, kind = %node.kind, "leaving out an unregistered block");
                        omitted.push(OmittedNode {
                            node: id,
                            kind: node.kind.clone(),
                        });
                        continue;
                    };

                    for import in operation.imports() {
                        if !imports.contains(import) {
                            imports.push(import);
                        }
                    }
                    for emit in operation.generate(node).into_iter().rev() {
                        stack.extend(self.expand(workspace, id, node, emit, depth)?);
                    }
                }
            }
        }

        let text = if self.options.imports && !imports.is_empty() {
            let preamble = imports.iter().map(|line| format!("{}\n", line)).join("");
            format!("{}\n{}", preamble, body)
        } else {
            body
        };
        Ok(GenerateReport { text, omitted })
    }

    fn expand(
        &self,
        workspace: &Workspace,
        id: NodeId,
        node: &StructuredNode,
        emit: Emit,
        depth: usize,
    ) -> Result<Vec<Work>, GenerateError> {
        let slot = match emit {
            Emit::Line(text) => return Ok(vec![Work::Line { text, depth }]),
            Emit::Body(slot) => slot,
        };
        let head = node
            .slot(&slot)
            .ok_or_else(|| GenerateError::UnknownSlot { node: id, slot })?
            .first;
        let placeholder = Work::Line {
            text: EMPTY_BODY.to_string(),
            depth: depth + 1,
        };
        let Some(child) = head else {
            return Ok(vec![placeholder]);
        };
        let child = Work::Node {
            id: child,
            depth: depth + 1,
        };
        // A body whose blocks are all left out still needs a statement.
        let renders_something = workspace.chain(head).any(|member| {
            workspace
                .get(member)
                .is_none_or(|n| self.catalog.lookup(&n.kind).is_some())
        });
        Ok(if renders_something {
            vec![child]
        } else {
            vec![child, placeholder]
        })
    }

    fn write_line(&self, out: &mut String, text: &str, depth: usize) {
        out.push_str(&" ".repeat(self.options.indent_width * depth));
        out.push_str(text.trim_end_matches('\n'));
        out.push('\n');
    }
}

/// The header lines a single node renders to, without its nested bodies.
pub fn render_node(catalog: &Catalog, node: &StructuredNode) -> Option<Vec<String>> {
    let operation = catalog.lookup(&node.kind)?;
    Some(
        operation
            .generate(node)
            .into_iter()
            .filter_map(|emit| match emit {
                Emit::Line(text) => Some(text),
                Emit::Body(_) => None,
            })
            .collect(),
    )
}
