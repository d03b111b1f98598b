use crate::block::{NodeId, ParamValue};
use crate::convert::ValidationResult;
use thiserror::Error;

/// Errors raised while defining catalog operations.
#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Template for '{kind}' references unknown field '{field}'")]
    UnknownField { kind: String, field: String },

    #[error("Template for '{kind}' has an unclosed placeholder")]
    UnclosedPlaceholder { kind: String },

    #[error("Pattern for '{kind}' failed to compile: {source}")]
    Pattern {
        kind: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while turning an extracted `ParamMap` into a `StructuredNode`.
///
/// During a best-effort import these never reach the user: the offending line
/// is skipped and the rest of the program is still converted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstantiateError {
    #[error("Operation '{kind}' is missing required parameter '{param}'")]
    MissingParam { kind: String, param: String },

    #[error("Operation '{kind}' received an invalid value '{value}' for '{param}': {message}")]
    InvalidParam {
        kind: String,
        param: String,
        value: ParamValue,
        message: String,
    },

    #[error("'{kind}' must follow a '{expected}' block at the same indentation")]
    OrphanContinuation { kind: String, expected: String },

    #[error("'{kind}' cannot follow an '{target}' block that already has an else arm")]
    ArmAfterDefault { kind: String, target: String },
}

/// Errors that can occur while rendering a workspace back into text.
///
/// These indicate broken links in the workspace and are never expected in
/// normal use. Unregistered blocks are not an error; they are left out and
/// reported through `GenerateReport`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Node {0} is linked from the workspace but no longer exists")]
    DanglingNode(NodeId),

    #[error("Node {node} references slot '{slot}', which its operation does not declare")]
    UnknownSlot { node: NodeId, slot: String },

    #[error("Node {0} is reachable twice; the workspace links form a cycle")]
    Revisited(NodeId),
}

/// Errors from structural edits to a `Workspace`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkspaceError {
    #[error("Node {0} was not found in the workspace")]
    NodeNotFound(NodeId),

    #[error("Node {node} has no statement slot named '{slot}'")]
    SlotNotFound { node: NodeId, slot: String },

    #[error("Connecting node {child} under node {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Failures reported by the text or visual surface. Always logged, never surfaced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Visual surface failed to dispose its blocks: {0}")]
    Dispose(String),

    #[error("Visual surface failed to render the workspace: {0}")]
    Render(String),

    #[error("Schema registration failed: {0}")]
    Registration(String),
}

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from converting between a `Workspace` and its JSON snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to parse workspace JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialized workspace is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Block '{id}' has an unregistered type '{kind}'")]
    UnknownKind { id: String, kind: String },

    #[error("Block '{id}' is invalid: {source}")]
    Instantiate {
        id: String,
        #[source]
        source: InstantiateError,
    },

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Top-level errors surfaced by the synchronization orchestrator.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("{}", .0.error_message().unwrap_or_default())]
    Unconvertible(ValidationResult),

    #[error("Text generation failed: {0}")]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}
