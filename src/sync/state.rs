use serde::Serialize;
use std::fmt;

/// Which representation of the document is the visible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Text,
    Visual,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::Text => write!(f, "text"),
            EditorMode::Visual => write!(f, "visual"),
        }
    }
}

/// Mutual-exclusion guards between the two surfaces.
///
/// `updating_from_visual` is set while generated text is being written to the
/// text surface; `updating_from_text` while the workspace is rebuilt from text.
/// Events the other surface emits in reaction are echoes and are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncFlags {
    pub updating_from_visual: bool,
    pub updating_from_text: bool,
}

/// Counters kept by the orchestrator for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncStats {
    /// Text edits accepted as the new source of truth.
    pub commits: usize,
    pub suppressed_echoes: usize,
    /// Workspaces rebuilt from text.
    pub rebuilds: usize,
    /// Generated texts that differed from the last known text and were written.
    pub regenerations: usize,
    /// Blocks left out of generated text because their kind is unregistered.
    pub omitted_blocks: usize,
    pub refused_switches: usize,
}
