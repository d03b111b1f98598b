use super::clock::{Clock, SystemClock};
use super::debounce::Debouncer;
use super::event::{SyncEvent, SyncHandle};
use super::state::{EditorMode, SyncFlags, SyncStats};
use super::surface::{RenderStatus, TextSurface, VisualSurface};
use crate::block::{Workspace, WorkspaceEvent};
use crate::catalog::Catalog;
use crate::config::SyncConfig;
use crate::convert::{
    GenerateOptions, Generator, ImportReport, ValidationResult, validate_for_import,
};
use crate::error::{SyncError, WorkspaceError};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

/// Keeps the text buffer and the block workspace of one document in sync.
///
/// The orchestrator owns the workspace and the committed text, and is the
/// single consumer of the event channel the views send into through
/// [`SyncHandle`]. Every conversion runs to completion inside one call.
///
/// Writing to one surface makes it report a change back. Those echoes are
/// recognized by the flag that is set while the write happens, drained from
/// the channel and dropped, and the flag is cleared whatever the outcome.
pub struct Orchestrator<T, V, C = SystemClock> {
    catalog: Arc<Catalog>,
    config: SyncConfig,
    text_surface: T,
    visual_surface: V,
    clock: C,

    mode: EditorMode,
    flags: SyncFlags,
    text: String,
    workspace: Workspace,
    debouncer: Debouncer<String>,
    loading_since: Option<Instant>,
    last_validation: Option<ValidationResult>,
    stats: SyncStats,

    sender: Sender<SyncEvent>,
    receiver: Receiver<SyncEvent>,
    deferred: VecDeque<SyncEvent>,
}

impl<T, V, C> Orchestrator<T, V, C>
where
    T: TextSurface,
    V: VisualSurface,
    C: Clock,
{
    pub fn new(
        catalog: Arc<Catalog>,
        config: SyncConfig,
        text_surface: T,
        visual_surface: V,
        clock: C,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        let debouncer = Debouncer::new(config.debounce());
        Self {
            catalog,
            config,
            text_surface,
            visual_surface,
            clock,
            mode: EditorMode::Text,
            flags: SyncFlags::default(),
            text: String::new(),
            workspace: Workspace::new(),
            debouncer,
            loading_since: None,
            last_validation: None,
            stats: SyncStats::default(),
            sender,
            receiver,
            deferred: VecDeque::new(),
        }
    }

    /// A new sender for a view.
    pub fn handle(&self) -> SyncHandle {
        SyncHandle::new(self.sender.clone())
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn flags(&self) -> SyncFlags {
        self.flags
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// The committed program text, the source of truth for the text side.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn text_surface(&self) -> &T {
        &self.text_surface
    }

    pub fn text_surface_mut(&mut self) -> &mut T {
        &mut self.text_surface
    }

    pub fn visual_surface(&self) -> &V {
        &self.visual_surface
    }

    pub fn visual_surface_mut(&mut self) -> &mut V {
        &mut self.visual_surface
    }

    /// The outcome of the last refused switch to blocks, if it is still current.
    pub fn last_validation(&self) -> Option<&ValidationResult> {
        self.last_validation.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_since.is_some()
    }

    pub fn has_pending_edit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Loads a document into the text side and shows it.
    pub fn open(&mut self, text: &str) {
        self.debouncer.cancel();
        self.mode = EditorMode::Text;
        self.text = text.to_string();
        self.flags.updating_from_visual = true;
        self.text_surface.set_text(text);
        self.drain_echoes();
        self.flags.updating_from_visual = false;
        tracing::info!(bytes = text.len(), "document opened");
    }

    /// Dispatches every queued event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let event = match self.deferred.pop_front() {
                Some(event) => event,
                None => match self.receiver.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            handled += 1;
            if let Err(e) = self.handle_event(event) {
                tracing::debug!(error = %e, "event handling failed");
            }
        }
        handled
    }

    pub fn handle_event(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        match event {
            SyncEvent::TextChanged(text) => {
                self.on_text_edited(text);
                Ok(())
            }
            SyncEvent::Visual(event) => self.notify_visual(&event),
            SyncEvent::ToggleMode => self.toggle_mode().map(|_| ()),
            SyncEvent::RenderComplete => {
                self.finish_loading();
                Ok(())
            }
        }
    }

    /// Drives the debounce timer and the loading safety timeout.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(text) = self.debouncer.poll(now) {
            self.commit_text(text);
        }
        if let Some(since) = self.loading_since {
            if now.duration_since(since) >= self.config.loading_timeout() {
                tracing::warn!(
                    timeout_ms = self.config.loading_timeout_ms,
                    "visual surface did not finish rendering; clearing loading indicator"
                );
                self.finish_loading();
            }
        }
    }

    /// A keystroke in the text buffer. Committed once the buffer has been quiet
    /// for the debounce period.
    pub fn on_text_edited(&mut self, text: String) {
        if self.flags.updating_from_visual {
            self.suppress("text edit while writing generated text");
            return;
        }
        if self.mode != EditorMode::Text {
            tracing::debug!("ignoring text edit while blocks are shown");
            return;
        }
        self.debouncer.schedule(text, self.clock.now());
    }

    /// Accepts `text` as the new source of truth.
    pub fn commit_text(&mut self, text: String) {
        if self.flags.updating_from_visual {
            self.suppress("text commit while writing generated text");
            return;
        }
        self.flags.updating_from_text = true;
        if text != self.text {
            self.text = text;
            self.last_validation = None;
            self.stats.commits += 1;
            tracing::debug!(bytes = self.text.len(), "text committed");
        }
        self.flags.updating_from_text = false;
    }

    /// Switches between text and blocks. Any pending text edit is committed first.
    pub fn toggle_mode(&mut self) -> Result<EditorMode, SyncError> {
        if let Some(text) = self.debouncer.flush() {
            self.commit_text(text);
        }
        match self.mode {
            EditorMode::Text => self.enter_visual()?,
            EditorMode::Visual => self.enter_text()?,
        }
        Ok(self.mode)
    }

    /// A change reported by the visual surface.
    ///
    /// Only structural changes made while blocks are shown regenerate the text,
    /// and never while the workspace is being rebuilt from text.
    pub fn notify_visual(&mut self, event: &WorkspaceEvent) -> Result<(), SyncError> {
        if !event.is_semantic() {
            return Ok(());
        }
        if self.flags.updating_from_text {
            self.suppress("workspace event while rebuilding from text");
            return Ok(());
        }
        if self.mode != EditorMode::Visual {
            tracing::debug!(?event, "ignoring workspace event while text is shown");
            return Ok(());
        }
        self.regenerate()
    }

    /// Applies an edit to the workspace as the visual surface would, then
    /// propagates it to the text.
    pub fn edit_workspace<R>(
        &mut self,
        edit: impl FnOnce(&mut Workspace) -> Result<R, WorkspaceError>,
    ) -> Result<R, SyncError> {
        let result = edit(&mut self.workspace)?;
        if self.mode == EditorMode::Visual && !self.flags.updating_from_text {
            self.regenerate()?;
        }
        Ok(result)
    }

    fn enter_visual(&mut self) -> Result<(), SyncError> {
        let (result, report) = validate_for_import(&self.catalog, &self.text, &self.config);
        let report = match (result.error_message(), report) {
            (None, Some(report)) => report,
            (message, _) => {
                tracing::warn!(
                    unmatched = result.unmatched_lines.len(),
                    rejected = result.rejected_lines.len(),
                    "refusing switch to blocks"
                );
                self.text_surface.show_error(&message.unwrap_or_default());
                self.stats.refused_switches += 1;
                self.last_validation = Some(result.clone());
                return Err(SyncError::Unconvertible(result));
            }
        };
        self.text_surface.clear_error();
        self.last_validation = None;

        self.flags.updating_from_text = true;
        self.rebuild(report);
        self.drain_echoes();
        self.flags.updating_from_text = false;

        self.mode = EditorMode::Visual;
        tracing::info!(blocks = self.workspace.len(), "switched to blocks");
        Ok(())
    }

    fn enter_text(&mut self) -> Result<(), SyncError> {
        self.regenerate()?;
        self.mode = EditorMode::Text;
        tracing::info!("switched to text");
        Ok(())
    }

    /// Replaces the workspace with one imported from the committed text.
    /// The new workspace is built aside and swapped in whole.
    fn rebuild(&mut self, report: ImportReport) {
        self.visual_surface.set_loading(true);
        if let Err(e) = self.visual_surface.clear() {
            tracing::warn!(error = %e, "disposing the previous workspace failed");
        }

        let mut workspace = report.workspace;
        workspace.layout_vertical(&self.config.layout);
        self.workspace = workspace;
        self.stats.rebuilds += 1;

        match self.visual_surface.render(&self.workspace) {
            Ok(RenderStatus::Done) => self.visual_surface.set_loading(false),
            Ok(RenderStatus::Pending) => self.loading_since = Some(self.clock.now()),
            Err(e) => {
                tracing::warn!(error = %e, "rendering the workspace failed");
                self.visual_surface.set_loading(false);
            }
        }
    }

    /// Generates text from the workspace and writes it if it changed.
    fn regenerate(&mut self) -> Result<(), SyncError> {
        self.flags.updating_from_visual = true;
        let outcome = self.write_generated();
        self.drain_echoes();
        self.flags.updating_from_visual = false;
        outcome
    }

    fn write_generated(&mut self) -> Result<(), SyncError> {
        let generator = Generator::new(&self.catalog, GenerateOptions::from(&self.config));
        let report = generator.generate_report(&self.workspace).map_err(|e| {
            tracing::error!(error = %e, "text generation failed; keeping the last text");
            e
        })?;
        if !report.is_complete() {
            tracing::warn!(
                omitted = report.omitted.len(),
                "generated text leaves out unregistered blocks"
            );
            self.stats.omitted_blocks += report.omitted.len();
        }
        let text = report.text;
        if text != self.text {
            self.text_surface.set_text(&text);
            self.text = text;
            self.debouncer.cancel();
            self.stats.regenerations += 1;
        }
        Ok(())
    }

    fn finish_loading(&mut self) {
        if self.loading_since.take().is_some() {
            self.visual_surface.set_loading(false);
        }
    }

    /// Drops echoes of the write in progress and keeps everything else for `pump`.
    fn drain_echoes(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                SyncEvent::TextChanged(_) if self.flags.updating_from_visual => {
                    self.suppress("text echo of generated text");
                }
                SyncEvent::Visual(_) if self.flags.updating_from_text => {
                    self.suppress("workspace echo of rebuild");
                }
                other => self.deferred.push_back(other),
            }
        }
    }

    fn suppress(&mut self, what: &str) {
        self.stats.suppressed_echoes += 1;
        tracing::debug!(what, "suppressed echo");
    }
}
