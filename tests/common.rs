//! Common test utilities: small catalogs, recording surfaces and a wired orchestrator.
use bitbridge::error::SurfaceError;
use bitbridge::prelude::*;
use bitbridge::sync::ManualClock;
use std::sync::Arc;

/// The canonical program over the two custom operations.
#[allow(dead_code)]
pub const OP_PROGRAM: &str = "op_a(1, 2)\nop_b(3)\n";

/// A catalog with two plain operations, `op_a(A, B)` and `op_b(C)`, and no imports.
#[allow(dead_code)]
pub fn custom_catalog() -> Catalog {
    let op_a = TemplateOperation::new(
        "op_a",
        Category::BASIC,
        "op_a({A}, {B})",
        vec![FieldSpec::number("A"), FieldSpec::number("B")],
    )
    .unwrap();
    let op_b = TemplateOperation::new(
        "op_b",
        Category::BASIC,
        "op_b({C})",
        vec![FieldSpec::integer("C", 0.0, 9.0)],
    )
    .unwrap();
    Catalog::builder()
        .with_operation(Box::new(op_a))
        .with_operation(Box::new(op_b))
        .build()
}

/// A program using loops, a multi-arm conditional and every statement category.
#[allow(dead_code)]
pub const MICROBIT_PROGRAM: &str = r#"from microbit import *
import radio
import music

radio.on()
radio.config(group=7)
while True:
    if button_a.is_pressed():
        display.scroll("Hello")
        music.play(music.NYAN)
    elif button_b.is_pressed():
        display.show(Image.HEART)
        radio.send("ping")
    else:
        display.clear()
    for i in range(3):
        pin0.write_digital(1)
        sleep(100)
"#;

/// Text view that records what it was told, and echoes writes back like a real
/// editor widget does.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockText {
    pub text: String,
    pub error: Option<String>,
    pub set_calls: usize,
    pub echo: Option<SyncHandle>,
}

impl TextSurface for MockText {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.set_calls += 1;
        if let Some(handle) = &self.echo {
            handle.text_changed(text);
        }
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Visual view that records calls and reports a `Created` event per rendered block.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockVisual {
    pub clears: usize,
    pub renders: usize,
    pub rendered_blocks: usize,
    pub loading: bool,
    pub fail_clear: bool,
    pub pending: bool,
    pub echo: Option<SyncHandle>,
}

impl VisualSurface for MockVisual {
    fn clear(&mut self) -> std::result::Result<(), SurfaceError> {
        self.clears += 1;
        if self.fail_clear {
            return Err(SurfaceError::Dispose("toolkit already disposed".to_string()));
        }
        Ok(())
    }

    fn render(&mut self, workspace: &Workspace) -> std::result::Result<RenderStatus, SurfaceError> {
        self.renders += 1;
        self.rendered_blocks = workspace.len();
        if let Some(handle) = &self.echo {
            for (id, _) in workspace.iter() {
                handle.visual(WorkspaceEvent::Created { node: id });
            }
        }
        Ok(if self.pending {
            RenderStatus::Pending
        } else {
            RenderStatus::Done
        })
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockRegistrar {
    pub calls: usize,
    pub registered: usize,
    pub fail: bool,
}

impl SchemaRegistrar for MockRegistrar {
    fn register_schemas(
        &mut self,
        schemas: &[BlockSchema],
        _palette: &Palette,
    ) -> std::result::Result<(), SurfaceError> {
        self.calls += 1;
        if self.fail {
            return Err(SurfaceError::Registration("toolkit not ready".to_string()));
        }
        self.registered = schemas.len();
        Ok(())
    }
}

#[allow(dead_code)]
pub type TestOrchestrator = Orchestrator<MockText, MockVisual, ManualClock>;

/// An orchestrator over `catalog` with echoing mock views and a manual clock,
/// holding `text` as its document.
#[allow(dead_code)]
pub fn orchestrator(catalog: Catalog, text: &str) -> (TestOrchestrator, ManualClock) {
    let clock = ManualClock::new();
    let mut orchestrator = Orchestrator::new(
        Arc::new(catalog),
        SyncConfig::default(),
        MockText::default(),
        MockVisual::default(),
        clock.clone(),
    );
    let handle = orchestrator.handle();
    orchestrator.text_surface_mut().echo = Some(handle.clone());
    orchestrator.visual_surface_mut().echo = Some(handle);
    orchestrator.open(text);
    (orchestrator, clock)
}

/// Imports `text` with the default configuration.
#[allow(dead_code)]
pub fn import(catalog: &Catalog, text: &str) -> ImportReport {
    Importer::new(catalog, &SyncConfig::default()).import(text)
}

/// Generates text with the default configuration.
#[allow(dead_code)]
pub fn generate(catalog: &Catalog, workspace: &Workspace) -> String {
    Generator::new(catalog, GenerateOptions::default())
        .generate(workspace)
        .unwrap()
}
