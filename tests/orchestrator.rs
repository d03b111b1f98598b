//! Tests for the text/visual synchronization state machine.
mod common;
use bitbridge::prelude::*;
use common::{MockRegistrar, MockText, MockVisual, OP_PROGRAM, custom_catalog, orchestrator};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_switch_to_visual_builds_linked_nodes() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    assert_eq!(orch.toggle_mode().unwrap(), EditorMode::Visual);

    let workspace = orch.workspace();
    assert_eq!(workspace.len(), 2);
    let head = workspace.roots()[0];
    let ids: Vec<NodeId> = workspace.chain(Some(head)).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(workspace.get(ids[1]).unwrap().kind, "op_b");

    let visual = orch.visual_surface();
    assert_eq!(visual.clears, 1);
    assert_eq!(visual.renders, 1);
    assert_eq!(visual.rendered_blocks, 2);
    assert!(!visual.loading);
    assert_eq!(orch.stats().rebuilds, 1);
}

#[test]
fn test_switch_back_regenerates_equivalent_text() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    assert_eq!(orch.toggle_mode().unwrap(), EditorMode::Text);
    assert_eq!(orch.text(), OP_PROGRAM);
    // Nothing changed, so the text view was not rewritten.
    assert_eq!(orch.text_surface().set_calls, 1);
}

#[test]
fn test_refused_switch_stays_in_text_and_names_the_line() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), "op_a(1, 2)\nfoo()\n");
    let err = orch.toggle_mode().unwrap_err();

    assert!(matches!(err, SyncError::Unconvertible(ref r) if r.unmatched_lines.len() == 1));
    assert_eq!(orch.mode(), EditorMode::Text);
    let banner = orch.text_surface().error.clone().unwrap();
    assert!(banner.contains("Line 2"));
    assert!(banner.contains("foo()"));
    assert_eq!(err.to_string(), banner);

    assert!(orch.workspace().is_empty());
    assert_eq!(orch.visual_surface().renders, 0);
    assert_eq!(orch.stats().refused_switches, 1);
    assert!(orch.last_validation().is_some());
}

#[test]
fn test_switch_refused_when_import_would_drop_lines() {
    let program = "sleep(100)\n    sleep(200)\nsleep(-5)\ndisplay.show(Image.HEART)\n";
    let (mut orch, _clock) = orchestrator(Catalog::builtin(), program);

    let err = orch.toggle_mode().unwrap_err();
    assert!(matches!(err, SyncError::Unconvertible(ref r) if r.rejected_lines.len() == 2));
    assert_eq!(orch.mode(), EditorMode::Text);
    assert_eq!(orch.text(), program);
    assert!(orch.workspace().is_empty());
    assert_eq!(orch.visual_surface().renders, 0);
    assert_eq!(orch.stats().refused_switches, 1);

    let banner = orch.text_surface().error.clone().unwrap();
    assert!(
        banner.starts_with("2 lines can't be converted to blocks (first at line 2: `sleep(200)`"),
        "unexpected banner: {banner}"
    );
}

#[test]
fn test_banner_cleared_after_successful_switch() {
    let (mut orch, clock) = orchestrator(custom_catalog(), "foo()\n");
    assert!(orch.toggle_mode().is_err());

    orch.handle().text_changed(OP_PROGRAM);
    orch.pump();
    clock.advance(Duration::from_millis(300));
    orch.tick();
    orch.toggle_mode().unwrap();

    assert_eq!(orch.mode(), EditorMode::Visual);
    assert_eq!(orch.text_surface().error, None);
    assert!(orch.last_validation().is_none());
}

#[test]
fn test_visual_edit_does_not_feed_back() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    let rebuilds = orch.stats().rebuilds;

    let op_b = orch
        .workspace()
        .iter()
        .find(|(_, n)| n.kind == "op_b")
        .map(|(id, _)| id)
        .unwrap();
    orch.edit_workspace(|ws| ws.set_param(op_b, "C", ParamValue::Number(5.0)))
        .unwrap();

    assert_eq!(orch.text(), "op_a(1, 2)\nop_b(5)\n");
    assert_eq!(orch.text_surface().text, "op_a(1, 2)\nop_b(5)\n");
    assert_eq!(orch.stats().regenerations, 1);

    // The text view's echo was drained and dropped while the write was in flight.
    assert!(orch.stats().suppressed_echoes >= 1);
    assert_eq!(orch.pump(), 0);
    assert!(!orch.has_pending_edit());
    assert_eq!(orch.stats().rebuilds, rebuilds);
    assert_eq!(orch.stats().commits, 0);
    assert_eq!(orch.flags(), SyncFlags::default());
}

#[test]
fn test_rebuild_echoes_do_not_regenerate() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    // Two Created events came back from the render and were dropped.
    assert!(orch.stats().suppressed_echoes >= 2);
    assert_eq!(orch.stats().regenerations, 0);
    assert_eq!(orch.pump(), 0);
}

#[test]
fn test_unchanged_generation_is_not_written() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    let calls = orch.text_surface().set_calls;

    orch.handle()
        .visual(WorkspaceEvent::Moved { node: NodeId(0) });
    orch.pump();
    assert_eq!(orch.text_surface().set_calls, calls);
    assert_eq!(orch.stats().regenerations, 0);
}

#[test]
fn test_non_semantic_events_are_ignored() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    let before = orch.stats();
    orch.handle().visual(WorkspaceEvent::ViewportChanged);
    orch.handle()
        .visual(WorkspaceEvent::SelectionChanged { node: None });
    assert_eq!(orch.pump(), 2);
    assert_eq!(orch.stats(), before);
}

#[test]
fn test_debounced_commit() {
    let (mut orch, clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    let handle = orch.handle();

    handle.text_changed("op_b(1)\n");
    orch.pump();
    orch.tick();
    assert_eq!(orch.text(), OP_PROGRAM);

    clock.advance(Duration::from_millis(299));
    orch.tick();
    assert_eq!(orch.text(), OP_PROGRAM);

    clock.advance(Duration::from_millis(1));
    orch.tick();
    assert_eq!(orch.text(), "op_b(1)\n");
    assert_eq!(orch.stats().commits, 1);
}

#[test]
fn test_new_keystroke_restarts_the_timer() {
    let (mut orch, clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    let handle = orch.handle();

    handle.text_changed("op_b(1)\n");
    orch.pump();
    clock.advance(Duration::from_millis(200));
    handle.text_changed("op_b(2)\n");
    orch.pump();
    clock.advance(Duration::from_millis(200));
    orch.tick();
    assert_eq!(orch.text(), OP_PROGRAM);

    clock.advance(Duration::from_millis(100));
    orch.tick();
    assert_eq!(orch.text(), "op_b(2)\n");
    assert_eq!(orch.stats().commits, 1);
}

#[test]
fn test_toggle_commits_pending_edit_first() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.handle().text_changed("op_b(7)\n");
    orch.handle().toggle_mode();
    orch.pump();

    assert_eq!(orch.mode(), EditorMode::Visual);
    assert_eq!(orch.workspace().len(), 1);
    assert_eq!(orch.text(), "op_b(7)\n");
}

#[test]
fn test_text_edits_ignored_while_blocks_are_shown() {
    let (mut orch, clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    orch.handle().text_changed("op_b(1)\n");
    orch.pump();
    clock.advance(Duration::from_secs(1));
    orch.tick();
    assert_eq!(orch.text(), OP_PROGRAM);
    assert!(!orch.has_pending_edit());
}

#[test]
fn test_disposal_failure_is_not_fatal() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.visual_surface_mut().fail_clear = true;
    assert_eq!(orch.toggle_mode().unwrap(), EditorMode::Visual);
    assert_eq!(orch.workspace().len(), 2);
}

#[test]
fn test_loading_indicator_times_out() {
    let (mut orch, clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.visual_surface_mut().pending = true;
    orch.toggle_mode().unwrap();
    assert!(orch.is_loading());
    assert!(orch.visual_surface().loading);

    clock.advance(Duration::from_millis(4999));
    orch.tick();
    assert!(orch.is_loading());

    clock.advance(Duration::from_millis(1));
    orch.tick();
    assert!(!orch.is_loading());
    assert!(!orch.visual_surface().loading);
}

#[test]
fn test_render_complete_clears_loading() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.visual_surface_mut().pending = true;
    orch.toggle_mode().unwrap();
    orch.handle().render_complete();
    orch.pump();
    assert!(!orch.is_loading());
    assert!(!orch.visual_surface().loading);
}

#[test]
fn test_unregistered_block_is_left_out_of_text() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();

    orch.edit_workspace(|ws| Ok(ws.add(StructuredNode::new("teleport", ParamMap::default()))))
        .unwrap();
    assert_eq!(orch.stats().omitted_blocks, 1);
    assert_eq!(orch.text(), OP_PROGRAM);
    assert_eq!(orch.flags(), SyncFlags::default());

    // The document can still leave blocks.
    assert_eq!(orch.toggle_mode().unwrap(), EditorMode::Text);
    assert_eq!(orch.text(), OP_PROGRAM);
}

#[test]
fn test_workspace_edit_errors_propagate() {
    let (mut orch, _clock) = orchestrator(custom_catalog(), OP_PROGRAM);
    orch.toggle_mode().unwrap();
    let err = orch
        .edit_workspace(|ws| ws.set_param(NodeId(99), "C", ParamValue::Number(1.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Workspace(WorkspaceError::NodeNotFound(NodeId(99)))
    ));
}

#[test]
fn test_builtin_program_round_trips_through_modes() {
    let (mut orch, _clock) = orchestrator(Catalog::builtin(), common::MICROBIT_PROGRAM);
    orch.toggle_mode().unwrap();
    orch.toggle_mode().unwrap();
    assert_eq!(orch.text(), common::MICROBIT_PROGRAM);
}

#[test]
fn test_session_registers_schemas_once() {
    let mut session = Session::new(
        Arc::new(Catalog::builtin()),
        SyncConfig::default(),
        MockRegistrar::default(),
    );
    assert!(!session.schemas_registered());

    let clock = bitbridge::sync::ManualClock::new();
    let first = session.open_document("sleep(1)\n", MockText::default(), MockVisual::default(), clock.clone());
    let second = session.open_document("", MockText::default(), MockVisual::default(), clock);

    assert!(session.schemas_registered());
    assert_eq!(session.registrar().calls, 1);
    assert_eq!(session.registrar().registered, 18);
    assert_eq!(first.text(), "sleep(1)\n");
    assert_eq!(first.text_surface().text, "sleep(1)\n");
    assert_eq!(second.mode(), EditorMode::Text);
}

#[test]
fn test_session_retries_failed_registration() {
    let mut session = Session::new(
        Arc::new(custom_catalog()),
        SyncConfig::default(),
        MockRegistrar {
            fail: true,
            ..MockRegistrar::default()
        },
    );
    let clock = bitbridge::sync::ManualClock::new();
    let orch = session.open_document(OP_PROGRAM, MockText::default(), MockVisual::default(), clock);
    assert!(!session.schemas_registered());
    assert_eq!(orch.text(), OP_PROGRAM);

    assert!(session.register_schemas().is_err());
    assert_eq!(session.registrar().calls, 2);
}
