//! Tests for text generation from a workspace.
mod common;
use bitbridge::catalog::control::{add_elif_arm, add_else_arm};
use bitbridge::convert::render_node;
use bitbridge::prelude::*;
use common::{custom_catalog, generate};

fn node(catalog: &Catalog, line: &str) -> StructuredNode {
    let m = match_line(catalog, line).unwrap();
    m.operation.instantiate(m.params).unwrap()
}

#[test]
fn test_empty_body_emits_pass() {
    let catalog = Catalog::builtin();
    let mut workspace = Workspace::new();
    workspace.add(node(&catalog, "while True:"));
    assert_eq!(
        generate(&catalog, &workspace),
        "from microbit import *\n\nwhile True:\n    pass\n"
    );
}

#[test]
fn test_arms_in_order_with_default_last() {
    let catalog = Catalog::builtin();
    let mut conditional = node(&catalog, "if pin0.is_touched():");
    add_elif_arm(
        &mut conditional,
        ParamValue::Choice("pin1.is_touched()".to_string()),
    );
    add_else_arm(&mut conditional);
    add_elif_arm(
        &mut conditional,
        ParamValue::Choice("pin2.is_touched()".to_string()),
    );

    let mut workspace = Workspace::new();
    let id = workspace.add(conditional);
    let clear = workspace.add(node(&catalog, "display.clear()"));
    workspace.connect_into(id, "ELSE", clear).unwrap();

    let options = GenerateOptions {
        imports: false,
        indent_width: 4,
    };
    let text = Generator::new(&catalog, options).generate(&workspace).unwrap();
    assert_eq!(
        text,
        "if pin0.is_touched():\n    pass\nelif pin1.is_touched():\n    pass\nelif pin2.is_touched():\n    pass\nelse:\n    display.clear()\n"
    );
}

#[test]
fn test_nested_bodies_are_indented() {
    let catalog = Catalog::builtin();
    let mut workspace = Workspace::new();
    let outer = workspace.add(node(&catalog, "while True:"));
    let inner = workspace.add(node(&catalog, "for i in range(2):"));
    let show = workspace.add(node(&catalog, "display.show(1)"));
    let pause = workspace.add(node(&catalog, "sleep(5)"));
    workspace.connect_into(outer, "DO", inner).unwrap();
    workspace.connect_into(inner, "DO", show).unwrap();
    workspace.connect_next(inner, pause).unwrap();

    let options = GenerateOptions {
        imports: false,
        indent_width: 2,
    };
    let text = Generator::new(&catalog, options).generate(&workspace).unwrap();
    assert_eq!(
        text,
        "while True:\n  for i in range(2):\n    display.show(1)\n  sleep(5)\n"
    );
}

#[test]
fn test_import_preamble_in_first_seen_order() {
    let catalog = Catalog::builtin();
    let mut workspace = Workspace::new();
    let send = workspace.add(node(&catalog, "radio.send(\"x\")"));
    let play = workspace.add(node(&catalog, "music.play(music.BLUES)"));
    workspace.connect_next(send, play).unwrap();

    let text = generate(&catalog, &workspace);
    assert!(text.starts_with("from microbit import *\nimport radio\nimport music\n\nradio.send"));
}

#[test]
fn test_no_preamble_without_imports() {
    let catalog = custom_catalog();
    let mut workspace = Workspace::new();
    workspace.add(node(&catalog, "op_b(4)"));
    assert_eq!(generate(&catalog, &workspace), "op_b(4)\n");
}

#[test]
fn test_every_statement_ends_with_one_newline() {
    let catalog = Catalog::builtin();
    let report = common::import(&catalog, common::MICROBIT_PROGRAM);
    let text = generate(&catalog, &report.workspace);
    assert!(text.ends_with('\n'));
    assert!(!text.ends_with("\n\n"));
    // The only blank line separates the preamble from the body.
    assert_eq!(text.matches("\n\n").count(), 1);
}

#[test]
fn test_unknown_kind_is_left_out_of_generation() {
    let catalog = custom_catalog();
    let mut workspace = Workspace::new();
    workspace.add(node(&catalog, "op_b(4)"));
    let stranger = workspace.add(StructuredNode::new("teleport", ParamMap::default()));

    let report = Generator::new(&catalog, GenerateOptions::default())
        .generate_report(&workspace)
        .unwrap();
    assert_eq!(report.text, "op_b(4)\n");
    assert!(!report.is_complete());
    assert_eq!(
        report.omitted,
        vec![OmittedNode {
            node: stranger,
            kind: "teleport".to_string(),
        }]
    );
}

#[test]
fn test_unknown_kind_keeps_the_rest_of_its_chain() {
    let catalog = custom_catalog();
    let mut workspace = Workspace::new();
    let first = workspace.add(node(&catalog, "op_b(1)"));
    let stranger = workspace.add(StructuredNode::new("teleport", ParamMap::default()));
    let last = workspace.add(node(&catalog, "op_b(2)"));
    workspace.connect_next(first, stranger).unwrap();
    workspace.connect_next(stranger, last).unwrap();
    assert_eq!(generate(&catalog, &workspace), "op_b(1)\nop_b(2)\n");
}

#[test]
fn test_body_of_only_unknown_blocks_emits_pass() {
    let catalog = Catalog::builtin();
    let mut workspace = Workspace::new();
    let forever = workspace.add(node(&catalog, "while True:"));
    let stranger = workspace.add(StructuredNode::new("teleport", ParamMap::default()));
    workspace.connect_into(forever, "DO", stranger).unwrap();

    let report = Generator::new(&catalog, GenerateOptions::default())
        .generate_report(&workspace)
        .unwrap();
    assert_eq!(report.text, "from microbit import *\n\nwhile True:\n    pass\n");
    assert_eq!(report.omitted.len(), 1);
}

#[test]
fn test_top_level_chains_follow_canvas_position() {
    let catalog = custom_catalog();
    let mut workspace = Workspace::new();
    let lower = workspace.add(node(&catalog, "op_b(1)"));
    let upper = workspace.add(node(&catalog, "op_b(2)"));
    workspace.set_position(lower, 0.0, 200.0).unwrap();
    workspace.set_position(upper, 0.0, 10.0).unwrap();
    assert_eq!(generate(&catalog, &workspace), "op_b(2)\nop_b(1)\n");

    // Without positions on every head, insertion order is used.
    workspace.add(node(&catalog, "op_b(3)"));
    assert_eq!(generate(&catalog, &workspace), "op_b(1)\nop_b(2)\nop_b(3)\n");
}

#[test]
fn test_generation_does_not_modify_the_workspace() {
    let catalog = Catalog::builtin();
    let report = common::import(&catalog, common::MICROBIT_PROGRAM);
    let before = format!("{}", DisplayWorkspace::new(&report.workspace));
    let first = generate(&catalog, &report.workspace);
    let second = generate(&catalog, &report.workspace);
    assert_eq!(first, second);
    assert_eq!(before, format!("{}", DisplayWorkspace::new(&report.workspace)));
}

#[test]
fn test_render_node_gives_header_lines() {
    let catalog = Catalog::builtin();
    let loop_node = node(&catalog, "for n in range(4):");
    assert_eq!(
        render_node(&catalog, &loop_node),
        Some(vec!["for n in range(4):".to_string()])
    );
    let stranger = StructuredNode::new("teleport", ParamMap::default());
    assert_eq!(render_node(&catalog, &stranger), None);
}
