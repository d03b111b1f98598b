//! Round-trip properties: text to blocks to text, and blocks through JSON.
mod common;
use bitbridge::catalog::Role;
use bitbridge::convert::{normalized, render_node};
use bitbridge::prelude::*;
use common::{MICROBIT_PROGRAM, OP_PROGRAM, custom_catalog, generate, import};

#[test]
fn test_every_sample_renders_back_to_itself() {
    let catalog = Catalog::builtin();
    for operation in catalog.all().filter(|op| op.role() == Role::Statement) {
        let sample = operation.sample();
        let m = match_line(&catalog, &sample)
            .unwrap_or_else(|| panic!("sample of '{}' is not recognized", operation.kind()));
        let node = m.operation.instantiate(m.params).unwrap();
        let lines = render_node(&catalog, &node).unwrap();
        assert_eq!(
            normalized(&lines[0]),
            normalized(&sample),
            "'{}' did not reproduce its sample",
            operation.kind()
        );
    }
}

#[test]
fn test_canonical_program_round_trips_exactly() {
    let catalog = Catalog::builtin();
    let report = import(&catalog, MICROBIT_PROGRAM);
    assert!(report.is_lossless());
    assert_eq!(generate(&catalog, &report.workspace), MICROBIT_PROGRAM);
}

#[test]
fn test_custom_operations_round_trip() {
    let catalog = custom_catalog();
    let report = import(&catalog, OP_PROGRAM);
    assert_eq!(generate(&catalog, &report.workspace), OP_PROGRAM);
}

#[test]
fn test_messy_input_is_canonicalized_once() {
    let catalog = Catalog::builtin();
    let messy = "while True :\n    display.scroll( 'hi' )   \n\n    sleep (100)\n";
    let first = generate(&catalog, &import(&catalog, messy).workspace);
    assert_eq!(
        first,
        "from microbit import *\n\nwhile True:\n    display.scroll(\"hi\")\n    sleep(100)\n"
    );

    let second = generate(&catalog, &import(&catalog, &first).workspace);
    assert_eq!(first, second);
}

#[test]
fn test_equivalent_up_to_whitespace() {
    let catalog = custom_catalog();
    let spaced = "op_a( 1 ,2 )\n\nop_b(3)   \n";
    let text = generate(&catalog, &import(&catalog, spaced).workspace);
    assert_eq!(normalized(&text), normalized(spaced));
    assert_ne!(text, spaced);
}

#[test]
fn test_snapshot_json_round_trip() {
    let catalog = Catalog::builtin();
    let report = import(&catalog, MICROBIT_PROGRAM);

    let json = WorkspaceSnapshot::from_workspace(&report.workspace)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["blocks"]["blocks"][0]["type"], "radio_on");
    assert!(json.contains("\"extraState\""));

    let restored = WorkspaceSnapshot::from_json(&json)
        .unwrap()
        .into_workspace(&catalog)
        .unwrap();
    assert_eq!(restored.len(), report.workspace.len());
    assert_eq!(generate(&catalog, &restored), MICROBIT_PROGRAM);
}

#[test]
fn test_snapshot_with_unknown_kind_is_rejected() {
    let json = r#"{ "blocks": { "languageVersion": 0, "blocks": [
        { "type": "teleport", "id": "x1" }
    ] } }"#;
    let err = WorkspaceSnapshot::from_json(json)
        .unwrap()
        .into_workspace(&Catalog::builtin())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownKind { ref kind, .. } if kind == "teleport"));
}

#[test]
fn test_deeply_nested_program_round_trips() {
    let catalog = Catalog::builtin();
    let depth = 450;
    let mut text = String::new();
    for level in 0..depth {
        text.push_str(&" ".repeat(level * 4));
        text.push_str("while True:\n");
    }
    text.push_str(&" ".repeat(depth * 4));
    text.push_str("display.clear()\n");

    let report = import(&catalog, &text);
    let options = GenerateOptions {
        imports: false,
        indent_width: 4,
    };
    let generated = Generator::new(&catalog, options)
        .generate(&report.workspace)
        .unwrap();
    assert_eq!(generated, text);
}

#[test]
fn test_nested_snapshot_round_trips() {
    let catalog = Catalog::builtin();
    let depth = 450;
    let mut text = String::from("from microbit import *\n\n");
    for level in 0..depth {
        text.push_str(&" ".repeat(level * 4));
        text.push_str("for i in range(2):\n");
    }
    text.push_str(&" ".repeat(depth * 4));
    text.push_str("sleep(1)\n");

    let report = import(&catalog, &text);
    let json = WorkspaceSnapshot::from_workspace(&report.workspace)
        .to_json()
        .unwrap();
    let restored = WorkspaceSnapshot::from_json(&json)
        .unwrap()
        .into_workspace(&catalog)
        .unwrap();
    assert_eq!(restored.len(), depth + 1);
    assert_eq!(generate(&catalog, &restored), text);
}

#[test]
fn test_long_program_snapshot_round_trips() {
    // Each statement nests inside the previous one's `next`.
    let catalog = Catalog::builtin();
    let statements = 3000;
    let text = format!("from microbit import *\n\n{}", "sleep(1)\n".repeat(statements));

    let report = import(&catalog, &text);
    assert_eq!(report.workspace.len(), statements);
    let json = WorkspaceSnapshot::from_workspace(&report.workspace)
        .to_json()
        .unwrap();
    let restored = WorkspaceSnapshot::from_json(&json)
        .unwrap()
        .into_workspace(&catalog)
        .unwrap();
    assert_eq!(restored.len(), statements);
    assert_eq!(generate(&catalog, &restored), text);
}

#[test]
fn test_deep_snapshot_drops_cleanly() {
    let mut json = String::from(r#"{ "blocks": { "blocks": ["#);
    let depth = 20_000;
    for i in 0..depth {
        json.push_str(&format!(r#"{{ "type": "sleep", "id": "b{i}", "fields": {{ "MS": 1 }}, "next": {{ "block": "#));
    }
    json.push_str(r#"{ "type": "sleep", "id": "last" }"#);
    json.push_str(&"} }".repeat(depth));
    json.push_str("] } }");

    let snapshot = WorkspaceSnapshot::from_json(&json).unwrap();
    let mut length = 0;
    let mut cursor = snapshot.blocks.blocks.first();
    while let Some(block) = cursor {
        length += 1;
        cursor = block.next.as_ref().map(|c| c.block.as_ref());
    }
    assert_eq!(length, depth + 1);
    drop(snapshot);
}

#[test]
fn test_snapshot_text_with_backslash_is_rejected() {
    let json = r#"{ "blocks": { "blocks": [
        { "type": "display_scroll", "id": "s1", "fields": { "TEXT": "a\\b" } }
    ] } }"#;
    let err = WorkspaceSnapshot::from_json(json)
        .unwrap()
        .into_workspace(&Catalog::builtin())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::Instantiate { ref id, .. } if id == "s1"));
}

#[test]
fn test_normalized_ignores_layout_noise_only() {
    assert_eq!(normalized("a(1,  2)  \n\n\nb()\n"), normalized("a(1, 2)\nb()"));
    // Indentation is structure, not noise.
    assert_ne!(normalized("    a()\n"), normalized("a()\n"));
    // Spacing inside string literals is content.
    assert_ne!(normalized("s(\"a  b\")\n"), normalized("s(\"a b\")\n"));
    assert_eq!(normalized("for  i in range(3):"), "for i in range(3):\n");
}
