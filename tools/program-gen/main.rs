use bitbridge::catalog::control::{IF_ELSE, add_elif_arm, add_else_arm, condition_field};
use bitbridge::prelude::*;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;

const WORDS: &[&str] = &["Hello", "micro:bit", "Hi there", "42", "Go!", "yes", "no"];
const NAMES: &[&str] = &["i", "j", "n", "step"];

/// A CLI tool to generate random programs that only use convertible statements
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated program to
    #[arg(short, long, default_value = "generated_program.py")]
    output: String,

    /// Number of top-level statements
    #[arg(long, default_value_t = 10)]
    statements: usize,

    /// Maximum nesting depth of block bodies
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Seed for a reproducible program
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let catalog = Catalog::builtin();
    let statements: Vec<&dyn Operation> = catalog
        .all()
        .filter(|op| op.role() == Role::Statement)
        .collect();

    println!(
        "Generating a program ({} top-level statements, depth {})...",
        cli.statements, cli.depth
    );

    let mut workspace = Workspace::new();
    fill(
        &mut workspace,
        &statements,
        &mut rng,
        None,
        cli.statements,
        cli.depth,
    )?;

    let program = Generator::new(&catalog, GenerateOptions::default()).generate(&workspace)?;
    fs::write(&cli.output, &program)?;

    println!(
        "Successfully generated {} blocks and saved the program to '{}'",
        workspace.len(),
        cli.output
    );

    Ok(())
}

/// Appends `count` random statements to the top level or to a parent's slot.
fn fill(
    workspace: &mut Workspace,
    statements: &[&dyn Operation],
    rng: &mut StdRng,
    parent: Option<(NodeId, &str)>,
    count: usize,
    depth: usize,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    // At the deepest level only single-line statements are picked.
    let candidates: Vec<&dyn Operation> = statements
        .iter()
        .copied()
        .filter(|op| depth > 0 || op.schema().slots.is_empty())
        .collect();

    let mut tail: Option<NodeId> = None;
    for _ in 0..count {
        let Some(op) = candidates.choose(rng) else {
            break;
        };
        let params: ParamMap = op
            .schema()
            .fields
            .iter()
            .map(|field| (field.name.to_string(), random_value(field, rng)))
            .collect();
        let mut node = op.instantiate(params)?;
        if node.kind == IF_ELSE {
            let condition = condition_field("COND");
            for _ in 0..rng.random_range(0..=2) {
                add_elif_arm(&mut node, random_value(&condition, rng));
            }
            if rng.random_bool(0.5) {
                add_else_arm(&mut node);
            }
        }

        let slots: Vec<String> = node.slots.iter().map(|s| s.name.clone()).collect();
        let id = workspace.add(node);
        match (tail, parent) {
            (Some(prev), _) => workspace.connect_next(prev, id)?,
            (None, Some((container, slot))) => workspace.connect_into(container, slot, id)?,
            (None, None) => {}
        }
        tail = Some(id);

        for slot in slots {
            let body = rng.random_range(0..=3);
            fill(
                workspace,
                statements,
                rng,
                Some((id, &slot)),
                body,
                depth.saturating_sub(1),
            )?;
        }
    }
    Ok(())
}

fn random_value(field: &FieldSpec, rng: &mut StdRng) -> ParamValue {
    match &field.kind {
        FieldKind::Number { min, max, integer } => {
            let low = min.unwrap_or(0.0);
            let high = max.unwrap_or(100.0).min(low + 1000.0);
            if *integer {
                ParamValue::Number(rng.random_range(low as i64..=high as i64) as f64)
            } else {
                ParamValue::Number((rng.random_range(low..=high) * 10.0).round() / 10.0)
            }
        }
        FieldKind::Text => ParamValue::Text(WORDS.choose(rng).copied().unwrap_or("Hello").to_string()),
        FieldKind::Identifier => ParamValue::Text(NAMES.choose(rng).copied().unwrap_or("i").to_string()),
        FieldKind::Choice { options } => options
            .choose(rng)
            .map(|option| ParamValue::Choice(option.to_string()))
            .unwrap_or_else(|| field.default_value()),
    }
}
