use bitbridge::convert::{normalized, validate_for_import};
use bitbridge::prelude::*;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::time::Instant;

/// Convert micro:bit MicroPython programs between text and blocks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional path to a JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that every line of a program can be converted to blocks
    Validate { file: String },

    /// Convert a program to a block workspace snapshot (JSON)
    ToBlocks {
        file: String,
        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
        /// Print the workspace as a tree instead of JSON
        #[arg(long)]
        tree: bool,
    },

    /// Generate program text from a workspace snapshot
    ToText {
        snapshot: String,
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the convertible statements
    Catalog {
        /// Print the toolbox palette as JSON
        #[arg(long)]
        palette: bool,
        /// Print every block schema as JSON
        #[arg(long)]
        schemas: bool,
    },

    /// Convert a program to blocks and back, and compare
    Roundtrip { file: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => SyncConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => SyncConfig::default(),
    };
    let catalog = Catalog::builtin();

    match cli.command {
        Command::Validate { file } => run_validate(&catalog, &config, &file),
        Command::ToBlocks { file, output, tree } => {
            run_to_blocks(&catalog, &config, &file, output.as_deref(), tree)
        }
        Command::ToText { snapshot, output } => {
            run_to_text(&catalog, &config, &snapshot, output.as_deref())
        }
        Command::Catalog { palette, schemas } => run_catalog(&catalog, palette, schemas),
        Command::Roundtrip { file } => run_roundtrip(&catalog, &config, &file),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,bitbridge={}", level).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_program(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)))
}

fn write_output(output: Option<&str>, content: &str) {
    match output {
        Some(path) => {
            fs::write(path, content)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
            println!("Wrote '{}'", path);
        }
        None => print!("{}", content),
    }
}

fn run_validate(catalog: &Catalog, config: &SyncConfig, file: &str) {
    let program = read_program(file);
    let result = validate(catalog, &program, config);
    match result.error_message() {
        None => println!("OK: every line of '{}' can be converted to blocks", file),
        Some(message) => {
            eprintln!("{}", message);
            for line in &result.unmatched_lines {
                eprintln!("  {:>4} | {}", line.line_number, line.text);
            }
            for line in &result.rejected_lines {
                eprintln!("  {:>4} | {}  ({})", line.line_number, line.text, line.reason);
            }
            std::process::exit(2);
        }
    }
}

fn run_to_blocks(
    catalog: &Catalog,
    config: &SyncConfig,
    file: &str,
    output: Option<&str>,
    tree: bool,
) {
    let program = read_program(file);
    let report = checked_import(catalog, config, &program);
    let mut workspace = report.workspace;
    workspace.layout_vertical(&config.layout);

    if tree {
        write_output(output, &DisplayWorkspace::new(&workspace).to_string());
        return;
    }
    let json = WorkspaceSnapshot::from_workspace(&workspace)
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize workspace: {}", e)));
    write_output(output, &format!("{}\n", json));
}

fn run_to_text(catalog: &Catalog, config: &SyncConfig, snapshot: &str, output: Option<&str>) {
    let json = read_program(snapshot);
    let workspace = WorkspaceSnapshot::from_json(&json)
        .and_then(|s| s.into_workspace(catalog))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load snapshot: {}", e)));
    let report = Generator::new(catalog, GenerateOptions::from(config))
        .generate_report(&workspace)
        .unwrap_or_else(|e| exit_with_error(&format!("Text generation failed: {}", e)));
    for omitted in &report.omitted {
        eprintln!("Left out block {} of unknown type '{}'", omitted.node, omitted.kind);
    }
    write_output(output, &report.text);
}

/// Imports `program`, or exits with the banner when any line would be lost.
fn checked_import(catalog: &Catalog, config: &SyncConfig, program: &str) -> ImportReport {
    match validate_for_import(catalog, program, config) {
        (result, Some(report)) if result.is_valid => report,
        (result, _) => exit_with_error(&result.error_message().unwrap_or_default()),
    }
}

fn run_catalog(catalog: &Catalog, palette: bool, schemas: bool) {
    if palette || schemas {
        let json = if palette {
            serde_json::to_string_pretty(catalog.palette())
        } else {
            serde_json::to_string_pretty(&catalog.schemas())
        };
        let json = json.unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize: {}", e)));
        println!("{}", json);
        return;
    }

    println!("--- {} convertible statements ---", catalog.len());
    for doc in catalog.pattern_docs() {
        println!("{:<22} {}", doc.kind, doc.sample);
        println!("{:<22} /{}/", "", doc.pattern);
    }
}

fn run_roundtrip(catalog: &Catalog, config: &SyncConfig, file: &str) {
    let start = Instant::now();
    let program = read_program(file);
    let report = checked_import(catalog, config, &program);
    let generator = Generator::new(catalog, GenerateOptions::from(config));
    let first = generator
        .generate(&report.workspace)
        .unwrap_or_else(|e| exit_with_error(&format!("Text generation failed: {}", e)));
    let second_report = Importer::new(catalog, config).import(&first);
    let second = generator
        .generate(&second_report.workspace)
        .unwrap_or_else(|e| exit_with_error(&format!("Text generation failed: {}", e)));

    println!("Blocks:        {}", report.workspace.len());
    println!("Skipped lines: {}", report.skipped.len());
    println!("Equivalent:    {}", normalized(&program) == normalized(&first));
    println!("Idempotent:    {}", first == second);
    println!("Elapsed:       {:?}", start.elapsed());
    if first != second {
        exit_with_error("Generated text changed on the second round trip");
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
