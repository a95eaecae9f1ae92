//! Quire CLI - paged layout of a styled box tree
//!
//! Usage:
//!   quire <file>                 Lay out and print the display list
//!   quire <file> --json          Print the display list as JSON
//!   quire <file> --paper a4      Use a named paper size
//!   quire <file> --verbose       Debug logging from the layout engine
//!
//! The input is a JSON box tree: each node carries an already cascaded
//! `style`, optional `text` or `image`, and `children`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use quire_common::Diagnostic;
use quire_layout::{
    ApproximateFontMetrics, BoxNode, Document, FrameTree, LayoutConfig, PageConfig, PaintCommand,
    RecordingCanvas,
};
use tracing_subscriber::EnvFilter;

/// Quire - CSS 2.1 paged layout of a styled box tree
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the display list
    quire doc.json

    # A4 landscape, as JSON
    quire doc.json --paper a4 --landscape --json

    # Layout tracing (needs the layout-trace feature for per-line detail)
    RUST_LOG=quire_layout=trace quire doc.json
"#)]
struct Cli {
    /// Path to a JSON box tree
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Paper size: letter, legal, a4 or a5
    #[arg(long, default_value = "letter")]
    paper: String,

    /// Swap page width and height
    #[arg(long)]
    landscape: bool,

    /// Emit the display list as JSON
    #[arg(short, long)]
    json: bool,

    /// Debug logging (overrides the default `warn` filter)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(mut page) = PageConfig::from_size_name(&cli.paper) else {
        bail!("unknown paper size '{}' (expected letter, legal, a4 or a5)", cli.paper);
    };
    if cli.landscape {
        page = page.landscape();
    }

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read '{}'", cli.input.display()))?;
    let node: BoxNode = serde_json::from_str(&source)
        .with_context(|| format!("'{}' is not a valid box tree", cli.input.display()))?;

    let mut tree = FrameTree::new();
    let root = tree.build(&node).context("failed to build the frame tree")?;
    let document = Document::new(tree, root, LayoutConfig::with_page(page));

    let mut canvas = RecordingCanvas::new();
    let output = document
        .render(&ApproximateFontMetrics, &mut canvas)
        .context("layout failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(canvas.commands())?);
    } else {
        print_commands(canvas.commands());
        println!();
        println!("{} page(s)", output.page_count.bold());
    }
    print_warnings(&output.warnings);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_commands(commands: &[PaintCommand]) {
    let mut depth = 0usize;
    for command in commands {
        match command {
            PaintCommand::NewPage { .. } => {
                depth = 0;
                println!("{}", command.to_string().cyan().bold());
                continue;
            }
            PaintCommand::PopClip | PaintCommand::Restore => depth = depth.saturating_sub(1),
            _ => {}
        }
        let indent = "  ".repeat(depth + 1);
        match command {
            PaintCommand::Text { .. } => println!("{indent}{}", command.green()),
            PaintCommand::PushClip { .. }
            | PaintCommand::PopClip
            | PaintCommand::Save
            | PaintCommand::Restore
            | PaintCommand::Transform { .. }
            | PaintCommand::Opacity { .. } => println!("{indent}{}", command.dimmed()),
            _ => println!("{indent}{command}"),
        }
        if matches!(command, PaintCommand::PushClip { .. } | PaintCommand::Save) {
            depth += 1;
        }
    }
}

fn print_warnings(warnings: &[Diagnostic]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{} {}", "warnings:".yellow().bold(), warnings.len());
    for warning in warnings {
        eprintln!("  {warning}");
    }
}
