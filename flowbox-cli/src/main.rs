//! flowbox CLI
//!
//! Lays out a JSON scene and prints where every box landed.
//!
//! - flowbox scene.json              # Indented box tree
//! - flowbox --json scene.json       # The same, as JSON
//! - flowbox --page-height 500 -     # Paged, scene read from stdin

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use flowbox_common::warning::clear_warnings;
use flowbox_layout::dump::BoxDump;
use flowbox_layout::{LayoutDump, Rect, Scene, layout_tree};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// flowbox: block, float, fragmentation and multi-column layout
#[derive(Parser, Debug)]
#[command(name = "flowbox")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a scene and print the box tree
    flowbox demos/floats.json

    # Print the placed boxes as JSON
    flowbox --json demos/multicol.json

    # Paginate with 500px pages
    flowbox --page-height 500 demos/pages.json

    # Show layout decisions as they are made
    flowbox -vv demos/margins.json
"#)]
struct Cli {
    /// Scene file, or `-` for stdin
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Print the placed boxes as JSON
    #[arg(long)]
    json: bool,

    /// Lay out on pages of this height (overrides the scene)
    #[arg(long, value_name = "PX")]
    page_height: Option<f32>,

    /// Use quirks mode (overrides the scene)
    #[arg(long)]
    quirks: bool,

    /// Viewport width (overrides the scene)
    #[arg(long, value_name = "PX")]
    width: Option<f32>,

    /// Viewport height (overrides the scene)
    #[arg(long, value_name = "PX")]
    height: Option<f32>,

    /// More logging (-v debug, -vv trace); `RUST_LOG` wins when set
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = read_scene(&cli.scene)?;
    let mut scene = Scene::from_json(&source).with_context(|| format!("parsing {}", cli.scene.display()))?;
    if let Some(page_height) = cli.page_height {
        scene.options.page_block_size = Some(page_height);
    }
    if cli.quirks {
        scene.options.quirks_mode = true;
    }
    if let Some(width) = cli.width {
        scene.options.viewport_width = width;
    }
    if let Some(height) = cli.height {
        scene.options.viewport_height = height;
    }

    clear_warnings();
    let mut tree = scene.build()?;
    layout_tree(&mut tree, &scene.options);
    if !scene.mutations.is_empty() {
        tracing::debug!(count = scene.mutations.len(), "applying mutations");
        scene.apply_mutations(&mut tree)?;
        layout_tree(&mut tree, &scene.options);
    }

    let dump = LayoutDump::new(&tree, &scene.options);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        let options = &scene.options;
        println!(
            "=== Layout ({}x{}{}) ===\n",
            options.viewport_width,
            options.viewport_height,
            options
                .page_block_size
                .map_or_else(String::new, |size| format!(", pages of {size}"))
        );
        print_box(&dump.root, 0);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_scene(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        let _ = io::stdin().read_to_string(&mut source).context("reading stdin")?;
        return Ok(source);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn format_rect(rect: &Rect) -> String {
    format!(
        "x={:.1} y={:.1} w={:.1} h={:.1}",
        rect.x, rect.y, rect.width, rect.height
    )
}

/// Recursively print a placed box and its content.
fn print_box(dump: &BoxDump, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = dump.name.as_deref().map_or_else(String::new, |name| format!(" #{name}"));
    println!("{indent}[{}{}] {}", dump.kind.cyan(), name.bold(), format_rect(&dump.rect));

    if let Some(strut) = dump.pagination_strut {
        println!("{indent}  {} {strut:.1}", "strut:".yellow());
    }
    for (index, column) in dump.columns.iter().enumerate() {
        println!("{indent}  {} {}", format!("column {index}:").dimmed(), format_rect(column));
    }
    for line in &dump.lines {
        println!("{indent}  {} {}", "line:".dimmed(), format_rect(line));
    }
    for float in &dump.floats {
        println!(
            "{indent}  {} #{} {} {}",
            "float:".green(),
            float.name,
            float.side,
            format_rect(&float.rect)
        );
    }

    for child in &dump.children {
        print_box(child, depth + 1);
    }
}
