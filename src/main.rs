//! kfxbuild - encode a laid-out book description as a KFX container

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kfxbuild::kfx::symbols::system_symbol_name;
use kfxbuild::{
    BookSummary, BuildOutput, Error, KfxBookBuilder, KfxConfig, PositionItem, Result,
    Stylesheet, TocEntry,
};

/// Runes per approximate page when the input does not say.
const DEFAULT_PAGE_SIZE: usize = 2300;

#[derive(Parser)]
#[command(name = "kfxbuild")]
#[command(version, about = "Encode a book description as a KFX container", long_about = None)]
#[command(after_help = "EXAMPLES:
    kfxbuild book.json book.kfx                 Build a container
    kfxbuild book.json book.kfx --css book.css  Build with styles
    kfxbuild -i book.json                       Show the fragment summary")]
struct Cli {
    /// Book description (JSON: book, toc, positions, config, css)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output container
    #[arg(value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<PathBuf>,

    /// Stylesheets to compile, in cascade order
    #[arg(long, value_name = "FILE")]
    css: Vec<PathBuf>,

    /// Runes per approximate page (0 disables the page list)
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Version of the reflow-section-size conversion feature
    #[arg(long, value_name = "N")]
    reflow_section_size: Option<i64>,

    /// Show the fragment summary without writing a container
    #[arg(short, long)]
    info: bool,

    /// Log progress
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// JSON input accepted by the CLI.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BookDocument {
    book: BookSummary,
    toc: Vec<TocEntry>,
    positions: Vec<PositionItem>,
    config: Option<KfxConfig>,
    /// Inline stylesheet, applied before any `--css` files
    css: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    if cli.output.as_ref() == Some(&cli.input) {
        return Err(Error::InvalidInput(format!(
            "output would overwrite the input: {}",
            cli.input.display()
        )));
    }

    let text = std::fs::read_to_string(&cli.input)?;
    let document: BookDocument = serde_json::from_str(&text)?;

    let mut css = document.css.clone().unwrap_or_default();
    for path in &cli.css {
        css.push('\n');
        css.push_str(&std::fs::read_to_string(path)?);
    }
    let stylesheet = Stylesheet::parse(&css);

    let mut config = match &document.config {
        Some(config) => config.clone(),
        None => KfxConfig::default().with_page_size(DEFAULT_PAGE_SIZE),
    };
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(size) = cli.reflow_section_size {
        config.reflow_section_size = size;
    }

    let output = KfxBookBuilder::new(&document.book)
        .with_toc(&document.toc)
        .with_positions(&document.positions)
        .with_stylesheet(&stylesheet)
        .with_config(config)
        .build()?;

    for warning in &output.warnings {
        tracing::warn!("{warning}");
    }

    if cli.info {
        show_info(cli, &output);
        return Ok(());
    }

    if let Some(path) = &cli.output {
        output.write_kfx(path)?;
        tracing::info!(path = %path.display(), container_id = %output.container_id, "wrote container");
        if !cli.quiet {
            println!("{} -> {}", cli.input.display(), path.display());
        }
    }
    Ok(())
}

fn show_info(cli: &Cli, output: &BuildOutput) {
    println!("File: {}", cli.input.display());
    println!("Container: {}", output.container_id);
    println!("Fragments: {}", output.graph.len());
    for ftype in output.graph.types() {
        let count = output.graph.get_by_type(ftype).len();
        let name = system_symbol_name(ftype).unwrap_or("?");
        println!("  ${ftype} {name}: {count}");
    }
    println!("Local symbols: {}", output.symtab.len());
    println!("Max id: {}", output.symtab.max_id());
    println!("Warnings: {}", output.warnings.len());
}
