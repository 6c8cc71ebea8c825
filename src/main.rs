mod config;
mod loader;
mod parser;
mod present;
mod sorter;
mod source;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use config::Config;
use loader::Catalog;
use present::Format;
use source::{DocumentSource, Retrying};

#[derive(Parser)]
#[command(name = "doc_cards", about = "Discover numbered front-matter documents and render them as cards")]
struct Cli {
    /// Directory or base URL holding <category>/<NNN>.<ext> documents
    #[arg(short, long, global = true, default_value = ".")]
    source: String,

    /// Document file extension
    #[arg(long, global = true, default_value = config::DEFAULT_EXT)]
    ext: String,

    /// Per-request timeout for HTTP sources
    #[arg(long, global = true, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Retries for transport faults, at most 10 (absent documents are never retried)
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    /// Stop probing a category after this many lookups
    #[arg(long, global = true)]
    max_documents: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary cards per category, newest first
    List {
        /// Categories to load (default: events)
        categories: Vec<String>,
        /// Cards per batch
        #[arg(short, long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Number of batches to reveal
        #[arg(short, long, default_value_t = 1)]
        reveal: usize,
        /// Emit HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Full content of one document
    Show {
        category: String,
        /// 1-based position in the sorted listing
        position: usize,
        /// Emit HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Dump loaded categories as JSON
    Export {
        categories: Vec<String>,
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = Config::new(
        cli.source,
        cli.ext,
        cli.timeout_secs,
        cli.retries,
        cli.max_documents,
    );

    match cli.command {
        Commands::List {
            categories,
            batch_size,
            reveal,
            html,
        } => {
            let categories = config::categories(categories);
            let catalog = load(&cfg, &categories).await?;
            let format = if html { Format::Html } else { Format::Text };
            for (name, docs) in catalog.iter() {
                println!(
                    "{}",
                    present::render_listing(name, docs, batch_size, reveal, format)
                );
            }
        }
        Commands::Show {
            category,
            position,
            html,
        } => {
            let categories = config::categories(vec![category]);
            let catalog = load(&cfg, &categories).await?;
            let name = &categories[0];
            let docs = catalog.get(name).unwrap_or_default();
            let doc = position
                .checked_sub(1)
                .and_then(|i| docs.get(i))
                .with_context(|| {
                    format!("{} has {} documents, no position {}", name, docs.len(), position)
                })?;
            let format = if html { Format::Html } else { Format::Text };
            println!("{}", present::render_detail(doc, format));
        }
        Commands::Export { categories, pretty } => {
            let categories = config::categories(categories);
            let catalog = load(&cfg, &categories).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&catalog)
            } else {
                serde_json::to_string(&catalog)
            }
            .context("Failed to serialize catalog")?;
            println!("{}", json);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }

    Ok(())
}

async fn load(cfg: &Config, categories: &[String]) -> anyhow::Result<Catalog> {
    let inner = source::open_source(&cfg.source, &cfg.ext, cfg.timeout)
        .with_context(|| format!("Failed to open source {}", cfg.source))?;
    let source: Arc<dyn DocumentSource> = Arc::new(Retrying::new(inner, cfg.retry));

    let pb = ProgressBar::new(categories.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} categories")?
            .progress_chars("=> "),
    );

    let catalog = loader::load_all(source, categories, cfg.limits, &pb).await;
    pb.finish_and_clear();
    tracing::info!(
        "Loaded {} documents across {} categories",
        catalog.total(),
        categories.len()
    );
    Ok(catalog)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
