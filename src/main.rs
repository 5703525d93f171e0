//! # Review Harness CLI (`rvw`)
//!
//! ## Usage
//!
//! ```bash
//! rvw --config ./config/rvw.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rvw run --links FILE` | Ingest, analyze, and write results |
//! | `rvw ingest --links FILE` | Ingest only and list the records |
//! | `rvw catalog` | List files already in the remote store |
//! | `rvw roster --links FILE` | Print first/last name per link as TSV |
//! | `rvw names NAME...` | Resolve names from file names (offline) |
//!
//! Logs go to stderr (`RUST_LOG` controls the level, default `info`);
//! command output goes to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use review_harness::analyze::analyze_records;
use review_harness::catalog::CatalogIndex;
use review_harness::config::{self, Config, PromptKind};
use review_harness::drive::DriveClient;
use review_harness::export;
use review_harness::gemini::GeminiClient;
use review_harness::ingest::ingest_references;
use review_harness::names::resolve_name;
use review_harness::roster;

const DEFAULT_CONFIG: &str = "./config/rvw.toml";

/// Review Harness: ingest shared documents, resolve submitter names, and
/// analyze each document with an LLM.
#[derive(Parser)]
#[command(name = "rvw", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rvw.toml` when present; built-in defaults are
    /// used otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every link, analyze each file, and write the results.
    Run {
        /// Text file with one link per line.
        #[arg(long)]
        links: PathBuf,

        /// Which configured prompt to use.
        #[arg(long, value_enum, default_value = "analysis")]
        prompt: PromptKind,

        /// Results file (overrides `[output].responses`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Ingest every link and list the resulting records without analyzing.
    Ingest {
        /// Text file with one link per line.
        #[arg(long)]
        links: PathBuf,
    },

    /// List files already present in the remote store.
    Catalog,

    /// Print first name, last name, and link for every link as TSV.
    Roster {
        /// Text file with one link per line.
        #[arg(long)]
        links: PathBuf,
    },

    /// Resolve person names from file display names.
    Names {
        /// File display names.
        #[arg(required = true)]
        display_names: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                config::load_config(default)
            } else {
                tracing::debug!("no config file, using defaults");
                Ok(Config::default())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Names { display_names } = &cli.command {
        for display_name in display_names {
            match resolve_name(display_name) {
                Ok(name) => println!("{}", name),
                Err(_) => println!("<no name>"),
            }
        }
        return Ok(());
    }

    let cfg = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            links,
            prompt,
            output,
        } => {
            let prompt_text = cfg.load_prompt(prompt)?;
            let references = export::load_references(&links)?;
            let drive = DriveClient::new(&cfg.source)?;
            let gemini = GeminiClient::new(&cfg.gemini)?;
            let pacing = cfg.pacing.pacing();

            let catalog = CatalogIndex::build(&gemini).await;
            let records = ingest_references(&drive, &gemini, &catalog, &references, &pacing).await;
            if records.is_empty() {
                tracing::warn!(
                    links = %links.display(),
                    "no files were ingested, nothing to analyze"
                );
                return Ok(());
            }

            tracing::info!(model = gemini.model(), "starting analysis");
            let results = analyze_records(&gemini, &prompt_text, &records, &pacing).await;
            let output = output.unwrap_or_else(|| cfg.output.responses.clone());
            export::write_results(&output, &results)?;

            println!("run");
            println!("  links: {}", references.len());
            println!("  ingested: {}", records.len());
            println!("  analyzed: {}", results.len());
            println!("  output: {}", output.display());
            println!("ok");
        }
        Commands::Ingest { links } => {
            let references = export::load_references(&links)?;
            let drive = DriveClient::new(&cfg.source)?;
            let gemini = GeminiClient::new(&cfg.gemini)?;

            let catalog = CatalogIndex::build(&gemini).await;
            let records =
                ingest_references(&drive, &gemini, &catalog, &references, &cfg.pacing.pacing())
                    .await;

            for record in &records {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.identifier, record.resolved_name, record.display_name, record.remote.uri
                );
            }
        }
        Commands::Catalog => {
            let gemini = GeminiClient::new(&cfg.gemini)?;
            let catalog = CatalogIndex::build(&gemini).await;
            for (display_name, handle) in catalog.iter_sorted() {
                println!("{}\t{}", display_name, handle.uri);
            }
            println!("  total: {}", catalog.len());
        }
        Commands::Roster { links } => {
            let references = export::load_references(&links)?;
            let drive = DriveClient::new(&cfg.source)?;
            let rows = roster::build_roster(&drive, &references).await;
            print!("{}", roster::to_tsv(&rows));
        }
        Commands::Names { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
