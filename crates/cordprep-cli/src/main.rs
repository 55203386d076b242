//! cordprep — CORD-19 dataset preparation.
//!
//! Usage:
//!   cordprep join [--kind <kind>] [--out <file>] [--root <dir>]
//!   cordprep sections [--kind <kind>] [--min-tokens N] [--out <file>] [--root <dir>]
//!   cordprep categories

mod config;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cordprep_ingestion::{
    extract_sections, join_metadata, CategorySelector, JoinedDataset, LicenseCategory,
    MetadataSource,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cordprep", version, about = "CORD-19 dataset preparation")]
struct Cli {
    /// Data root holding the metadata table and category subdirectories.
    /// Overrides data.unpack_dir / data.extract_dir from cordprep.toml.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the metadata table with the JSON files on disk
    Join {
        /// One of: all, cc-by-license, commercial_use, non_commercial_use,
        /// custom_license, biorxiv
        #[arg(long, default_value = "all", value_parser = clap::value_parser!(CategorySelector))]
        kind: CategorySelector,
        /// Output CSV (defaults to <output.dir>/<kind>_metadata.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Extract full-text sections into a flat table
    Sections {
        /// One of: all, cc-by-license, commercial_use, non_commercial_use,
        /// custom_license, biorxiv
        #[arg(long, default_value = "all", value_parser = clap::value_parser!(CategorySelector))]
        kind: CategorySelector,
        /// Keep sections with strictly more tokens than this
        #[arg(long)]
        min_tokens: Option<usize>,
        /// Output CSV (defaults to <output.dir>/<kind>_sections.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the accepted --kind values
    Categories,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cordprep=debug,info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not load cordprep.toml: {e}; using defaults");
            config::Config::default()
        }
    };
    run(cli, &config)?;
    Ok(())
}

/// Execute one subcommand. Flags win over `config`. Returns the file written,
/// if any.
fn run(cli: Cli, config: &config::Config) -> anyhow::Result<Option<PathBuf>> {
    let source_root = cli.root.unwrap_or_else(|| config.data.source_root());

    match cli.command {
        Commands::Join { kind, out } => {
            let dataset = run_join(kind, &source_root, config)?;

            let out = out.unwrap_or_else(|| default_output(config, kind, "metadata"));
            let mut writer = create_output(&out)?;
            dataset.data.write_csv(&mut writer)?;
            writer.flush()?;
            info!("Wrote {} rows to {:?}", dataset.data.len(), out);
            Ok(Some(out))
        }
        Commands::Sections { kind, min_tokens, out } => {
            let min_tokens = min_tokens.unwrap_or(config.sections.min_tokens);
            let dataset = run_join(kind, &source_root, config)?;
            let sections = extract_sections(&dataset.data, &source_root, min_tokens)?;

            let out = out.unwrap_or_else(|| default_output(config, kind, "sections"));
            let mut writer = create_output(&out)?;
            sections.write_csv(&mut writer)?;
            writer.flush()?;
            info!("Wrote {} sections to {:?}", sections.len(), out);
            Ok(Some(out))
        }
        Commands::Categories => {
            println!("{:<20} subdirectories", "kind");
            for token in CategorySelector::legal_values() {
                let selector: CategorySelector = token.parse()?;
                let dirs: Vec<_> = selector.categories().iter().map(LicenseCategory::dir_name).collect();
                println!("{:<20} {}", token, dirs.join(", "));
            }
            Ok(None)
        }
    }
}

fn run_join(
    selector: CategorySelector,
    source_root: &Path,
    config: &config::Config,
) -> anyhow::Result<JoinedDataset> {
    let metadata = MetadataSource::Path(config.data.metadata_path(source_root));
    let dataset = join_metadata(selector, source_root, metadata, None)
        .with_context(|| format!("joining metadata under {}", source_root.display()))?;

    for (category, n) in dataset.data.category_counts() {
        info!("  {:<20} {}", category.as_str(), n);
    }
    if !dataset.mismatches.is_empty() {
        warn!("{} documents declare an id that differs from their file name", dataset.mismatches.len());
    }
    Ok(dataset)
}

fn default_output(config: &config::Config, selector: CategorySelector, table: &str) -> PathBuf {
    config.output.dir.join(format!("{}_{}.csv", selector, table))
}

fn create_output(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}
