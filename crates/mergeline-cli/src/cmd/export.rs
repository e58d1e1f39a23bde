//! Export one canonical collection as JSONL

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use mergeline_core::CanonicalStore;

use crate::config::Config;

#[derive(Args)]
pub struct ExportArgs {
    /// Collection to export (works, sources, affiliations, publishers,
    /// person, subjects)
    pub collection: String,

    /// Output file
    pub output: PathBuf,

    /// Override the store directory from the config file
    #[arg(long)]
    pub store: Option<PathBuf>,
}

pub fn run(args: ExportArgs, config: &Config) -> Result<()> {
    let store_dir = args.store.as_ref().unwrap_or(&config.store.path);
    let store = CanonicalStore::open(store_dir)?;

    let count = match args.collection.as_str() {
        "works" => store.works.save_jsonl(&args.output)?,
        "sources" => store.sources.save_jsonl(&args.output)?,
        "affiliations" => store.affiliations.save_jsonl(&args.output)?,
        "publishers" => store.publishers.save_jsonl(&args.output)?,
        "person" => store.person.save_jsonl(&args.output)?,
        "subjects" => store.subjects.save_jsonl(&args.output)?,
        other => bail!("unknown collection '{other}'"),
    };

    log::info!(
        "exported {} documents from {} to {}",
        count,
        args.collection,
        args.output.display()
    );
    Ok(())
}
