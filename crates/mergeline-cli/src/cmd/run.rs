//! Run the configured connectors in dependency order

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use indicatif::MultiProgress;

use mergeline_core::stats::{self, RunStats};
use mergeline_core::CanonicalStore;

use crate::config::Config;

#[derive(Args)]
pub struct RunArgs {
    /// Override the store directory from the config file
    #[arg(long)]
    pub store: Option<PathBuf>,
}

pub fn run(args: RunArgs, config: &Config, multi: Option<&MultiProgress>) -> Result<()> {
    let store_dir = args.store.as_ref().unwrap_or(&config.store.path);
    let store = CanonicalStore::open(store_dir)?;

    // publishers and sources first: the work connector links against them
    let mut results: Vec<(&str, RunStats)> = Vec::new();
    if let Some(cfg) = &config.openalex {
        results.push(("openalex", mergeline_openalex::run(cfg, &store, multi)?));
    }
    if let Some(cfg) = &config.publindex {
        results.push(("publindex", mergeline_publindex::run(cfg, &store, multi)?));
    }
    if let Some(cfg) = &config.scienti {
        results.push(("scienti", mergeline_scienti::run(cfg, &store, multi)?));
    }
    if let Some(cfg) = &config.minciencias {
        results.push(("minciencias", mergeline_minciencias::run(cfg, &store, multi)?));
    }

    if results.is_empty() {
        bail!("no connectors configured — add at least one section to mergeline.toml");
    }

    store.save(store_dir)?;

    let rows: Vec<(&str, &RunStats)> = results.iter().map(|(name, s)| (*name, s)).collect();
    eprintln!("{}", stats::format_table(&rows));
    Ok(())
}
