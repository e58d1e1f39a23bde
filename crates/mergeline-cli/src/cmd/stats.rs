//! Canonical collection counts

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use mergeline_core::CanonicalStore;

use crate::config::Config;

#[derive(Args)]
pub struct StatsArgs {
    /// Override the store directory from the config file
    #[arg(long)]
    pub store: Option<PathBuf>,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<()> {
    let store_dir = args.store.as_ref().unwrap_or(&config.store.path);
    let store = CanonicalStore::open(store_dir)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Collection").fg(Color::Cyan),
            Cell::new("Documents").fg(Color::Cyan),
        ]);

    for (name, count) in store.counts() {
        table.add_row(vec![name.to_string(), count.to_string()]);
    }

    eprintln!("\n{table}");
    Ok(())
}
