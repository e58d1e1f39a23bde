pub mod export;
pub mod run;
pub mod stats;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Render the effective configuration.
pub fn show_config(config: &Config) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Store path",
        &config.store.path.display().to_string(),
    ]);
    add_connector_row(&mut table, "publindex", config.publindex.as_ref().map(|c| (&c.input, c.num_jobs)));
    add_connector_row(&mut table, "scienti", config.scienti.as_ref().map(|c| (&c.input, c.num_jobs)));
    add_connector_row(
        &mut table,
        "minciencias",
        config.minciencias.as_ref().map(|c| (&c.input, c.num_jobs)),
    );
    add_connector_row(&mut table, "openalex", config.openalex.as_ref().map(|c| (&c.input, c.num_jobs)));

    if let Some(minciencias) = &config.minciencias {
        table.add_row(vec![
            "Thresholds (author/low/high)".to_string(),
            format!(
                "{}/{}/{}",
                minciencias.thresholds.author,
                minciencias.thresholds.low,
                minciencias.thresholds.high
            ),
        ]);
    }

    eprintln!("\n{table}");
}

fn add_connector_row(
    table: &mut comfy_table::Table,
    name: &str,
    config: Option<(&std::path::PathBuf, usize)>,
) {
    match config {
        Some((input, num_jobs)) => {
            table.add_row(vec![
                name.to_string(),
                format!("{} ({num_jobs} jobs)", input.display()),
            ]);
        }
        None => {
            table.add_row(vec![name, "not configured"]);
        }
    }
}
