//! Per-run counters and summaries
//!
//! Every run returns its own result object; there is no global counter
//! state. Workers bump the atomic [`RunCounters`] and the runner
//! snapshots them into a [`RunStats`] with the elapsed wall clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Updated,
    Skipped,
}

/// Atomic counters shared by the workers of one run.
#[derive(Debug, Default)]
pub struct RunCounters {
    inserted: AtomicUsize,
    updated: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Inserted => &self.inserted,
            Outcome::Updated => &self.updated,
            Outcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, elapsed: Duration) -> RunStats {
        RunStats {
            inserted: self.inserted.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.skipped + self.failed
    }

    /// Fold another run into this one (elapsed accumulates).
    pub fn absorb(&mut self, other: &RunStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.elapsed += other.elapsed;
    }

    /// One-line summary for non-TTY logs.
    pub fn log(&self, label: &str) {
        log::info!(
            "{label}: inserted={} updated={} skipped={} failed={} in {:.1}s",
            fmt_num(self.inserted),
            fmt_num(self.updated),
            fmt_num(self.skipped),
            fmt_num(self.failed),
            self.elapsed.as_secs_f64()
        );
    }
}

/// Render run summaries as a table, one row per connector.
pub fn format_table(rows: &[(&str, &RunStats)]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Connector").fg(Color::Cyan),
            Cell::new("Inserted").fg(Color::Cyan),
            Cell::new("Updated").fg(Color::Cyan),
            Cell::new("Skipped").fg(Color::Cyan),
            Cell::new("Failed").fg(Color::Cyan),
            Cell::new("Time").fg(Color::Cyan),
        ]);

    let mut totals = RunStats::default();
    for (label, stats) in rows {
        totals.absorb(stats);
        table.add_row(vec![
            Cell::new(label),
            Cell::new(fmt_num(stats.inserted)).fg(Color::Green),
            Cell::new(fmt_num(stats.updated)),
            Cell::new(fmt_num(stats.skipped)),
            failed_cell(stats.failed),
            Cell::new(format!("{:.1}s", stats.elapsed.as_secs_f64())),
        ]);
    }
    if rows.len() > 1 {
        table.add_row(vec![
            Cell::new("total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(fmt_num(totals.inserted)).fg(Color::Green),
            Cell::new(fmt_num(totals.updated)),
            Cell::new(fmt_num(totals.skipped)),
            failed_cell(totals.failed),
            Cell::new(format!("{:.1}s", totals.elapsed.as_secs_f64())),
        ]);
    }

    format!("\n{table}")
}

fn failed_cell(failed: usize) -> Cell {
    if failed > 0 {
        Cell::new(fmt_num(failed)).fg(Color::Red)
    } else {
        Cell::new("0")
    }
}

/// Format number with thousand separators.
fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_snapshot() {
        let counters = RunCounters::new();
        counters.record(Outcome::Inserted);
        counters.record(Outcome::Inserted);
        counters.record(Outcome::Updated);
        counters.record(Outcome::Skipped);
        counters.record_failure();

        let stats = counters.snapshot(Duration::from_secs(2));
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 5);
    }

    #[test]
    fn absorb_accumulates() {
        let mut a = RunStats {
            inserted: 1,
            elapsed: Duration::from_secs(1),
            ..Default::default()
        };
        let b = RunStats {
            updated: 2,
            elapsed: Duration::from_secs(3),
            ..Default::default()
        };
        a.absorb(&b);
        assert_eq!(a.inserted, 1);
        assert_eq!(a.updated, 2);
        assert_eq!(a.elapsed, Duration::from_secs(4));
    }

    #[test]
    fn fmt_num_thousands() {
        assert_eq!(fmt_num(0), "0");
        assert_eq!(fmt_num(999), "999");
        assert_eq!(fmt_num(1234567), "1,234,567");
    }

    #[test]
    fn table_renders_totals() {
        let a = RunStats {
            inserted: 10,
            ..Default::default()
        };
        let b = RunStats {
            updated: 5,
            failed: 1,
            ..Default::default()
        };
        let out = format_table(&[("publindex", &a), ("scienti", &b)]);
        assert!(out.contains("publindex"));
        assert!(out.contains("total"));
    }
}
