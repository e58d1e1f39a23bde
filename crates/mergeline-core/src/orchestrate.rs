//! Partitioned reconciliation loop
//!
//! Records are partitioned by their resolved target key before fan-out:
//! two records aliasing the same canonical document always land in the
//! same partition and are processed serially, so no merge for one target
//! ever interleaves with another. Partitions fan out on a bounded rayon
//! pool; ordering between partitions carries no meaning.

use std::time::Instant;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::RecordError;
use crate::shutdown::is_shutdown_requested;
use crate::stats::{Outcome, RunCounters, RunStats};

/// Drives one connector run: partition, fan out, count, summarize.
pub struct Orchestrator<'a> {
    label: &'a str,
    num_jobs: usize,
    multi: Option<&'a MultiProgress>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(label: &'a str, num_jobs: usize) -> Self {
        Self {
            label,
            num_jobs: num_jobs.max(1),
            multi: None,
        }
    }

    /// Attach a progress context (TTY mode).
    pub fn with_progress(mut self, multi: Option<&'a MultiProgress>) -> Self {
        self.multi = multi;
        self
    }

    /// Process `records`.
    ///
    /// `key_of` yields the partition key — the strongest identifier the
    /// record resolves to. Records without one lack any usable identity:
    /// they are counted skipped up front and never reach a worker.
    /// `handle` is called once per record; an `Err` is logged and counted,
    /// never propagated, so one bad record cannot abort the batch.
    pub fn run<R, K, F>(&self, records: Vec<R>, key_of: K, handle: F) -> RunStats
    where
        R: Send,
        K: Fn(&R) -> Option<String>,
        F: Fn(R) -> Result<Outcome, RecordError> + Send + Sync,
    {
        let start = Instant::now();
        let counters = RunCounters::new();

        let (partitions, unkeyed) = partition_by_key(records, key_of);
        for _ in 0..unkeyed {
            counters.record(Outcome::Skipped);
        }
        if unkeyed > 0 {
            log::info!(
                "{}: {} records without usable identity, skipped",
                self.label,
                unkeyed
            );
        }

        let total: usize = partitions.iter().map(Vec::len).sum();
        let pb = self.progress_bar(total);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_jobs)
            .build();
        match pool {
            Ok(pool) => pool.install(|| {
                partitions.into_par_iter().for_each(|partition| {
                    self.drain_partition(partition, &handle, &counters, &pb);
                });
            }),
            Err(e) => {
                // fall back to the current thread rather than dropping the run
                log::error!("{}: thread pool: {e}, running single-threaded", self.label);
                for partition in partitions {
                    self.drain_partition(partition, &handle, &counters, &pb);
                }
            }
        }

        pb.finish_and_clear();
        let stats = counters.snapshot(start.elapsed());
        stats.log(self.label);
        stats
    }

    fn drain_partition<R, F>(
        &self,
        partition: Vec<R>,
        handle: &F,
        counters: &RunCounters,
        pb: &ProgressBar,
    ) where
        F: Fn(R) -> Result<Outcome, RecordError>,
    {
        for record in partition {
            if is_shutdown_requested() {
                log::warn!("{}: shutdown requested, leaving partition", self.label);
                return;
            }
            match handle(record) {
                Ok(outcome) => counters.record(outcome),
                Err(e) => {
                    counters.record_failure();
                    log::error!("{}: {e}", self.label);
                }
            }
            pb.inc(1);
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        let Some(multi) = self.multi else {
            return ProgressBar::hidden();
        };
        let pb = multi.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>12.cyan} {bar:30} {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_prefix(self.label.to_string());
        pb
    }
}

/// Group records by partition key, preserving first-seen partition order
/// and record order within each partition. Returns the partitions and
/// the number of records without a key.
fn partition_by_key<R, K>(records: Vec<R>, key_of: K) -> (Vec<Vec<R>>, usize)
where
    K: Fn(&R) -> Option<String>,
{
    let mut partitions: Vec<Vec<R>> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut unkeyed = 0usize;

    for record in records {
        match key_of(&record) {
            Some(key) => {
                let slot = *index.entry(key).or_insert_with(|| {
                    partitions.push(Vec::new());
                    partitions.len() - 1
                });
                partitions[slot].push(record);
            }
            None => unkeyed += 1,
        }
    }

    (partitions, unkeyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn partition_groups_aliasing_records() {
        let records = vec![("a", 1), ("b", 2), ("a", 3), ("", 4)];
        let (partitions, unkeyed) = partition_by_key(records, |(k, _)| {
            if k.is_empty() {
                None
            } else {
                Some(k.to_string())
            }
        });
        assert_eq!(unkeyed, 1);
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0], vec![("a", 1), ("a", 3)]);
        assert_eq!(partitions[1], vec![("b", 2)]);
    }

    #[test]
    fn run_counts_outcomes() {
        let orchestrator = Orchestrator::new("test", 2);
        let stats = orchestrator.run(
            vec![1, 2, 3, 4, 5],
            |n| if *n == 5 { None } else { Some(n.to_string()) },
            |n| match n {
                1 | 2 => Ok(Outcome::Inserted),
                3 => Ok(Outcome::Updated),
                _ => Err(RecordError::Malformed("bad".to_string())),
            },
        );
        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 5);
    }

    #[test]
    fn same_key_records_run_in_order() {
        let seen = Mutex::new(Vec::new());
        let orchestrator = Orchestrator::new("test", 4);
        orchestrator.run(
            vec![("k", 1), ("k", 2), ("k", 3)],
            |_| Some("k".to_string()),
            |(_, n)| {
                seen.lock().unwrap().push(n);
                Ok(Outcome::Updated)
            },
        );
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_is_fine() {
        let orchestrator = Orchestrator::new("test", 1);
        let stats = orchestrator.run(Vec::<i32>::new(), |_| None, |_| Ok(Outcome::Inserted));
        assert_eq!(stats.total(), 0);
    }
}
