//! JSONL persistence for collections and raw source exports

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::collection::{Collection, Record, Stored};

/// Result of reading a newline-delimited JSON file.
#[derive(Debug)]
pub struct JsonlBatch<T> {
    pub records: Vec<T>,
    /// Lines that failed to parse. Counted, never fatal.
    pub malformed: usize,
}

/// Read newline-delimited JSON records.
///
/// Malformed lines are logged at debug level and counted; one bad line
/// never aborts the batch. Blank lines are ignored.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<JsonlBatch<T>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut malformed = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read error in {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                malformed += 1;
                log::debug!("{}:{}: skipping malformed line: {e}", path.display(), lineno + 1);
            }
        }
    }

    if malformed > 0 {
        log::warn!(
            "{}: {} malformed of {} lines",
            path.display(),
            malformed,
            records.len() + malformed
        );
    }

    Ok(JsonlBatch { records, malformed })
}

impl<T: Record + Serialize + DeserializeOwned> Collection<T> {
    /// Load documents (with their ids) from a JSONL snapshot.
    ///
    /// Returns the number of documents loaded. The id counter resumes
    /// past the highest id seen, so later inserts never collide.
    pub fn load_jsonl(&self, path: &Path) -> Result<usize> {
        let batch: JsonlBatch<Stored<T>> = read_jsonl(path)?;
        let count = batch.records.len();
        self.restore(batch.records);
        log::debug!("{}: loaded {count} documents", self.name());
        Ok(count)
    }

    /// Write all documents (with their ids) as a JSONL snapshot.
    pub fn save_jsonl(&self, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let mut count = 0usize;
        let cursor = self.cursor();
        for entry in cursor {
            serde_json::to_writer(&mut writer, &entry)
                .with_context(|| format!("failed to serialize document {}", entry.id))?;
            writer.write_all(b"\n")?;
            count += 1;
        }
        writer.flush()?;
        Ok(count)
    }
}
