//! Connector configuration

use std::path::PathBuf;

use mergeline_core::Thresholds;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSONL export of the open-data products dataset.
    pub input: PathBuf,
    pub num_jobs: usize,
    pub verbose: u8,
    /// Fuzzy duplicate-policy thresholds.
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("opendata_products.jsonl"),
            num_jobs: 1,
            verbose: 0,
            thresholds: Thresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_default_and_override() {
        let config = Config::default();
        assert_eq!(config.thresholds.author, 70.0);

        let config: Config =
            serde_json::from_str(r#"{"thresholds": {"high": 98.0}}"#).unwrap();
        assert_eq!(config.thresholds.high, 98.0);
        assert_eq!(config.thresholds.low, 90.0);
    }
}
