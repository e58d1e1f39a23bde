//! Document identifiers and external-id key values

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned document identifier.
///
/// Assigned once on insert, immutable thereafter. Opaque to callers —
/// the only valid operations are equality and use as a lookup handle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DocId(u64);

impl DocId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

/// External identifier value.
///
/// Most source systems tag documents with plain string identifiers; the
/// research-CV product key is a composite document (person code + product
/// code) and matches only on exact map equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Plain(String),
    Composite(BTreeMap<String, String>),
}

impl IdValue {
    pub fn plain(value: impl Into<String>) -> Self {
        Self::Plain(value.into())
    }

    pub fn composite<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Composite(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Empty values are never usable as match targets.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Plain(s) => s.is_empty(),
            Self::Composite(m) => m.is_empty() || m.values().any(|v| v.is_empty()),
        }
    }
}

impl From<&str> for IdValue {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for IdValue {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(s) => f.write_str(s),
            Self::Composite(m) => {
                let mut first = true;
                for (k, v) in m {
                    if !first {
                        f.write_str("/")?;
                    }
                    write!(f, "{k}={v}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}
