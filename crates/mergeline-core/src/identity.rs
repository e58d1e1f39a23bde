//! Candidate identity extraction contracts
//!
//! A candidate identity is the set of normalized identifiers a raw source
//! record offers for matching. The contract everywhere: an empty string
//! means "not usable for matching" and is never compared against another
//! empty value. Connectors build these from their own raw record shapes.

use std::sync::OnceLock;

use regex::Regex;

use mergeline_store::IdValue;

/// Candidate identity for a journal record.
///
/// Deterministic lookup order is fixed: print ISSN, linking ISSN, vendor
/// numeric id, then the exact display name as a last resort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceIdentity {
    pub name: String,
    pub issn_p: String,
    pub issn_l: String,
    pub vendor_id: String,
}

impl SourceIdentity {
    /// Whether any identifier is usable at all. Records failing this are
    /// skipped (counted, never fatal).
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty()
            || !self.issn_p.is_empty()
            || !self.issn_l.is_empty()
            || !self.vendor_id.is_empty()
    }

    /// Non-empty deterministic lookup keys, in matching order.
    pub fn lookup_keys(&self) -> Vec<IdValue> {
        [&self.issn_p, &self.issn_l, &self.vendor_id]
            .into_iter()
            .filter(|v| !v.is_empty())
            .map(|v| IdValue::plain(v.clone()))
            .collect()
    }

    /// Partition key for the orchestrator: the strongest identifier the
    /// record carries, so records aliasing one target document land in
    /// the same partition and never merge concurrently.
    pub fn partition_key(&self) -> Option<String> {
        for key in [&self.issn_p, &self.issn_l, &self.vendor_id, &self.name] {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        None
    }
}

fn product_key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{9,11})-(\d{1,7})$").expect("valid regex"))
}

/// Composite key identifying a research product: the researcher CV code
/// plus the per-researcher product sequence number, parsed from the tail
/// of the open-data product id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductKey {
    pub person_code: String,
    pub product_code: String,
}

impl ProductKey {
    pub fn parse(product_id: &str) -> Option<Self> {
        let caps = product_key_pattern().captures(product_id)?;
        Some(Self {
            person_code: caps[1].to_string(),
            product_code: caps[2].to_string(),
        })
    }

    /// The composite external-id value stored on work documents.
    pub fn id_value(&self) -> IdValue {
        IdValue::composite([
            ("COD_RH", self.person_code.clone()),
            ("COD_PRODUCTO", self.product_code.clone()),
        ])
    }
}
