//! Raw product record as exported from the research-CV database
//!
//! Journal facts sit three levels deep: a product has `details`, a
//! detail may carry `article` entries, and an article may carry
//! `journal` entries. Only the first article/journal pair is
//! authoritative, matching how the vendor fills the structure.

use mergeline_core::normalize::de_stringy;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Detail {
    #[serde(default)]
    pub article: Vec<Article>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub journal: Vec<Journal>,

    /// Record creation date, in one of the vendor's several formats.
    #[serde(rename = "DTA_CREACION", default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Journal {
    #[serde(rename = "TXT_NME_REVISTA", default)]
    pub name: String,

    #[serde(rename = "TXT_ISSN_SEP", default)]
    pub issn: String,

    #[serde(rename = "COD_REVISTA", default, deserialize_with = "de_stringy")]
    pub code: String,

    #[serde(rename = "TPO_REVISTA", default)]
    pub journal_type: String,

    #[serde(rename = "TPO_CLASIFICACION", default)]
    pub classification: String,

    #[serde(default)]
    pub editorial: Vec<Editorial>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Editorial {
    #[serde(rename = "TXT_NME_EDITORIAL", default)]
    pub name: String,
}

impl ProductRecord {
    /// First article that carries journal data, with its journal.
    pub fn journal(&self) -> Option<(&Article, &Journal)> {
        for detail in &self.details {
            for article in &detail.article {
                if let Some(journal) = article.journal.first() {
                    return Some((article, journal));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "details": [
            {"article": [
                {
                    "DTA_CREACION": "Fri, 01 Jan 2016 00:00:00 GMT",
                    "journal": [{
                        "TXT_NME_REVISTA": "Revista de Biología Tropical",
                        "TXT_ISSN_SEP": "0034-7744",
                        "COD_REVISTA": 4521,
                        "TPO_REVISTA": "Revista",
                        "TPO_CLASIFICACION": "A1",
                        "editorial": [{"TXT_NME_EDITORIAL": "Universidad de Costa Rica"}]
                    }]
                }
            ]}
        ]
    }"#;

    #[test]
    fn parse_nested_product() {
        let record: ProductRecord = serde_json::from_str(SAMPLE).unwrap();
        let (article, journal) = record.journal().unwrap();
        assert_eq!(journal.issn, "0034-7744");
        assert_eq!(journal.code, "4521");
        assert_eq!(journal.classification, "A1");
        assert!(article.created.starts_with("Fri"));
        assert_eq!(journal.editorial[0].name, "Universidad de Costa Rica");
    }

    #[test]
    fn product_without_journal() {
        let record: ProductRecord = serde_json::from_str(r#"{"details": [{}]}"#).unwrap();
        assert!(record.journal().is_none());
    }
}
