//! OpenAlex publisher JSON structure

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PublisherRow {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// External identifiers keyed by source (openalex, ror, wikidata, …).
    #[serde(default)]
    pub ids: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub lineage: Vec<String>,

    #[serde(default)]
    pub parent_publisher: Option<ParentPublisher>,

    #[serde(default)]
    pub hierarchy_level: i32,

    #[serde(default)]
    pub homepage_url: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub x_concepts: Vec<Concept>,
}

#[derive(Debug, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ParentPublisher {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Concept {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub level: i32,
}

impl PublisherRow {
    /// (source, value) pairs from the ids map, stringified, empties
    /// dropped. BTreeMap order keeps the lookup deterministic.
    pub fn id_pairs(&self) -> Vec<(String, String)> {
        self.ids
            .iter()
            .filter_map(|(source, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                if text.is_empty() {
                    None
                } else {
                    Some((source.clone(), text))
                }
            })
            .collect()
    }

    /// The institution this publisher also acts as, when the roles say
    /// so.
    pub fn institution_id(&self) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.role == "institution" && !r.id.is_empty())
            .map(|r| r.id.as_str())
    }
}
