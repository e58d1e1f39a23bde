//! Parse a raw portal row into a work skeleton plus link candidates

use mergeline_core::document::{TitleEntry, TypeEntry, WorkDoc};
use mergeline_core::identity::ProductKey;
use mergeline_core::merge;
use mergeline_core::normalize::{detect_lang, normalize_numeric_id, normalize_text};

pub const SOURCE: &str = "minciencias";

/// A portal row after parsing: the work skeleton (titles, type,
/// identifiers, year) plus the unresolved links the process step turns
/// into canonical references.
#[derive(Debug, Clone)]
pub struct ParsedProduct {
    pub key: Option<ProductKey>,
    pub title: String,
    pub group_code: String,
    pub work: WorkDoc,
}

pub fn parse_record(record: &crate::record::OpendataRecord) -> ParsedProduct {
    let key = ProductKey::parse(&record.product_id);
    let title = normalize_text(&record.title);

    let mut work = WorkDoc::default();
    if !title.is_empty() {
        work.titles.push(TitleEntry {
            title: title.clone(),
            lang: detect_lang(&title).to_string(),
            source: SOURCE.to_string(),
        });
    }

    let product_type = normalize_text(&record.product_type);
    if !product_type.is_empty() {
        work.types.push(TypeEntry {
            source: SOURCE.to_string(),
            value: product_type,
        });
    }

    if let Some(key) = &key {
        merge::append_external_id(&mut work.external_ids, SOURCE, key.id_value());
    }

    let year = normalize_numeric_id(&record.year);
    work.year_published = year.parse::<i32>().ok().filter(|y| (1800..=2200).contains(y));

    ParsedProduct {
        key,
        title,
        group_code: normalize_numeric_id(&record.group_code),
        work,
    }
}
