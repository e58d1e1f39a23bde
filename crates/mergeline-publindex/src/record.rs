//! Raw journal record as exported from the national index

use mergeline_core::normalize::de_stringy;
use serde::Deserialize;

/// One journal observation. Wire names are the index's own column
/// names; numeric columns arrive as numbers or as `"123.0"` strings
/// depending on the export path, so they all go through `de_stringy`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalRecord {
    #[serde(rename = "nme_revista_in", default)]
    pub name: String,

    #[serde(rename = "txt_issn_p", default)]
    pub issn_print: String,

    #[serde(rename = "txt_issn_l", default)]
    pub issn_linking: String,

    #[serde(rename = "id_revista_p", default, deserialize_with = "de_stringy")]
    pub vendor_id: String,

    /// Classification year the observation applies to.
    #[serde(rename = "nro_ano", default, deserialize_with = "de_stringy")]
    pub year: String,

    #[serde(rename = "id_clas_rev", default)]
    pub rank: String,

    #[serde(rename = "nme_inst_edit_1", default)]
    pub publisher_name: String,

    #[serde(rename = "pais_rev_in", default)]
    pub publisher_country: String,

    #[serde(rename = "nme_gran_area", default)]
    pub broad_area: String,

    #[serde(rename = "nme_area", default)]
    pub area: String,

    #[serde(rename = "nme_especialidad", default)]
    pub specialty: String,

    #[serde(rename = "id_area_con", default, deserialize_with = "de_stringy")]
    pub area_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nme_revista_in": "Revista Colombiana de Entomología",
        "txt_issn_p": "0120-0488",
        "txt_issn_l": "0120-0488",
        "id_revista_p": 1535.0,
        "nro_ano": "2016",
        "id_clas_rev": "A2",
        "nme_inst_edit_1": "Sociedad Colombiana de Entomología",
        "pais_rev_in": "Colombia",
        "nme_gran_area": "Ciencias Agrícolas",
        "nme_area": "Agricultura, Silvicultura y Pesca",
        "nme_especialidad": "No registra",
        "id_area_con": 401
    }"#;

    #[test]
    fn parse_journal_record() {
        let record: JournalRecord = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(record.name, "Revista Colombiana de Entomología");
        assert_eq!(record.vendor_id, "1535.0");
        assert_eq!(record.area_code, "401");
        assert_eq!(record.rank, "A2");
    }

    #[test]
    fn minimal_record() {
        let record: JournalRecord = serde_json::from_str("{}").unwrap();
        assert!(record.name.is_empty());
        assert!(record.vendor_id.is_empty());
    }
}
