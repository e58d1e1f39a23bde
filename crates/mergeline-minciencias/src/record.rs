//! Raw product record as published by the open-data portal

use mergeline_core::normalize::de_stringy;
use serde::Deserialize;

/// One research-product row. Wire names are the portal's column names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpendataRecord {
    /// Portal product id; the tail encodes researcher + product codes.
    #[serde(rename = "id_producto_pd", default, deserialize_with = "de_stringy")]
    pub product_id: String,

    #[serde(rename = "nme_producto_pd", default)]
    pub title: String,

    #[serde(rename = "nme_tipologia_pd", default)]
    pub product_type: String,

    /// Research group code; groups live in the affiliations collection.
    #[serde(rename = "cod_grupo_gr", default, deserialize_with = "de_stringy")]
    pub group_code: String,

    #[serde(rename = "nme_grupo_gr", default)]
    pub group_name: String,

    #[serde(rename = "nro_ano_presenta_pd", default, deserialize_with = "de_stringy")]
    pub year: String,
}
