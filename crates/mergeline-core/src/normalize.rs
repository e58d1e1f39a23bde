//! Field normalization for raw source-system values
//!
//! Pure helpers shared by every connector. All of them accept the messy
//! shapes the vendor exports actually contain (padded whitespace, float
//! artifacts on numeric ids, separator variants in ISSNs, mixed date
//! formats) and produce the canonical forms the merge rules compare on.

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Sentinel the national systems use for an absent value.
const NOT_AVAILABLE: &str = "no disponible";

/// Accepted creation-date formats, tried in order. RFC 2822 covers the
/// vendor's `Fri, 01 Jan 2016 00:00:00 GMT` shape.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

fn float_artifact() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.0+$").expect("valid regex"))
}

/// Canonicalize a free-text value: collapse internal whitespace, trim,
/// and map the "not available" sentinel to empty.
pub fn normalize_text(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.to_lowercase() == NOT_AVAILABLE {
        return String::new();
    }
    collapsed
}

/// Like [`normalize_text`] over an optional value.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize_text).unwrap_or_default()
}

/// Canonicalize a numeric-as-text identifier, stripping the trailing
/// `.0` float artifact the spreadsheet exports introduce (`"123.0"` →
/// `"123"`).
pub fn normalize_numeric_id(value: &str) -> String {
    let text = normalize_text(value);
    if text.is_empty() {
        return text;
    }
    match float_artifact().captures(&text) {
        Some(caps) => caps[1].to_string(),
        None => text,
    }
}

/// Canonicalize an ISSN to the `NNNN-NNNN` form.
///
/// Uppercases (the check digit may be `x`), strips separators and
/// whitespace, and returns empty unless exactly eight characters remain.
pub fn normalize_issn(value: &str) -> String {
    let issn = normalize_text(value)
        .to_uppercase()
        .replace(['-', ' '], "");
    if issn.len() != 8 || !issn.is_ascii() {
        return String::new();
    }
    format!("{}-{}", &issn[..4], &issn[4..])
}

/// Convert a 4-digit year into the inclusive UTC epoch interval
/// `[Jan 1 00:00:00, Dec 31 23:59:59]`.
///
/// Years outside `[1800, 2200]` (and anything non-numeric) yield
/// `(None, None)`; the ranking merge treats that as an unbounded
/// observation rather than an error.
pub fn year_bounds(value: &str) -> (Option<i64>, Option<i64>) {
    let year_txt = normalize_numeric_id(value);
    if year_txt.is_empty() || !year_txt.chars().all(|c| c.is_ascii_digit()) {
        return (None, None);
    }
    let Ok(year) = year_txt.parse::<i32>() else {
        return (None, None);
    };
    if !(1800..=2200).contains(&year) {
        return (None, None);
    }

    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp());
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc().timestamp());
    (start, end)
}

/// Parse a record creation date in any of the known vendor formats.
///
/// Formats are tried in a fixed order: RFC 2822 first, then the naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DD` shapes interpreted as UTC. When
/// every format fails the result is `None` — the caller substitutes null
/// interval bounds instead of aborting the record.
pub fn parse_creation_date(value: &str) -> Option<i64> {
    let text = normalize_text(value);
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.timestamp());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(dt.and_utc().timestamp());
        }
        if let Ok(d) = NaiveDate::parse_from_str(&text, format) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp());
        }
    }
    None
}

/// Tag the language of a display name. Defaults to Spanish when
/// detection is inconclusive (the corpus is predominantly Colombian).
pub fn detect_lang(text: &str) -> &'static str {
    match whatlang::detect_lang(text) {
        Some(whatlang::Lang::Eng) => "en",
        Some(whatlang::Lang::Por) => "pt",
        Some(whatlang::Lang::Fra) => "fr",
        Some(whatlang::Lang::Deu) => "de",
        _ => "es",
    }
}

/// Deserialize a raw field that may arrive as string, number, or null
/// into text. Vendor exports are inconsistent here; numeric ids in
/// particular show up as `123`, `123.0`, or `"123.0"` depending on the
/// export path. Pair with [`normalize_numeric_id`] downstream.
pub fn de_stringy<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Current time as epoch seconds, the unit `updated` entries carry.
pub fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_collapses_whitespace() {
        assert_eq!(normalize_text("  Revista   de \t Biología  "), "Revista de Biología");
    }

    #[test]
    fn text_maps_sentinel_to_empty() {
        assert_eq!(normalize_text("No Disponible"), "");
        assert_eq!(normalize_text("  no   disponible "), "");
    }

    #[test]
    fn numeric_id_strips_float_artifact() {
        assert_eq!(normalize_numeric_id("123.0"), "123");
        assert_eq!(normalize_numeric_id("123.000"), "123");
        assert_eq!(normalize_numeric_id("123.5"), "123.5");
        assert_eq!(normalize_numeric_id(" 42 "), "42");
        assert_eq!(normalize_numeric_id(""), "");
    }

    #[test]
    fn issn_canonical_form() {
        assert_eq!(normalize_issn("1234-5678"), "1234-5678");
        assert_eq!(normalize_issn("12345678"), "1234-5678");
        assert_eq!(normalize_issn(" 1234 567x "), "1234-567X");
        assert_eq!(normalize_issn("1234-567"), "");
        assert_eq!(normalize_issn("no disponible"), "");
    }

    #[test]
    fn year_bounds_valid_year() {
        let (start, end) = year_bounds("2016");
        // 2016-01-01T00:00:00Z .. 2016-12-31T23:59:59Z
        assert_eq!(start, Some(1451606400));
        assert_eq!(end, Some(1483228799));
    }

    #[test]
    fn year_bounds_rejects_out_of_range() {
        assert_eq!(year_bounds("1799"), (None, None));
        assert_eq!(year_bounds("2201"), (None, None));
        assert_eq!(year_bounds("999"), (None, None));
    }

    #[test]
    fn year_bounds_accepts_boundaries() {
        assert!(year_bounds("1800").0.is_some());
        assert!(year_bounds("2200").1.is_some());
    }

    #[test]
    fn year_bounds_rejects_garbage() {
        assert_eq!(year_bounds("abc"), (None, None));
        assert_eq!(year_bounds(""), (None, None));
        assert_eq!(year_bounds("20.16"), (None, None));
    }

    #[test]
    fn year_bounds_accepts_float_artifact() {
        assert_eq!(year_bounds("2016.0"), year_bounds("2016"));
    }

    #[test]
    fn creation_date_rfc2822() {
        let ts = parse_creation_date("Fri, 01 Jan 2016 00:00:00 GMT").unwrap();
        assert_eq!(ts, 1451606400);
    }

    #[test]
    fn creation_date_naive_datetime() {
        let ts = parse_creation_date("2016-01-01 00:00:00").unwrap();
        assert_eq!(ts, 1451606400);
    }

    #[test]
    fn creation_date_naive_date() {
        let ts = parse_creation_date("2016-01-01").unwrap();
        assert_eq!(ts, 1451606400);
    }

    #[test]
    fn creation_date_exhaustion_is_none() {
        assert_eq!(parse_creation_date("01/02/2016"), None);
        assert_eq!(parse_creation_date(""), None);
    }

    #[test]
    fn lang_detection_defaults_to_spanish() {
        assert_eq!(detect_lang(""), "es");
    }

    #[test]
    fn epoch_now_is_positive() {
        assert!(epoch_now() > 0);
    }
}
