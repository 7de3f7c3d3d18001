//! Listing response envelope: `{"meta": {...}, "results": [...]}`

use papergraph_core::FetchError;
use serde::Deserialize;

use crate::transform::{ApiRecord, DecodeStats};

/// `meta` object of a listing response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    /// Total number of matching items
    #[serde(default)]
    pub count: Option<u64>,
    /// Present while more cursor pages remain
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<R> {
    #[serde(default)]
    meta: Meta,
    #[serde(default = "Vec::new")]
    results: Vec<R>,
}

/// One decoded page
#[derive(Debug)]
pub struct DecodedPage<T> {
    pub meta: Meta,
    /// Number of entries in `results`, valid or not
    pub raw_count: usize,
    pub records: Vec<T>,
    pub stats: DecodeStats,
}

/// Decode a listing response body into typed records.
///
/// Fast path: the whole page in one pass with sonic-rs. If any row is
/// structurally invalid, the envelope is re-read row by row with serde_json
/// and the bad rows are skipped and counted. Only a broken envelope is an error.
pub fn decode_page<R: ApiRecord>(body: &str) -> Result<DecodedPage<R::Record>, FetchError> {
    match sonic_rs::from_str::<Envelope<R>>(body) {
        Ok(page) => Ok(convert(page.meta, page.results, DecodeStats::default())),
        Err(fast_err) => {
            log::debug!("fast page decode failed ({fast_err}), salvaging row by row");
            decode_page_salvage::<R>(body)
        }
    }
}

fn decode_page_salvage<R: ApiRecord>(body: &str) -> Result<DecodedPage<R::Record>, FetchError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let raw_count = envelope.results.len();
    let mut stats = DecodeStats::default();
    let mut rows = Vec::with_capacity(raw_count);
    for (idx, value) in envelope.results.into_iter().enumerate() {
        match serde_json::from_value::<R>(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::warn!("skipping invalid record #{idx} in page: {e}");
                stats.skipped_records += 1;
            }
        }
    }

    let mut page = convert(envelope.meta, rows, stats);
    page.raw_count = raw_count;
    Ok(page)
}

fn convert<R: ApiRecord>(meta: Meta, rows: Vec<R>, mut stats: DecodeStats) -> DecodedPage<R::Record> {
    let raw_count = rows.len();
    let records = rows
        .into_iter()
        .filter_map(|row| row.into_record(&mut stats))
        .collect();
    DecodedPage {
        meta,
        raw_count,
        records,
        stats,
    }
}

/// Decode a single-entity response (e.g. `/institutions/I123`).
pub fn decode_single<R: ApiRecord>(body: &str) -> Result<R::Record, FetchError> {
    let row: R = serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    row.into_record(&mut DecodeStats::default())
        .ok_or_else(|| FetchError::Decode("entity has no id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{InstitutionRow, WorkRow};

    #[test]
    fn decode_cursor_page() {
        let body = r#"{
            "meta": {"count": 3, "per_page": 2, "next_cursor": "abc"},
            "results": [
                {"id": "https://openalex.org/W1", "authorships": []},
                {"id": "https://openalex.org/W2", "authorships": []}
            ]
        }"#;
        let page = decode_page::<WorkRow>(body).unwrap();
        assert_eq!(page.meta.count, Some(3));
        assert_eq!(page.meta.next_cursor.as_deref(), Some("abc"));
        assert_eq!(page.raw_count, 2);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1].id, "W2");
        assert_eq!(page.stats.records, 2);
    }

    #[test]
    fn decode_last_cursor_page() {
        let body = r#"{"meta": {"count": 0, "next_cursor": null}, "results": []}"#;
        let page = decode_page::<WorkRow>(body).unwrap();
        assert!(page.meta.next_cursor.is_none());
        assert_eq!(page.raw_count, 0);
    }

    #[test]
    fn invalid_row_skipped_and_counted() {
        // "authorships" must be an array
        let body = r#"{
            "meta": {"count": 2},
            "results": [
                {"id": "W1", "authorships": "oops"},
                {"id": "W2", "authorships": []}
            ]
        }"#;
        let page = decode_page::<WorkRow>(body).unwrap();
        assert_eq!(page.raw_count, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "W2");
        assert_eq!(page.stats.skipped_records, 1);
    }

    #[test]
    fn row_without_id_counted() {
        let body = r#"{"meta": {}, "results": [{"display_name": "x"}, {"id": "I2"}]}"#;
        let page = decode_page::<InstitutionRow>(body).unwrap();
        assert_eq!(page.raw_count, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.stats.skipped_records, 1);
    }

    #[test]
    fn broken_envelope_is_error() {
        let err = decode_page::<WorkRow>("{\"meta\": ").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn non_json_is_error() {
        let err = decode_page::<WorkRow>("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn single_entity() {
        let record =
            decode_single::<InstitutionRow>(r#"{"id": "https://openalex.org/I1", "display_name": "X"}"#)
                .unwrap();
        assert_eq!(record.id, "I1");
        assert_eq!(record.display_name, "X");
    }

    #[test]
    fn single_entity_without_id() {
        assert!(decode_single::<InstitutionRow>("{}").is_err());
    }
}
