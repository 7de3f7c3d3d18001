//! Institution entity transformation: JSON → InstitutionRecord

use serde::Deserialize;

use super::{ApiRecord, DecodeStats, non_empty, short_id};

// === Row struct (deserialized from JSON) ===

/// OpenAlex Institution JSON structure
#[derive(Debug, Deserialize)]
pub struct InstitutionRow {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub ror: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(rename = "type", default)]
    pub institution_type: Option<String>,

    #[serde(default)]
    pub works_count: Option<u64>,

    #[serde(default)]
    pub cited_by_count: Option<u64>,

    #[serde(default)]
    pub homepage_url: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// An institution from the listing or lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionRecord {
    /// Short id, e.g. "I97018004"
    pub id: String,
    pub display_name: String,
    pub country_code: Option<String>,
    pub institution_type: Option<String>,
    pub works_count: u64,
    pub cited_by_count: u64,
    pub ror: Option<String>,
    pub homepage_url: Option<String>,
    pub image_url: Option<String>,
}

impl ApiRecord for InstitutionRow {
    type Record = InstitutionRecord;

    fn into_record(self, stats: &mut DecodeStats) -> Option<InstitutionRecord> {
        let Some(id) = non_empty(self.id) else {
            stats.skipped_records += 1;
            return None;
        };
        stats.records += 1;
        Some(InstitutionRecord {
            id: short_id(&id).to_string(),
            display_name: self.display_name.unwrap_or_default(),
            country_code: non_empty(self.country_code),
            institution_type: non_empty(self.institution_type),
            works_count: self.works_count.unwrap_or(0),
            cited_by_count: self.cited_by_count.unwrap_or(0),
            ror: non_empty(self.ror),
            homepage_url: non_empty(self.homepage_url),
            image_url: non_empty(self.image_url),
        })
    }
}
