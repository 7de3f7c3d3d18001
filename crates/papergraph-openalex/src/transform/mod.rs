//! JSON rows → typed records for OpenAlex entities
//!
//! Raw rows mirror the API payload with every field optional. Conversion into
//! records happens here, at the API boundary, so downstream code never has to
//! deal with missing identifiers.

pub mod institution;
pub mod work;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A raw API row that converts into a typed record.
pub trait ApiRecord: DeserializeOwned {
    type Record;

    /// Convert to a record, or `None` when the row is unusable.
    ///
    /// Recoverable gaps (e.g. an authorship without an author) are counted in `stats`.
    fn into_record(self, stats: &mut DecodeStats) -> Option<Self::Record>;
}

/// Counters for rows and sub-rows dropped while decoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Records converted successfully
    pub records: usize,
    /// Rows that failed to deserialize or lacked an id
    pub skipped_records: usize,
    /// Authorships without a resolvable author id
    pub skipped_authorships: usize,
}

impl DecodeStats {
    pub fn merge(&mut self, other: &DecodeStats) {
        self.records += other.records;
        self.skipped_records += other.skipped_records;
        self.skipped_authorships += other.skipped_authorships;
    }
}

/// Extract short ID from full OpenAlex URL (e.g., "https://openalex.org/A123" -> "A123")
pub fn short_id(url: &str) -> &str {
    url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(url)
}

/// `null` and missing both decode to `T::default()`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Trimmed, non-empty string or `None`
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// Re-exports
pub use institution::{InstitutionRecord, InstitutionRow};
pub use work::{Authorship, InstitutionRef, WorkRecord, WorkRow};
