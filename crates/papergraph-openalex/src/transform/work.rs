//! Work entity transformation: JSON → WorkRecord

use serde::Deserialize;

use super::{ApiRecord, DecodeStats, non_empty, nullable, short_id};

// === Row structs (deserialized from JSON) ===

/// OpenAlex Work JSON structure (fields needed for network analysis)
#[derive(Debug, Deserialize)]
pub struct WorkRow {
    /// OpenAlex ID (e.g., "https://openalex.org/W2741809807")
    #[serde(default)]
    pub id: Option<String>,

    /// Title of the work
    #[serde(default)]
    pub display_name: Option<String>,

    /// Publication year
    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Authorships (authors + institutions)
    #[serde(default, deserialize_with = "nullable")]
    pub authorships: Vec<AuthorshipRow>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorshipRow {
    #[serde(default)]
    pub author: Option<AuthorRow>,
    #[serde(default, deserialize_with = "nullable")]
    pub institutions: Vec<InstitutionRefRow>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub orcid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstitutionRefRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

// === Typed records ===

/// A work with its resolvable authorships, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    /// Short id, e.g. "W2741809807"
    pub id: String,
    pub title: Option<String>,
    pub publication_year: Option<i32>,
    pub authorships: Vec<Authorship>,
    /// First affiliation of each authorship whose author has no id. These
    /// authors stay out of the co-author graph but their institutions still
    /// count as collaborators.
    pub unattributed_institutions: Vec<InstitutionRef>,
}

/// One author on one work, with the affiliations listed for that work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorship {
    /// Short id, e.g. "A5023888391"
    pub author_id: String,
    /// Empty when the API has no display name
    pub display_name: String,
    pub orcid: Option<String>,
    pub institutions: Vec<InstitutionRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionRef {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub country_code: Option<String>,
}

impl Authorship {
    /// Affiliation used for this authorship: the first one listed.
    pub fn primary_institution(&self) -> Option<&InstitutionRef> {
        self.institutions.first()
    }
}

impl WorkRecord {
    /// Primary affiliation of every authorship, attributed or not, in API order
    pub fn affiliations(&self) -> impl Iterator<Item = &InstitutionRef> {
        self.authorships
            .iter()
            .filter_map(Authorship::primary_institution)
            .chain(&self.unattributed_institutions)
    }
}

impl AuthorshipRow {
    /// `Err` carries the primary affiliation of an authorship without author id
    fn into_authorship(self) -> Result<Authorship, Option<InstitutionRef>> {
        let mut institutions = self.institutions.into_iter().map(InstitutionRefRow::into_ref);
        let Some(author) = self.author else {
            return Err(institutions.next());
        };
        let Some(author_id) = non_empty(author.id) else {
            return Err(institutions.next());
        };
        Ok(Authorship {
            author_id: short_id(&author_id).to_string(),
            display_name: author.display_name.unwrap_or_default(),
            orcid: non_empty(author.orcid),
            institutions: institutions.collect(),
        })
    }
}

impl InstitutionRefRow {
    fn into_ref(self) -> InstitutionRef {
        InstitutionRef {
            id: non_empty(self.id).map(|id| short_id(&id).to_string()),
            display_name: non_empty(self.display_name),
            country_code: non_empty(self.country_code),
        }
    }
}

impl ApiRecord for WorkRow {
    type Record = WorkRecord;

    fn into_record(self, stats: &mut DecodeStats) -> Option<WorkRecord> {
        let Some(id) = non_empty(self.id) else {
            stats.skipped_records += 1;
            return None;
        };

        let mut authorships = Vec::with_capacity(self.authorships.len());
        let mut unattributed_institutions = Vec::new();
        for row in self.authorships {
            match row.into_authorship() {
                Ok(authorship) => authorships.push(authorship),
                Err(institution) => {
                    stats.skipped_authorships += 1;
                    unattributed_institutions.extend(institution);
                }
            }
        }
        stats.records += 1;

        Some(WorkRecord {
            id: short_id(&id).to_string(),
            title: self.display_name,
            publication_year: self.publication_year,
            authorships,
            unattributed_institutions,
        })
    }
}
