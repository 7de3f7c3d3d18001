//! Query configuration for OpenAlex listings

use crate::fetch::PageQuery;
use crate::state::Entity;

/// Largest `per-page` the API accepts
pub const MAX_PER_PAGE: u32 = 200;

/// Deepest result the API serves with `page=` paging; cursors have no limit
pub const PAGE_PAGING_LIMIT: u64 = 10_000;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Works of one institution over a range of publication years
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksQuery {
    /// Short institution id, e.g. "I97018004"
    pub institution_id: String,
    pub from_year: i32,
    pub to_year: i32,
    pub per_page: u32,
    /// Stop after this many works
    pub max_items: Option<usize>,
}

impl WorksQuery {
    pub fn new(institution_id: impl Into<String>, from_year: i32, to_year: i32) -> Self {
        Self {
            institution_id: institution_id.into(),
            from_year,
            to_year,
            per_page: MAX_PER_PAGE,
            max_items: None,
        }
    }

    /// `institutions.id:<ID>,publication_year:<from>-<to>`
    pub fn filter_expression(&self) -> String {
        format!(
            "institutions.id:{},publication_year:{}-{}",
            self.institution_id, self.from_year, self.to_year
        )
    }

    pub fn to_page_query(&self) -> PageQuery {
        let mut query = PageQuery::new(Entity::Works);
        query.filter = Some(self.filter_expression());
        query.per_page = self.per_page;
        query.max_items = self.max_items;
        query
    }
}

/// Full institution listing, largest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionsQuery {
    pub per_page: u32,
    /// Stop after this many pages
    pub max_pages: Option<u32>,
    pub filter: Option<String>,
}

impl Default for InstitutionsQuery {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            max_pages: None,
            filter: None,
        }
    }
}

impl InstitutionsQuery {
    pub fn to_page_query(&self) -> PageQuery {
        let mut query = PageQuery::new(Entity::Institutions);
        query.filter = self.filter.clone();
        query.sort = Some("works_count:desc".to_string());
        query.per_page = self.per_page;
        query.max_pages = self.max_pages;
        query
    }
}
