//! Blocking OpenAlex REST client

use papergraph_core::{FetchError, contact_user_agent, get_text, retry_with_backoff};

use crate::config::{DEFAULT_BASE_URL, InstitutionsQuery, WorksQuery};
use crate::fetch::{PageSource, Paginator};
use crate::page::decode_single;
use crate::transform::{InstitutionRecord, InstitutionRow, WorkRow};

/// OpenAlex API client identified by a contact email.
///
/// Requests are made one at a time. Retries happen only when `max_retries > 0`.
#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    base_url: String,
    user_agent: String,
    max_retries: u32,
}

impl OpenAlexClient {
    pub fn new(email: &str) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: contact_user_agent(email),
            max_retries: 0,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Works matching `query`, cursor-paginated
    pub fn works(&self, query: &WorksQuery) -> Paginator<'_, Self, WorkRow> {
        Paginator::new(self, query.to_page_query())
    }

    /// Institutions sorted by `works_count:desc`, page-paginated
    pub fn institutions(&self, query: &InstitutionsQuery) -> Paginator<'_, Self, InstitutionRow> {
        Paginator::new(self, query.to_page_query())
    }

    /// Single institution by short id
    pub fn institution(&self, id: &str) -> Result<InstitutionRecord, FetchError> {
        let body = self.get_page(&format!("institutions/{id}"), &[])?;
        decode_single::<InstitutionRow>(&body)
    }
}

impl PageSource for OpenAlexClient {
    fn get_page(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        retry_with_backoff(endpoint, self.max_retries, || {
            get_text(&url, query, &self.user_agent)
        })
    }
}
