//! Paginated fetcher: successive listing pages as typed record batches

use std::marker::PhantomData;

use papergraph_core::FetchError;

use crate::config::{MAX_PER_PAGE, PAGE_PAGING_LIMIT};
use crate::page::decode_page;
use crate::state::{Entity, PageToken, Pagination};
use crate::transform::{ApiRecord, DecodeStats};

/// Transport for one listing page.
///
/// `endpoint` is relative to the API base (e.g. `works`); the returned string
/// is the raw response body.
pub trait PageSource {
    fn get_page(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, FetchError>;
}

/// What to fetch and when to stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub entity: Entity,
    /// `filter=` expression, e.g. `institutions.id:I1,publication_year:2020-2024`
    pub filter: Option<String>,
    /// `sort=` expression, e.g. `works_count:desc`
    pub sort: Option<String>,
    pub per_page: u32,
    /// Cap on records yielded in total; the last batch is truncated to it
    pub max_items: Option<usize>,
    /// Cap on pages requested
    pub max_pages: Option<u32>,
    pub pagination: Pagination,
}

impl PageQuery {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filter: None,
            sort: None,
            per_page: MAX_PER_PAGE,
            max_items: None,
            max_pages: None,
            pagination: entity.default_pagination(),
        }
    }

    /// Page size accepted by the API: 1..=200
    pub fn effective_per_page(&self) -> u32 {
        if self.per_page > MAX_PER_PAGE {
            log::warn!(
                "per-page {} exceeds the API maximum, using {MAX_PER_PAGE}",
                self.per_page
            );
            MAX_PER_PAGE
        } else {
            self.per_page.max(1)
        }
    }
}

/// Lazy sequence of record batches, one per page.
///
/// Ends when the server has no next cursor, `meta.count` items have been seen
/// (page mode), a cap is reached or a page comes back empty. A failed request
/// is yielded once as `Err`, after which the iterator is exhausted.
pub struct Paginator<'a, S: PageSource + ?Sized, R: ApiRecord> {
    source: &'a S,
    query: PageQuery,
    per_page: u32,
    next: Option<PageToken>,
    pages_fetched: u32,
    /// Rows returned by the server, valid or not
    items_seen: usize,
    items_yielded: usize,
    total_count: Option<u64>,
    decode_stats: DecodeStats,
    _row: PhantomData<fn() -> R>,
}

impl<'a, S: PageSource + ?Sized, R: ApiRecord> Paginator<'a, S, R> {
    pub fn new(source: &'a S, query: PageQuery) -> Self {
        let per_page = query.effective_per_page();
        let next = if query.max_items == Some(0) || query.max_pages == Some(0) {
            None
        } else {
            Some(PageToken::first(query.pagination))
        };
        Self {
            source,
            query,
            per_page,
            next,
            pages_fetched: 0,
            items_seen: 0,
            items_yielded: 0,
            total_count: None,
            decode_stats: DecodeStats::default(),
            _row: PhantomData,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn items_yielded(&self) -> usize {
        self.items_yielded
    }

    /// `meta.count` of the first page, once fetched
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Skipped-row counters over all pages so far
    pub fn decode_stats(&self) -> DecodeStats {
        self.decode_stats
    }

    fn request_params(&self, token: &PageToken) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(filter) = &self.query.filter {
            params.push(("filter", filter.clone()));
        }
        params.push(("per-page", self.per_page.to_string()));
        params.push(token.query_param());
        if let Some(sort) = &self.query.sort {
            params.push(("sort", sort.clone()));
        }
        params
    }

    fn following_token(&self, current: PageToken, next_cursor: Option<String>) -> Option<PageToken> {
        if let Some(max) = self.query.max_pages {
            if self.pages_fetched >= max {
                return None;
            }
        }
        match current {
            PageToken::Cursor(_) => next_cursor.map(PageToken::Cursor),
            PageToken::Page(p) => match self.total_count {
                Some(count) if self.items_seen as u64 >= count => None,
                _ if u64::from(p) * u64::from(self.per_page) >= PAGE_PAGING_LIMIT => {
                    log::warn!(
                        "{}: page paging stops at {PAGE_PAGING_LIMIT} results, {} of {} fetched",
                        self.query.entity,
                        self.items_seen,
                        self.total_count.map_or("?".to_string(), |c| c.to_string())
                    );
                    None
                }
                _ => Some(PageToken::Page(p + 1)),
            },
        }
    }
}

impl<S: PageSource + ?Sized, R: ApiRecord> Iterator for Paginator<'_, S, R> {
    type Item = Result<Vec<R::Record>, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next.take()?;
        let endpoint = self.query.entity.endpoint();
        let params = self.request_params(&token);

        let page = match self
            .source
            .get_page(endpoint, &params)
            .and_then(|body| decode_page::<R>(&body))
        {
            Ok(page) => page,
            Err(e) => {
                log::error!(
                    "{endpoint}: page {} failed after {} items: {e}",
                    self.pages_fetched + 1,
                    self.items_yielded
                );
                return Some(Err(e));
            }
        };

        self.pages_fetched += 1;
        self.decode_stats.merge(&page.stats);
        if self.total_count.is_none() {
            self.total_count = page.meta.count;
        }

        if page.raw_count == 0 {
            if self.pages_fetched == 1 {
                log::warn!("{endpoint}: no results for this query");
            }
            return None;
        }
        self.items_seen += page.raw_count;

        let mut records = page.records;
        let mut capped = false;
        if let Some(max) = self.query.max_items {
            let remaining = max.saturating_sub(self.items_yielded);
            if records.len() >= remaining {
                records.truncate(remaining);
                capped = true;
            }
        }
        self.items_yielded += records.len();

        match self.total_count {
            Some(total) => log::info!(
                "{endpoint}: page {} fetched, {} / {total} items",
                self.pages_fetched,
                self.items_yielded
            ),
            None => log::info!(
                "{endpoint}: page {} fetched, {} items",
                self.pages_fetched,
                self.items_yielded
            ),
        }

        if capped {
            log::info!("{endpoint}: item cap reached");
        } else {
            self.next = self.following_token(token, page.meta.next_cursor);
        }

        Some(Ok(records))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::transform::{InstitutionRow, WorkRow};

    /// Serves canned bodies in order and records every request.
    struct FakeSource {
        bodies: RefCell<VecDeque<Result<String, FetchError>>>,
        requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeSource {
        fn new(bodies: Vec<Result<String, FetchError>>) -> Self {
            Self {
                bodies: RefCell::new(bodies.into()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn param(&self, request: usize, key: &str) -> Option<String> {
            self.requests.borrow()[request]
                .1
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }

        fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl PageSource for FakeSource {
        fn get_page(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
            self.requests.borrow_mut().push((
                endpoint.to_string(),
                query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            self.bodies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Decode("no more pages".into())))
        }
    }

    fn works_page(ids: &[&str], count: u64, next_cursor: Option<&str>) -> Result<String, FetchError> {
        let results: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"id": "https://openalex.org/{id}", "authorships": []}}"#))
            .collect();
        let cursor = next_cursor.map_or("null".to_string(), |c| format!("\"{c}\""));
        Ok(format!(
            r#"{{"meta": {{"count": {count}, "next_cursor": {cursor}}}, "results": [{}]}}"#,
            results.join(",")
        ))
    }

    fn ids(batch: &[crate::transform::WorkRecord]) -> Vec<&str> {
        batch.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn cursor_follows_next_cursor_until_absent() {
        let source = FakeSource::new(vec![
            works_page(&["W1", "W2"], 3, Some("c2")),
            works_page(&["W3"], 3, None),
        ]);
        let mut query = PageQuery::new(Entity::Works);
        query.filter = Some("institutions.id:I1".into());
        query.per_page = 2;

        let mut pages = Paginator::<_, WorkRow>::new(&source, query);
        let batches: Vec<_> = pages.by_ref().map(Result::unwrap).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(ids(&batches[0]), vec!["W1", "W2"]);
        assert_eq!(ids(&batches[1]), vec!["W3"]);

        assert_eq!(source.request_count(), 2);
        assert_eq!(source.param(0, "cursor").as_deref(), Some("*"));
        assert_eq!(source.param(1, "cursor").as_deref(), Some("c2"));
        assert_eq!(source.param(0, "per-page").as_deref(), Some("2"));
        assert_eq!(source.param(0, "filter").as_deref(), Some("institutions.id:I1"));
        assert_eq!(source.requests.borrow()[0].0, "works");
        assert_eq!(pages.pages_fetched(), 2);
        assert_eq!(pages.items_yielded(), 3);
        assert_eq!(pages.total_count(), Some(3));
    }

    #[test]
    fn empty_first_page_yields_nothing() {
        let source = FakeSource::new(vec![works_page(&[], 0, None)]);
        let mut pages = Paginator::<_, WorkRow>::new(&source, PageQuery::new(Entity::Works));
        assert!(pages.next().is_none());
        assert_eq!(pages.pages_fetched(), 1);
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn empty_page_stops_even_with_cursor() {
        let source = FakeSource::new(vec![
            works_page(&["W1"], 10, Some("c2")),
            works_page(&[], 10, Some("c3")),
        ]);
        let batches: Vec<_> = Paginator::<_, WorkRow>::new(&source, PageQuery::new(Entity::Works))
            .collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn item_cap_truncates_last_batch() {
        let source = FakeSource::new(vec![
            works_page(&["W1", "W2"], 10, Some("c2")),
            works_page(&["W3", "W4"], 10, Some("c3")),
        ]);
        let mut query = PageQuery::new(Entity::Works);
        query.max_items = Some(3);

        let batches: Vec<_> = Paginator::<_, WorkRow>::new(&source, query)
            .map(Result::unwrap)
            .collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(ids(&batches[1]), vec!["W3"]);
        // cap hit: no third request
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn cap_on_page_boundary_stops_without_extra_request() {
        let source = FakeSource::new(vec![works_page(&["W1", "W2"], 10, Some("c2"))]);
        let mut query = PageQuery::new(Entity::Works);
        query.max_items = Some(2);
        let batches: Vec<_> = Paginator::<_, WorkRow>::new(&source, query).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(source.request_count(), 1);
    }

    #[test]
    fn zero_cap_sends_no_request() {
        let source = FakeSource::new(vec![]);
        let mut query = PageQuery::new(Entity::Works);
        query.max_items = Some(0);
        assert!(Paginator::<_, WorkRow>::new(&source, query).next().is_none());
        assert_eq!(source.request_count(), 0);
    }

    #[test]
    fn error_yielded_once_then_exhausted() {
        let source = FakeSource::new(vec![
            works_page(&["W1"], 10, Some("c2")),
            Err(FetchError::Http {
                status: Some(500),
                message: "boom".into(),
            }),
            works_page(&["W9"], 10, None),
        ]);
        let mut pages = Paginator::<_, WorkRow>::new(&source, PageQuery::new(Entity::Works));
        assert!(pages.next().unwrap().is_ok());
        let err = pages.next().unwrap().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(pages.next().is_none());
        assert_eq!(source.request_count(), 2);
        assert_eq!(pages.items_yielded(), 1);
    }

    #[test]
    fn malformed_envelope_is_error() {
        let source = FakeSource::new(vec![Ok("not json".into())]);
        let mut pages = Paginator::<_, WorkRow>::new(&source, PageQuery::new(Entity::Works));
        assert!(matches!(pages.next(), Some(Err(FetchError::Decode(_)))));
        assert!(pages.next().is_none());
    }

    #[test]
    fn page_mode_stops_at_meta_count() {
        let page = |ids: &[&str]| -> Result<String, FetchError> {
            let results: Vec<String> = ids
                .iter()
                .map(|id| format!(r#"{{"id": "{id}", "display_name": "{id}"}}"#))
                .collect();
            Ok(format!(r#"{{"meta": {{"count": 3}}, "results": [{}]}}"#, results.join(",")))
        };
        let source = FakeSource::new(vec![page(&["I1", "I2"]), page(&["I3"])]);
        let mut query = PageQuery::new(Entity::Institutions);
        query.per_page = 2;
        query.sort = Some("works_count:desc".into());

        let batches: Vec<_> = Paginator::<_, InstitutionRow>::new(&source, query)
            .map(Result::unwrap)
            .collect();
        assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), 3);
        assert_eq!(source.request_count(), 2);
        assert_eq!(source.param(0, "page").as_deref(), Some("1"));
        assert_eq!(source.param(1, "page").as_deref(), Some("2"));
        assert_eq!(source.param(1, "sort").as_deref(), Some("works_count:desc"));
        assert!(source.param(0, "cursor").is_none());
    }

    #[test]
    fn page_mode_respects_max_pages() {
        let page = || -> Result<String, FetchError> {
            Ok(r#"{"meta": {"count": 100}, "results": [{"id": "I1"}]}"#.into())
        };
        let source = FakeSource::new(vec![page(), page(), page()]);
        let mut query = PageQuery::new(Entity::Institutions);
        query.max_pages = Some(2);
        let batches: Vec<_> = Paginator::<_, InstitutionRow>::new(&source, query).collect();
        assert_eq!(batches.len(), 2);
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn page_mode_stops_at_paging_limit() {
        let page = || -> Result<String, FetchError> {
            let results: Vec<String> = (0..200).map(|i| format!(r#"{{"id": "I{i}"}}"#)).collect();
            Ok(format!(
                r#"{{"meta": {{"count": 100000}}, "results": [{}]}}"#,
                results.join(",")
            ))
        };
        // one spare body: a 51st request would succeed, so only the limit stops it
        let source = FakeSource::new((0..51).map(|_| page()).collect());
        let mut pages = Paginator::<_, InstitutionRow>::new(&source, PageQuery::new(Entity::Institutions));
        let total: usize = pages.by_ref().map(|b| b.unwrap().len()).sum();
        assert_eq!(total, 10_000);
        assert_eq!(source.request_count(), 50);
        assert_eq!(source.param(49, "page").as_deref(), Some("50"));
        assert_eq!(pages.pages_fetched(), 50);
    }

    #[test]
    fn page_limit_respects_page_size() {
        let page = || -> Result<String, FetchError> {
            let results: Vec<String> = (0..150).map(|i| format!(r#"{{"id": "I{i}"}}"#)).collect();
            Ok(format!(
                r#"{{"meta": {{"count": 100000}}, "results": [{}]}}"#,
                results.join(",")
            ))
        };
        let source = FakeSource::new((0..80).map(|_| page()).collect());
        let mut query = PageQuery::new(Entity::Institutions);
        query.per_page = 150;
        let batches = Paginator::<_, InstitutionRow>::new(&source, query).count();
        // ceil(10_000 / 150)
        assert_eq!(batches, 67);
        assert_eq!(source.request_count(), 67);
    }

    #[test]
    fn per_page_clamped() {
        let mut query = PageQuery::new(Entity::Works);
        query.per_page = 500;
        assert_eq!(query.effective_per_page(), 200);
        query.per_page = 0;
        assert_eq!(query.effective_per_page(), 1);
        query.per_page = 50;
        assert_eq!(query.effective_per_page(), 50);
    }

    #[test]
    fn decode_stats_accumulate_across_pages() {
        let source = FakeSource::new(vec![
            Ok(r#"{"meta": {"next_cursor": "c2"}, "results": [{"id": "W1"}, {"title": "no id"}]}"#.into()),
            Ok(r#"{"meta": {}, "results": [{"id": "W2", "authorships": [{"author": null}]}]}"#.into()),
        ]);
        let mut pages = Paginator::<_, WorkRow>::new(&source, PageQuery::new(Entity::Works));
        let total: usize = pages.by_ref().map(|b| b.unwrap().len()).sum();
        assert_eq!(total, 2);
        let stats = pages.decode_stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.skipped_records, 1);
        assert_eq!(stats.skipped_authorships, 1);
    }
}
