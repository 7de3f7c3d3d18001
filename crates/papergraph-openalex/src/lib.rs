//! Papergraph OpenAlex - OpenAlex REST API client
//!
//! This crate fetches works and institutions from the OpenAlex listing
//! endpoints page by page and decodes them into typed records.
//!
//! # Example
//!
//! ```no_run
//! use papergraph_openalex::{OpenAlexClient, WorksQuery};
//!
//! let client = OpenAlexClient::new("me@example.org");
//! let mut query = WorksQuery::new("I97018004", 2020, 2024);
//! query.max_items = Some(500);
//!
//! for batch in client.works(&query) {
//!     let batch = batch.expect("fetch failed");
//!     println!("{} works", batch.len());
//! }
//! ```

pub mod client;
pub mod config;
pub mod fetch;
pub mod page;
pub mod state;
pub mod transform;

// Re-exports for convenience
pub use client::OpenAlexClient;
pub use config::{DEFAULT_BASE_URL, InstitutionsQuery, MAX_PER_PAGE, PAGE_PAGING_LIMIT, WorksQuery};
pub use fetch::{PageQuery, PageSource, Paginator};
pub use page::{DecodedPage, Meta, decode_page, decode_single};
pub use state::{Entity, PageToken, Pagination};
pub use transform::{
    ApiRecord, Authorship, DecodeStats, InstitutionRecord, InstitutionRef, InstitutionRow,
    WorkRecord, WorkRow, short_id,
};
