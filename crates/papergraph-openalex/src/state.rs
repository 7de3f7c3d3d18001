//! Entity and pagination types for OpenAlex API listings

use std::fmt;

/// OpenAlex entity types reachable through the listing endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Academic works (papers, articles, etc.)
    Works,
    /// Universities, research organizations
    Institutions,
}

impl Entity {
    /// Listing endpoint path, relative to the API base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::Institutions => "institutions",
        }
    }

    /// Pagination mode used for this listing.
    ///
    /// Works are walked with cursors (no result ceiling); the institution
    /// listing uses page numbers, which stop at `PAGE_PAGING_LIMIT` results.
    pub fn default_pagination(&self) -> Pagination {
        match self {
            Self::Works => Pagination::Cursor,
            Self::Institutions => Pagination::Page,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// How successive pages are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `cursor=*`, then the `meta.next_cursor` of each response
    Cursor,
    /// `page=1, 2, ...` until `meta.count` items have been seen, at most
    /// `PAGE_PAGING_LIMIT` results deep
    Page,
}

/// Where the next request starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    Cursor(String),
    Page(u32),
}

impl PageToken {
    pub fn first(mode: Pagination) -> Self {
        match mode {
            Pagination::Cursor => Self::Cursor("*".to_string()),
            Pagination::Page => Self::Page(1),
        }
    }

    /// Query parameter for this token
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            Self::Cursor(c) => ("cursor", c.clone()),
            Self::Page(p) => ("page", p.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_display() {
        assert_eq!(Entity::Works.to_string(), "works");
    }

    #[test]
    fn default_pagination() {
        assert_eq!(Entity::Works.default_pagination(), Pagination::Cursor);
        assert_eq!(Entity::Institutions.default_pagination(), Pagination::Page);
    }

    #[test]
    fn first_tokens() {
        assert_eq!(
            PageToken::first(Pagination::Cursor).query_param(),
            ("cursor", "*".to_string())
        );
        assert_eq!(
            PageToken::first(Pagination::Page).query_param(),
            ("page", "1".to_string())
        );
    }
}
