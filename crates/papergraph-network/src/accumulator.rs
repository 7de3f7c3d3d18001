//! Running co-authorship totals folded from fetched work batches

use papergraph_openalex::{Authorship, WorkRecord};
use rustc_hash::{FxHashMap, FxHashSet};

/// Accumulator trait for folding fetched batches into running totals.
///
/// Accumulation is not idempotent: pushing the same item twice counts it twice.
pub trait Accumulate {
    type Item;

    /// Fold one item into the running totals
    fn push(&mut self, item: &Self::Item);

    /// Fold a whole batch, in order
    fn accumulate(&mut self, batch: &[Self::Item]) {
        for item in batch {
            self.push(item);
        }
    }
}

/// An author (or, in the collaboration network, an institution) as a graph node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorNode {
    pub id: String,
    /// Empty when the API has no display name
    pub name: String,
    pub orcid: Option<String>,
    pub institution: Option<String>,
    /// Works this author appears on (collaboration count for institutions)
    pub publications: u32,
}

impl AuthorNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            orcid: None,
            institution: None,
            publications: 0,
        }
    }

    fn from_authorship(authorship: &Authorship) -> Self {
        Self {
            id: authorship.author_id.clone(),
            name: authorship.display_name.clone(),
            orcid: authorship.orcid.clone(),
            institution: primary_institution_name(authorship),
            publications: 0,
        }
    }

    /// Fill metadata still missing. Values already recorded are never replaced.
    fn fill_missing(&mut self, authorship: &Authorship) {
        if self.name.is_empty() && !authorship.display_name.is_empty() {
            self.name = authorship.display_name.clone();
        }
        if self.orcid.is_none() {
            self.orcid = authorship.orcid.clone();
        }
        if self.institution.is_none() {
            self.institution = primary_institution_name(authorship);
        }
    }
}

fn primary_institution_name(authorship: &Authorship) -> Option<String> {
    authorship
        .primary_institution()
        .and_then(|inst| inst.display_name.clone())
}

/// Unordered author pair in canonical order (smallest id first)
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Per-author publication counts and per-pair co-authorship counts.
///
/// One owned value per run, passed by `&mut` to each batch.
#[derive(Debug, Default)]
pub struct CoauthorAccumulator {
    authors: FxHashMap<String, AuthorNode>,
    pairs: FxHashMap<(String, String), u32>,
    works_processed: usize,
    works_without_authors: usize,
}

impl CoauthorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(&self, id: &str) -> Option<&AuthorNode> {
        self.authors.get(id)
    }

    pub fn authors(&self) -> impl Iterator<Item = &AuthorNode> {
        self.authors.values()
    }

    /// Canonical pairs with their co-occurrence counts
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.pairs
            .iter()
            .map(|((a, b), weight)| (a.as_str(), b.as_str(), *weight))
    }

    /// Number of works on which both authors appear, in either argument order
    pub fn pair_weight(&self, a: &str, b: &str) -> u32 {
        let (a, b) = canonical_pair(a, b);
        self.pairs
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn works_processed(&self) -> usize {
        self.works_processed
    }

    /// Works that carried no resolvable author
    pub fn works_without_authors(&self) -> usize {
        self.works_without_authors
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl Accumulate for CoauthorAccumulator {
    type Item = WorkRecord;

    fn push(&mut self, work: &WorkRecord) {
        self.works_processed += 1;

        // First occurrence of each author on this work, in authorship order
        let mut seen = FxHashSet::default();
        let authors: Vec<&Authorship> = work
            .authorships
            .iter()
            .filter(|a| seen.insert(a.author_id.as_str()))
            .collect();

        if authors.is_empty() {
            self.works_without_authors += 1;
            return;
        }

        for authorship in &authors {
            let node = self
                .authors
                .entry(authorship.author_id.clone())
                .and_modify(|node| node.fill_missing(authorship))
                .or_insert_with(|| AuthorNode::from_authorship(authorship));
            node.publications += 1;
        }

        for (i, first) in authors.iter().enumerate() {
            for second in &authors[i + 1..] {
                let (a, b) = canonical_pair(&first.author_id, &second.author_id);
                *self
                    .pairs
                    .entry((a.to_string(), b.to_string()))
                    .or_insert(0) += 1;
            }
        }
    }
}
