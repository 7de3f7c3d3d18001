//! Institution collaboration analysis: who the analysed institution works with

use papergraph_openalex::WorkRecord;
use rustc_hash::FxHashMap;

use crate::accumulator::{Accumulate, AuthorNode};
use crate::graph::{CoauthorEdge, CoauthorGraph};

/// Name given to the analysed institution when its display name is unknown
pub const DEFAULT_SOURCE_NAME: &str = "Source Institution";

/// One authorship affiliated (first institution) elsewhere than the analysed institution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborationRecord {
    pub year: Option<i32>,
    pub institution_id: String,
    pub institution_name: Option<String>,
    pub country: Option<String>,
    pub work_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionCount {
    pub id: String,
    /// Display name, or the id when the API gave none
    pub name: String,
    pub country: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCountryCount {
    pub year: i32,
    pub country: String,
    pub count: usize,
}

/// Collects collaboration records for one source institution.
#[derive(Debug)]
pub struct CollaborationAccumulator {
    source_id: String,
    source_name: String,
    records: Vec<CollaborationRecord>,
    works_processed: usize,
}

impl CollaborationAccumulator {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            records: Vec::new(),
            works_processed: 0,
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn records(&self) -> &[CollaborationRecord] {
        &self.records
    }

    pub fn works_processed(&self) -> usize {
        self.works_processed
    }

    /// Collaborating institutions, most frequent first, ties by name then id
    pub fn by_institution(&self) -> Vec<InstitutionCount> {
        let mut counts: FxHashMap<&str, InstitutionCount> = FxHashMap::default();
        for r in &self.records {
            counts
                .entry(r.institution_id.as_str())
                .or_insert_with(|| InstitutionCount {
                    id: r.institution_id.clone(),
                    name: r
                        .institution_name
                        .clone()
                        .unwrap_or_else(|| r.institution_id.clone()),
                    country: r.country.clone(),
                    count: 0,
                })
                .count += 1;
        }
        let mut out: Vec<InstitutionCount> = counts.into_values().collect();
        out.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    /// Records per publication year, ascending; records without a year are left out
    pub fn by_year(&self) -> Vec<(i32, usize)> {
        let mut counts: FxHashMap<i32, usize> = FxHashMap::default();
        for year in self.records.iter().filter_map(|r| r.year) {
            *counts.entry(year).or_insert(0) += 1;
        }
        let mut out: Vec<(i32, usize)> = counts.into_iter().collect();
        out.sort_unstable();
        out
    }

    /// Records per country code, most frequent first, ties by code.
    ///
    /// Countries in `exclude` and records without a country are left out.
    pub fn by_country(&self, exclude: &[String]) -> Vec<(String, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for country in self.countries(exclude) {
            *counts.entry(country).or_insert(0) += 1;
        }
        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Records per (year, country): years ascending, most frequent country first
    pub fn by_year_country(&self, exclude: &[String]) -> Vec<YearCountryCount> {
        let mut counts: FxHashMap<(i32, &str), usize> = FxHashMap::default();
        for r in &self.records {
            let (Some(year), Some(country)) = (r.year, r.country.as_deref()) else {
                continue;
            };
            if exclude.iter().any(|e| e.eq_ignore_ascii_case(country)) {
                continue;
            }
            *counts.entry((year, country)).or_insert(0) += 1;
        }
        let mut out: Vec<YearCountryCount> = counts
            .into_iter()
            .map(|((year, country), count)| YearCountryCount {
                year,
                country: country.to_string(),
                count,
            })
            .collect();
        out.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.country.cmp(&b.country))
        });
        out
    }

    fn countries<'a>(&'a self, exclude: &'a [String]) -> impl Iterator<Item = &'a str> {
        self.records
            .iter()
            .filter_map(|r| r.country.as_deref())
            .filter(move |c| !exclude.iter().any(|e| e.eq_ignore_ascii_case(c)))
    }

    /// Source institution joined to its `top_n` most frequent collaborators.
    ///
    /// Edge weight and node `publications` are both the collaboration count.
    pub fn star_graph(&self, top_n: usize) -> CoauthorGraph {
        let top: Vec<InstitutionCount> = self.by_institution().into_iter().take(top_n).collect();

        let mut source = AuthorNode::new(self.source_id.clone(), self.source_name.clone());
        source.publications = top.iter().map(|i| i.count as u32).sum();

        let mut nodes = Vec::with_capacity(top.len() + 1);
        let mut edges = Vec::with_capacity(top.len());
        for inst in top {
            edges.push(CoauthorEdge::new(
                self.source_id.clone(),
                inst.id.clone(),
                inst.count as u32,
            ));
            nodes.push(AuthorNode {
                id: inst.id,
                name: inst.name,
                orcid: None,
                institution: inst.country,
                publications: inst.count as u32,
            });
        }
        nodes.push(source);

        match CoauthorGraph::from_parts(nodes, edges) {
            Ok(graph) => graph,
            Err(e) => {
                // records never carry the source id, so parts are always valid
                log::error!("invalid collaboration star: {e}");
                CoauthorGraph::default()
            }
        }
    }
}

impl Accumulate for CollaborationAccumulator {
    type Item = WorkRecord;

    fn push(&mut self, work: &WorkRecord) {
        self.works_processed += 1;
        // authors without an id still bring their institution along
        for inst in work.affiliations() {
            let Some(id) = inst.id.as_deref() else {
                continue;
            };
            if id == self.source_id {
                continue;
            }
            self.records.push(CollaborationRecord {
                year: work.publication_year,
                institution_id: id.to_string(),
                institution_name: inst.display_name.clone(),
                country: inst.country_code.clone(),
                work_id: work.id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papergraph_openalex::{Authorship, InstitutionRef};

    fn authorship(author: &str, inst: Option<(&str, &str, &str)>) -> Authorship {
        Authorship {
            author_id: author.to_string(),
            display_name: author.to_string(),
            orcid: None,
            institutions: inst
                .map(|(id, name, cc)| InstitutionRef {
                    id: Some(id.to_string()),
                    display_name: Some(name.to_string()),
                    country_code: Some(cc.to_string()),
                })
                .into_iter()
                .collect(),
        }
    }

    fn work(id: &str, year: i32, authorships: Vec<Authorship>) -> WorkRecord {
        WorkRecord {
            id: id.to_string(),
            title: None,
            publication_year: Some(year),
            authorships,
            unattributed_institutions: Vec::new(),
        }
    }

    const HOME: (&str, &str, &str) = ("I0", "Home U", "US");
    const OXF: (&str, &str, &str) = ("I1", "Oxford", "GB");
    const ETH: (&str, &str, &str) = ("I2", "ETH", "CH");
    const UCL: (&str, &str, &str) = ("I3", "UCL", "GB");

    fn sample() -> CollaborationAccumulator {
        let mut acc = CollaborationAccumulator::new("I0").with_source_name("Home U");
        acc.accumulate(&[
            work(
                "W1",
                2020,
                vec![
                    authorship("A", Some(HOME)),
                    authorship("B", Some(OXF)),
                    authorship("C", Some(ETH)),
                ],
            ),
            work(
                "W2",
                2021,
                vec![
                    authorship("A", Some(HOME)),
                    authorship("B", Some(OXF)),
                    authorship("D", None),
                ],
            ),
            work("W3", 2021, vec![authorship("E", Some(UCL)), authorship("F", Some(OXF))]),
        ]);
        acc
    }

    #[test]
    fn source_institution_never_recorded() {
        let acc = sample();
        assert_eq!(acc.records().len(), 5);
        assert!(acc.records().iter().all(|r| r.institution_id != "I0"));
        assert_eq!(acc.works_processed(), 3);
    }

    #[test]
    fn unresolved_author_institution_recorded() {
        let mut unresolved = work("W4", 2022, vec![authorship("A", Some(HOME))]);
        unresolved.unattributed_institutions.push(InstitutionRef {
            id: Some("I1".into()),
            display_name: Some("Oxford".into()),
            country_code: Some("GB".into()),
        });
        let mut acc = CollaborationAccumulator::new("I0");
        acc.push(&unresolved);
        assert_eq!(acc.records().len(), 1);
        let record = &acc.records()[0];
        assert_eq!(record.institution_id, "I1");
        assert_eq!(record.work_id, "W4");
        assert_eq!(record.year, Some(2022));
    }

    #[test]
    fn record_fields() {
        let acc = sample();
        let first = &acc.records()[0];
        assert_eq!(first.year, Some(2020));
        assert_eq!(first.institution_name.as_deref(), Some("Oxford"));
        assert_eq!(first.country.as_deref(), Some("GB"));
        assert_eq!(first.work_id, "W1");
    }

    #[test]
    fn institution_counts() {
        let counts = sample().by_institution();
        let view: Vec<(&str, usize)> = counts.iter().map(|c| (c.name.as_str(), c.count)).collect();
        // ETH and UCL tie at 1: by name
        assert_eq!(view, vec![("Oxford", 3), ("ETH", 1), ("UCL", 1)]);
    }

    #[test]
    fn year_counts() {
        assert_eq!(sample().by_year(), vec![(2020, 2), (2021, 3)]);
    }

    #[test]
    fn country_counts_with_exclusion() {
        let acc = sample();
        assert_eq!(
            acc.by_country(&[]),
            vec![("GB".to_string(), 4), ("CH".to_string(), 1)]
        );
        assert_eq!(
            acc.by_country(&["gb".to_string()]),
            vec![("CH".to_string(), 1)]
        );
    }

    #[test]
    fn year_country_counts() {
        let counts = sample().by_year_country(&[]);
        let view: Vec<(i32, &str, usize)> = counts
            .iter()
            .map(|c| (c.year, c.country.as_str(), c.count))
            .collect();
        assert_eq!(view, vec![(2020, "CH", 1), (2020, "GB", 1), (2021, "GB", 3)]);
    }

    #[test]
    fn star_weights_equal_counts() {
        let acc = sample();
        let star = acc.star_graph(2);
        assert_eq!(star.node_count(), 3);
        assert_eq!(star.edge_count(), 2);
        assert_eq!(star.edge_weight("I0", "I1"), Some(3));
        assert_eq!(star.edge_weight("I0", "I2"), Some(1));
        assert!(star.node("I3").is_none());
        let source = star.node("I0").unwrap();
        assert_eq!(source.name, "Home U");
        assert_eq!(source.publications, 4);
        assert_eq!(star.degree("I0"), Some(2));
    }

    #[test]
    fn empty_star_is_lone_source() {
        let acc = CollaborationAccumulator::new("I0");
        let star = acc.star_graph(20);
        assert_eq!(star.node_count(), 1);
        assert_eq!(star.nodes()[0].name, DEFAULT_SOURCE_NAME);
        assert_eq!(star.edge_count(), 0);
    }
}
