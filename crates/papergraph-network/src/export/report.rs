//! Plain-text and Markdown reports

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use papergraph_core::fmt_num;
use papergraph_openalex::InstitutionRecord;
use rustc_hash::FxHashMap;

use crate::graph::CoauthorGraph;
use crate::stats::{NetworkStats, top_by_publications, unique_institutions};

/// Rows in `top_institutions.md`
pub const TOP_INSTITUTIONS: usize = 100;

fn write_text(path: &Path, text: &str) -> anyhow::Result<()> {
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// Body of `network_metadata.txt`
pub fn render_network_metadata(graph: &CoauthorGraph, stats: &NetworkStats, generated_on: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Co-authorship Network Metadata");
    let _ = writeln!(out, "============================\n");
    let _ = writeln!(out, "Generated on: {generated_on}");
    let _ = writeln!(out, "Number of authors: {}", stats.node_count);
    let _ = writeln!(out, "Number of co-authorship links: {}", stats.edge_count);
    let _ = writeln!(out, "Network density: {:.3}", stats.density);
    let _ = writeln!(out, "Average degree: {:.2}\n", stats.avg_degree);

    let _ = writeln!(out, "Top 10 Authors by Publications:");
    for author in top_by_publications(graph, 10) {
        let _ = writeln!(
            out,
            "- {}: {} publications, {} collaborators",
            author.name, author.publications, author.degree
        );
    }

    let _ = writeln!(
        out,
        "\nNumber of unique institutions: {}",
        unique_institutions(graph)
    );
    out
}

pub fn write_network_metadata(
    path: &Path,
    graph: &CoauthorGraph,
    stats: &NetworkStats,
    generated_on: &str,
) -> anyhow::Result<()> {
    write_text(path, &render_network_metadata(graph, stats, generated_on))
}

/// Institutions by works count descending, ties by id
fn by_works_count(records: &[InstitutionRecord]) -> Vec<&InstitutionRecord> {
    let mut sorted: Vec<&InstitutionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.works_count.cmp(&a.works_count).then_with(|| a.id.cmp(&b.id)));
    sorted
}

/// Body of `top_institutions.md`
pub fn render_top_institutions(records: &[InstitutionRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Top {TOP_INSTITUTIONS} Institutions by Works Count\n");
    let _ = writeln!(out, "| OpenAlex ID | Institution Name | Country | Works Count |");
    let _ = writeln!(out, "|-------------|------------------|---------|-------------|");
    for r in by_works_count(records).into_iter().take(TOP_INSTITUTIONS) {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            r.id,
            r.display_name.replace('|', "\\|"),
            r.country_code.as_deref().unwrap_or(""),
            fmt_num(r.works_count as usize)
        );
    }
    out
}

pub fn write_top_institutions(path: &Path, records: &[InstitutionRecord]) -> anyhow::Result<()> {
    write_text(path, &render_top_institutions(records))
}

/// Body of `summary.txt`
pub fn render_institution_summary(records: &[InstitutionRecord]) -> String {
    let mut country_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for code in records.iter().filter_map(|r| r.country_code.as_deref()) {
        *country_counts.entry(code).or_insert(0) += 1;
    }
    let mut countries: Vec<(&str, usize)> = country_counts.into_iter().collect();
    countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    // first-seen order
    let mut types: Vec<&str> = Vec::new();
    for t in records.iter().filter_map(|r| r.institution_type.as_deref()) {
        if !types.contains(&t) {
            types.push(t);
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "Institution Data Summary");
    let _ = writeln!(out, "======================\n");
    let _ = writeln!(out, "Total institutions: {}", fmt_num(records.len()));
    let _ = writeln!(out, "Countries represented: {}", fmt_num(countries.len()));
    let _ = writeln!(out, "Institution types: {}\n", types.join(", "));
    let _ = writeln!(out, "Top 10 countries by number of institutions:");
    for (code, count) in countries.iter().take(10) {
        let _ = writeln!(out, "- {code}: {}", fmt_num(*count));
    }
    out
}

pub fn write_institution_summary(path: &Path, records: &[InstitutionRecord]) -> anyhow::Result<()> {
    write_text(path, &render_institution_summary(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::{Accumulate, CoauthorAccumulator};
    use crate::accumulator::tests::three_works;
    use crate::stats::{StatsOptions, compute_stats};

    fn institution(id: &str, country: Option<&str>, kind: Option<&str>, works: u64) -> InstitutionRecord {
        InstitutionRecord {
            id: id.into(),
            display_name: format!("Inst {id}"),
            country_code: country.map(Into::into),
            institution_type: kind.map(Into::into),
            works_count: works,
            cited_by_count: 0,
            ror: None,
            homepage_url: None,
            image_url: None,
        }
    }

    #[test]
    fn network_metadata_scenario() {
        let mut acc = CoauthorAccumulator::new();
        acc.accumulate(&three_works());
        let graph = CoauthorGraph::build(&acc);
        let stats = compute_stats(&graph, &StatsOptions::default()).unwrap();

        let text = render_network_metadata(&graph, &stats, "2024-01-01 00:00:00");
        assert!(text.contains("Generated on: 2024-01-01 00:00:00"));
        assert!(text.contains("Number of authors: 3\n"));
        assert!(text.contains("Number of co-authorship links: 3\n"));
        assert!(text.contains("Network density: 1.000\n"));
        assert!(text.contains("Average degree: 2.00\n"));
        assert!(text.contains("- Author A: 3 publications, 2 collaborators\n"));
        // test authors carry no institution
        assert!(text.ends_with("Number of unique institutions: 0\n"));
    }

    #[test]
    fn top_institutions_sorted_and_formatted() {
        let records = vec![
            institution("I2", Some("GB"), None, 500),
            institution("I1", Some("US"), None, 1_234_567),
        ];
        let md = render_top_institutions(&records);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "# Top 100 Institutions by Works Count");
        assert_eq!(lines[4], "| I1 | Inst I1 | US | 1,234,567 |");
        assert_eq!(lines[5], "| I2 | Inst I2 | GB | 500 |");
    }

    #[test]
    fn top_institutions_capped() {
        let records: Vec<_> = (0..150)
            .map(|i| institution(&format!("I{i}"), None, None, i))
            .collect();
        let md = render_top_institutions(&records);
        assert_eq!(md.lines().filter(|l| l.starts_with("| I")).count(), 100);
    }

    #[test]
    fn institution_summary() {
        let records = vec![
            institution("I1", Some("US"), Some("education"), 1),
            institution("I2", Some("US"), Some("healthcare"), 1),
            institution("I3", Some("GB"), Some("education"), 1),
            institution("I4", None, None, 1),
        ];
        let text = render_institution_summary(&records);
        assert!(text.contains("Total institutions: 4\n"));
        assert!(text.contains("Countries represented: 2\n"));
        assert!(text.contains("Institution types: education, healthcare\n"));
        assert!(text.contains("- US: 2\n- GB: 1\n"));
    }
}
