//! CSV tables

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use papergraph_openalex::InstitutionRecord;
use serde::Serialize;

use super::{Centralities, create_file};
use crate::collaboration::CollaborationRecord;
use crate::graph::CoauthorGraph;

/// CSV writer that always emits `header`, even with no rows
fn csv_writer<W: Write>(inner: W, header: &[&str]) -> anyhow::Result<csv::Writer<W>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(inner);
    wtr.write_record(header)
        .context("Failed to write CSV header")?;
    Ok(wtr)
}

fn finish<W: Write>(mut wtr: csv::Writer<W>, path: &Path, rows: usize) -> anyhow::Result<()> {
    wtr.flush().context("Failed to flush CSV")?;
    log::info!("Saved {} ({rows} rows)", path.display());
    Ok(())
}

/// `author_nodes.csv`; centrality columns only when `centralities` is given
pub fn write_author_nodes(
    path: &Path,
    graph: &CoauthorGraph,
    centralities: Option<&Centralities>,
) -> anyhow::Result<()> {
    let mut header = vec!["author_id", "name", "institution", "publications", "orcid", "degree"];
    if centralities.is_some() {
        header.extend(["degree_centrality", "betweenness_centrality"]);
    }
    let mut wtr = csv_writer(create_file(path)?, &header)?;

    let degrees = graph.degrees();
    for (i, node) in graph.nodes().iter().enumerate() {
        let mut row = vec![
            node.id.clone(),
            node.name.clone(),
            node.institution.clone().unwrap_or_default(),
            node.publications.to_string(),
            node.orcid.clone().unwrap_or_default(),
            degrees[i].to_string(),
        ];
        if let Some(c) = centralities {
            row.push(c.degree[i].to_string());
            row.push(c.betweenness[i].to_string());
        }
        wtr.write_record(&row)
            .context("Failed to write CSV record")?;
    }
    finish(wtr, path, graph.node_count())
}

/// `coauthorship_edges.csv`
pub fn write_coauthor_edges(path: &Path, graph: &CoauthorGraph) -> anyhow::Result<()> {
    let mut wtr = csv_writer(
        create_file(path)?,
        &[
            "author1_id",
            "author1_name",
            "author2_id",
            "author2_name",
            "collaboration_strength",
            "author1_institution",
            "author2_institution",
        ],
    )?;

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.node(&edge.source), graph.node(&edge.target)) else {
            continue;
        };
        wtr.write_record([
            a.id.as_str(),
            a.name.as_str(),
            b.id.as_str(),
            b.name.as_str(),
            edge.weight.to_string().as_str(),
            a.institution.as_deref().unwrap_or(""),
            b.institution.as_deref().unwrap_or(""),
        ])
        .context("Failed to write CSV record")?;
    }
    finish(wtr, path, graph.edge_count())
}

#[derive(Serialize)]
struct CollaborationRow<'a> {
    year: Option<i32>,
    collaborating_institution: &'a str,
    country: &'a str,
    work_id: &'a str,
}

/// `collaboration_data.csv`
pub fn write_collaborations(path: &Path, records: &[CollaborationRecord]) -> anyhow::Result<()> {
    let mut wtr = csv_writer(
        create_file(path)?,
        &["year", "collaborating_institution", "country", "work_id"],
    )?;
    for r in records {
        wtr.serialize(CollaborationRow {
            year: r.year,
            collaborating_institution: r
                .institution_name
                .as_deref()
                .unwrap_or(r.institution_id.as_str()),
            country: r.country.as_deref().unwrap_or(""),
            work_id: &r.work_id,
        })
        .context("Failed to write CSV record")?;
    }
    finish(wtr, path, records.len())
}

#[derive(Serialize)]
struct InstitutionFullRow<'a> {
    openalex_id: &'a str,
    display_name: &'a str,
    country_code: &'a str,
    #[serde(rename = "type")]
    institution_type: &'a str,
    works_count: u64,
    cited_by_count: u64,
    ror_id: &'a str,
    homepage_url: &'a str,
    image_url: &'a str,
}

#[derive(Serialize)]
struct InstitutionSimpleRow<'a> {
    openalex_id: &'a str,
    display_name: &'a str,
    country_code: &'a str,
    #[serde(rename = "type")]
    institution_type: &'a str,
    works_count: u64,
}

/// `institutions_full.csv`: every listing field
pub fn write_institutions_full(path: &Path, records: &[InstitutionRecord]) -> anyhow::Result<()> {
    let mut wtr = csv_writer(
        create_file(path)?,
        &[
            "openalex_id",
            "display_name",
            "country_code",
            "type",
            "works_count",
            "cited_by_count",
            "ror_id",
            "homepage_url",
            "image_url",
        ],
    )?;
    for r in records {
        wtr.serialize(InstitutionFullRow {
            openalex_id: &r.id,
            display_name: &r.display_name,
            country_code: r.country_code.as_deref().unwrap_or(""),
            institution_type: r.institution_type.as_deref().unwrap_or(""),
            works_count: r.works_count,
            cited_by_count: r.cited_by_count,
            ror_id: r.ror.as_deref().unwrap_or(""),
            homepage_url: r.homepage_url.as_deref().unwrap_or(""),
            image_url: r.image_url.as_deref().unwrap_or(""),
        })
        .context("Failed to write CSV record")?;
    }
    finish(wtr, path, records.len())
}

/// `institutions_simple.csv`: id, name, country, type and works count
pub fn write_institutions_simple(path: &Path, records: &[InstitutionRecord]) -> anyhow::Result<()> {
    let mut wtr = csv_writer(
        create_file(path)?,
        &["openalex_id", "display_name", "country_code", "type", "works_count"],
    )?;
    for r in records {
        wtr.serialize(InstitutionSimpleRow {
            openalex_id: &r.id,
            display_name: &r.display_name,
            country_code: r.country_code.as_deref().unwrap_or(""),
            institution_type: r.institution_type.as_deref().unwrap_or(""),
            works_count: r.works_count,
        })
        .context("Failed to write CSV record")?;
    }
    finish(wtr, path, records.len())
}
