//! Flat-file outputs: CSV tables, GEXF graphs and plain-text reports
//!
//! Writers return `anyhow::Result` with the target path in the error context.

pub mod gexf;
pub mod report;
pub mod tables;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;

use crate::graph::CoauthorGraph;
use crate::stats::{BetweennessMode, Centrality, betweenness_centrality, degree_centrality};

/// File names inside an output directory
pub mod files {
    pub const AUTHOR_NODES: &str = "author_nodes.csv";
    pub const COAUTHOR_EDGES: &str = "coauthorship_edges.csv";
    pub const NETWORK_METADATA: &str = "network_metadata.txt";
    pub const COAUTHOR_GEXF: &str = "coauthorship_network.gexf";
    pub const COLLABORATION_DATA: &str = "collaboration_data.csv";
    pub const COLLABORATION_GEXF: &str = "collaboration_network.gexf";
    pub const INSTITUTIONS_FULL: &str = "institutions_full.csv";
    pub const INSTITUTIONS_SIMPLE: &str = "institutions_simple.csv";
    pub const TOP_INSTITUTIONS: &str = "top_institutions.md";
    pub const INSTITUTIONS_SUMMARY: &str = "summary.txt";
    pub const LOG: &str = "graph_generation.log";

    /// `coauthorship_network_top_<n>.gexf`
    pub fn top_n_gexf(n: usize) -> String {
        format!("coauthorship_network_top_{n}.gexf")
    }

    /// `coauthorship_network_min_weight_<w>.gexf`
    pub fn min_weight_gexf(weight: u32) -> String {
        format!("coauthorship_network_min_weight_{weight}.gexf")
    }
}

/// Per-node centrality columns, aligned with `CoauthorGraph::nodes()`
#[derive(Debug, Clone, PartialEq)]
pub struct Centralities {
    pub degree: Vec<f64>,
    pub betweenness: Vec<f64>,
}

impl Centralities {
    pub fn compute(graph: &CoauthorGraph, mode: BetweennessMode) -> Self {
        Self {
            degree: degree_centrality(graph),
            betweenness: betweenness_centrality(graph, mode),
        }
    }

    /// Column used to rank authors by `ranking`
    pub fn scores(&self, ranking: Centrality) -> &[f64] {
        match ranking {
            Centrality::Degree => &self.degree,
            Centrality::Betweenness => &self.betweenness,
        }
    }
}

pub(crate) fn create_file(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

// Re-exports
pub use gexf::{write_gexf, write_gexf_to};
pub use report::{
    render_institution_summary, render_network_metadata, render_top_institutions,
    write_institution_summary, write_network_metadata, write_top_institutions,
};
pub use tables::{
    write_author_nodes, write_coauthor_edges, write_collaborations, write_institutions_full,
    write_institutions_simple,
};
