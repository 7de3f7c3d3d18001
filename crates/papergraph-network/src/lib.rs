//! Papergraph Network - co-authorship and collaboration networks
//!
//! Fetched work batches are folded into running totals by an
//! [`Accumulate`] implementation, then frozen into a [`CoauthorGraph`]
//! for statistics and export.
//!
//! # Example
//!
//! ```
//! use papergraph_network::{Accumulate, CoauthorAccumulator, CoauthorGraph};
//!
//! let mut acc = CoauthorAccumulator::new();
//! acc.accumulate(&[]);
//! let graph = CoauthorGraph::build(&acc);
//! assert!(graph.is_empty());
//! ```

pub mod accumulator;
pub mod collaboration;
pub mod export;
pub mod graph;
pub mod stats;

// Re-exports for convenience
pub use accumulator::{Accumulate, AuthorNode, CoauthorAccumulator, canonical_pair};
pub use collaboration::{
    CollaborationAccumulator, CollaborationRecord, DEFAULT_SOURCE_NAME, InstitutionCount,
    YearCountryCount,
};
pub use export::Centralities;
pub use graph::{CoauthorEdge, CoauthorGraph, GraphError, NodeMetric};
pub use stats::{
    BetweennessMode, Centrality, NetworkStats, PreconditionError, PublicationRank, RankedAuthor,
    StatsOptions, betweenness_centrality, compute_stats, compute_stats_ranked, degree_centrality,
    top_by_publications, unique_institutions,
};
