//! Descriptive statistics over a built graph
//!
//! Per-node results are `Vec<f64>` aligned with `CoauthorGraph::nodes()`.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;

use crate::graph::CoauthorGraph;

/// Graphs at or above this size get sampled betweenness in `Auto` mode
pub const EXACT_BETWEENNESS_LIMIT: usize = 500;

/// Share of nodes used as sources when sampling betweenness
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.1;

/// Fixed seed so sampled runs are reproducible
pub const DEFAULT_SEED: u64 = 42;

/// Number of authors in `NetworkStats::top_authors`
pub const TOP_AUTHORS: usize = 10;

/// Statistics requested on a graph that cannot support them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// No nodes: averages would divide by zero
    EmptyGraph,
}

impl std::fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "graph is empty; build it from at least one work first"),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Centrality used to rank top authors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Centrality {
    #[default]
    Degree,
    Betweenness,
}

/// How betweenness is computed
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BetweennessMode {
    /// Exact below `EXACT_BETWEENNESS_LIMIT` nodes, default sampling above
    #[default]
    Auto,
    Exact,
    /// `max(1, floor(fraction * n))` seeded random sources, scores scaled by n/k
    Sampled { fraction: f64, seed: u64 },
}

impl BetweennessMode {
    /// Sources to use for a graph of `n` nodes; `None` means all of them.
    fn sample_size(&self, n: usize) -> Option<(usize, u64)> {
        let (fraction, seed) = match *self {
            Self::Exact => return None,
            Self::Auto if n < EXACT_BETWEENNESS_LIMIT => return None,
            Self::Auto => (DEFAULT_SAMPLE_FRACTION, DEFAULT_SEED),
            Self::Sampled { fraction, seed } => (fraction, seed),
        };
        let k = ((fraction * n as f64).floor() as usize).clamp(1, n);
        Some((k, seed))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsOptions {
    pub ranking: Centrality,
    pub betweenness: BetweennessMode,
}

/// One entry of the centrality ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAuthor {
    pub id: String,
    pub name: String,
    pub centrality: f64,
    pub publications: u32,
}

/// One entry of the publication ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRank {
    pub id: String,
    pub name: String,
    pub publications: u32,
    /// Distinct collaborators
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub avg_degree: f64,
    pub avg_clustering: f64,
    /// Highest centrality first, ties by id, at most `TOP_AUTHORS`
    pub top_authors: Vec<RankedAuthor>,
}

/// Summary statistics and the top-author ranking.
pub fn compute_stats(
    graph: &CoauthorGraph,
    options: &StatsOptions,
) -> Result<NetworkStats, PreconditionError> {
    if graph.is_empty() {
        return Err(PreconditionError::EmptyGraph);
    }

    let scores = match options.ranking {
        Centrality::Degree => degree_centrality(graph),
        Centrality::Betweenness => betweenness_centrality(graph, options.betweenness),
    };
    compute_stats_ranked(graph, &scores)
}

/// Like [`compute_stats`], ranking by precomputed per-node `scores`
/// (aligned with `graph.nodes()`).
pub fn compute_stats_ranked(
    graph: &CoauthorGraph,
    scores: &[f64],
) -> Result<NetworkStats, PreconditionError> {
    if graph.is_empty() {
        return Err(PreconditionError::EmptyGraph);
    }
    debug_assert_eq!(scores.len(), graph.node_count());

    Ok(NetworkStats {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        density: density(graph),
        avg_degree: average_degree(graph)?,
        avg_clustering: average_clustering(graph)?,
        top_authors: rank_by(graph, &scores, TOP_AUTHORS),
    })
}

/// m / (n(n-1)/2), or 0 for fewer than two nodes
pub fn density(graph: &CoauthorGraph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    let possible = n as f64 * (n - 1) as f64 / 2.0;
    graph.edge_count() as f64 / possible
}

/// 2m / n
pub fn average_degree(graph: &CoauthorGraph) -> Result<f64, PreconditionError> {
    if graph.is_empty() {
        return Err(PreconditionError::EmptyGraph);
    }
    Ok(2.0 * graph.edge_count() as f64 / graph.node_count() as f64)
}

/// Unweighted local clustering: closed neighbor pairs / (d(d-1)/2), 0 for d < 2
pub fn clustering(graph: &CoauthorGraph) -> Vec<f64> {
    let adjacency = graph.adjacency();
    let mut mark = vec![usize::MAX; adjacency.len()];

    adjacency
        .iter()
        .enumerate()
        .map(|(v, neighbors)| {
            let d = neighbors.len();
            if d < 2 {
                return 0.0;
            }
            for &(u, _) in neighbors {
                mark[u] = v;
            }
            // each triangle through v is seen from both of its other corners
            let closed: usize = neighbors
                .iter()
                .map(|&(u, _)| adjacency[u].iter().filter(|&&(w, _)| mark[w] == v).count())
                .sum();
            let triangles = closed / 2;
            triangles as f64 / (d * (d - 1) / 2) as f64
        })
        .collect()
}

pub fn average_clustering(graph: &CoauthorGraph) -> Result<f64, PreconditionError> {
    if graph.is_empty() {
        return Err(PreconditionError::EmptyGraph);
    }
    let values = clustering(graph);
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// degree / (n - 1); a lone node scores 1.0
pub fn degree_centrality(graph: &CoauthorGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n == 1 {
        return vec![1.0];
    }
    let scale = 1.0 / (n.saturating_sub(1)) as f64;
    graph
        .adjacency()
        .iter()
        .map(|neighbors| neighbors.len() as f64 * scale)
        .collect()
}

/// Normalized betweenness over unweighted shortest paths (Brandes).
///
/// Scores are scaled by 1/((n-1)(n-2)) for n > 2. Sampled runs accumulate
/// from k random sources only and scale the result by n/k.
pub fn betweenness_centrality(graph: &CoauthorGraph, mode: BetweennessMode) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let adjacency = graph.adjacency();

    let sample = mode.sample_size(n);
    let sources: Vec<usize> = match sample {
        None => (0..n).collect(),
        Some((k, seed)) => {
            log::info!("sampling betweenness from {k} of {n} sources (seed {seed})");
            let mut rng = StdRng::seed_from_u64(seed);
            rand::seq::index::sample(&mut rng, n, k).into_vec()
        }
    };

    let mut scores = vec![0.0f64; n];
    let mut state = BrandesState::new(n);
    for &s in &sources {
        state.accumulate_from(s, adjacency, &mut scores);
    }

    if n > 2 {
        let mut scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        if let Some((k, _)) = sample {
            scale *= n as f64 / k as f64;
        }
        for score in &mut scores {
            *score *= scale;
        }
    }
    scores
}

/// Reusable buffers for single-source shortest-path accumulation
struct BrandesState {
    stack: Vec<usize>,
    predecessors: Vec<Vec<usize>>,
    sigma: Vec<f64>,
    distance: Vec<i64>,
    delta: Vec<f64>,
    queue: VecDeque<usize>,
}

impl BrandesState {
    fn new(n: usize) -> Self {
        Self {
            stack: Vec::with_capacity(n),
            predecessors: vec![Vec::new(); n],
            sigma: vec![0.0; n],
            distance: vec![-1; n],
            delta: vec![0.0; n],
            queue: VecDeque::with_capacity(n),
        }
    }

    fn accumulate_from(&mut self, s: usize, adjacency: &[Vec<(usize, u32)>], scores: &mut [f64]) {
        self.stack.clear();
        self.queue.clear();
        for p in &mut self.predecessors {
            p.clear();
        }
        self.sigma.fill(0.0);
        self.distance.fill(-1);
        self.delta.fill(0.0);

        self.sigma[s] = 1.0;
        self.distance[s] = 0;
        self.queue.push_back(s);

        while let Some(v) = self.queue.pop_front() {
            self.stack.push(v);
            for &(w, _) in &adjacency[v] {
                if self.distance[w] < 0 {
                    self.distance[w] = self.distance[v] + 1;
                    self.queue.push_back(w);
                }
                if self.distance[w] == self.distance[v] + 1 {
                    self.sigma[w] += self.sigma[v];
                    self.predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = self.stack.pop() {
            let coeff = (1.0 + self.delta[w]) / self.sigma[w];
            for &v in &self.predecessors[w] {
                self.delta[v] += self.sigma[v] * coeff;
            }
            if w != s {
                scores[w] += self.delta[w];
            }
        }
    }
}

/// Top `k` nodes by `scores` descending, ties by id ascending
pub fn rank_by(graph: &CoauthorGraph, scores: &[f64], k: usize) -> Vec<RankedAuthor> {
    let nodes = graph.nodes();
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .total_cmp(&scores[a])
            .then_with(|| nodes[a].id.cmp(&nodes[b].id))
    });
    order
        .into_iter()
        .take(k)
        .map(|i| RankedAuthor {
            id: nodes[i].id.clone(),
            name: nodes[i].name.clone(),
            centrality: scores[i],
            publications: nodes[i].publications,
        })
        .collect()
}

/// Top `k` authors by publication count, ties by id ascending
pub fn top_by_publications(graph: &CoauthorGraph, k: usize) -> Vec<PublicationRank> {
    let degrees = graph.degrees();
    let nodes = graph.nodes();
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[b]
            .publications
            .cmp(&nodes[a].publications)
            .then_with(|| nodes[a].id.cmp(&nodes[b].id))
    });
    order
        .into_iter()
        .take(k)
        .map(|i| PublicationRank {
            id: nodes[i].id.clone(),
            name: nodes[i].name.clone(),
            publications: nodes[i].publications,
            degree: degrees[i],
        })
        .collect()
}

/// Distinct institution names among nodes that have one
pub fn unique_institutions(graph: &CoauthorGraph) -> usize {
    graph
        .nodes()
        .iter()
        .filter_map(|n| n.institution.as_deref())
        .collect::<FxHashSet<_>>()
        .len()
}
