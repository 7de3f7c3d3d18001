//! Weighted undirected co-authorship graph and its derived views

use rustc_hash::{FxHashMap, FxHashSet};

use crate::accumulator::{AuthorNode, CoauthorAccumulator};

/// Undirected weighted edge, endpoints in canonical order (`source < target`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoauthorEdge {
    pub source: String,
    pub target: String,
    /// Works shared by both endpoints, always >= 1
    pub weight: u32,
}

impl CoauthorEdge {
    /// Edge with endpoints put in canonical order
    pub fn new(a: impl Into<String>, b: impl Into<String>, weight: u32) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                source: a,
                target: b,
                weight,
            }
        } else {
            Self {
                source: b,
                target: a,
                weight,
            }
        }
    }
}

/// Invariant violation when assembling a graph from parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Edge endpoint that is not a node
    MissingEndpoint { edge: (String, String), missing: String },
    DuplicateNode(String),
    DuplicateEdge(String, String),
    SelfLoop(String),
    ZeroWeight(String, String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEndpoint { edge, missing } => write!(
                f,
                "edge {}-{} references unknown node {missing}",
                edge.0, edge.1
            ),
            Self::DuplicateNode(id) => write!(f, "duplicate node {id}"),
            Self::DuplicateEdge(a, b) => write!(f, "duplicate edge {a}-{b}"),
            Self::SelfLoop(id) => write!(f, "self loop on {id}"),
            Self::ZeroWeight(a, b) => write!(f, "edge {a}-{b} has weight 0"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Node attribute used to rank nodes for top-N views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMetric {
    Publications,
    Degree,
}

/// Immutable weighted undirected graph.
///
/// Nodes are sorted by id and edges by `(source, target)`. Every edge
/// endpoint is a node. Views (`filter_by_min_weight`, `top_n_by_metric`)
/// build new graphs and never touch `self`.
#[derive(Debug, Clone, Default)]
pub struct CoauthorGraph {
    nodes: Vec<AuthorNode>,
    index: FxHashMap<String, usize>,
    edges: Vec<CoauthorEdge>,
    /// `(neighbor index, weight)` per node, in node index order
    adjacency: Vec<Vec<(usize, u32)>>,
}

impl CoauthorGraph {
    /// Materialize accumulated totals: one node per author, one edge per pair.
    pub fn build(acc: &CoauthorAccumulator) -> Self {
        let nodes: Vec<AuthorNode> = acc.authors().cloned().collect();
        let edges: Vec<CoauthorEdge> = acc
            .pairs()
            .filter(|(_, _, weight)| *weight >= 1)
            .map(|(a, b, weight)| CoauthorEdge::new(a, b, weight))
            .collect();
        log::debug!("building graph: {} nodes, {} edges", nodes.len(), edges.len());
        Self::assemble(nodes, edges)
    }

    /// Assemble a graph from explicit parts, checking every invariant.
    pub fn from_parts(nodes: Vec<AuthorNode>, edges: Vec<CoauthorEdge>) -> Result<Self, GraphError> {
        let mut ids = FxHashSet::default();
        for node in &nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        let mut pairs = FxHashSet::default();
        let mut canonical = Vec::with_capacity(edges.len());
        for edge in edges {
            let edge = CoauthorEdge::new(edge.source, edge.target, edge.weight);
            if edge.source == edge.target {
                return Err(GraphError::SelfLoop(edge.source));
            }
            if edge.weight == 0 {
                return Err(GraphError::ZeroWeight(edge.source, edge.target));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(GraphError::MissingEndpoint {
                        edge: (edge.source.clone(), edge.target.clone()),
                        missing: endpoint.clone(),
                    });
                }
            }
            if !pairs.insert((edge.source.clone(), edge.target.clone())) {
                return Err(GraphError::DuplicateEdge(edge.source, edge.target));
            }
            canonical.push(edge);
        }

        Ok(Self::assemble(nodes, canonical))
    }

    /// Sort and index parts already known to satisfy the invariants.
    fn assemble(mut nodes: Vec<AuthorNode>, mut edges: Vec<CoauthorEdge>) -> Self {
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        let index: FxHashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            let (s, t) = (index[&edge.source], index[&edge.target]);
            adjacency[s].push((t, edge.weight));
            adjacency[t].push((s, edge.weight));
        }

        Self {
            nodes,
            index,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes sorted by id
    pub fn nodes(&self) -> &[AuthorNode] {
        &self.nodes
    }

    /// Edges sorted by `(source, target)`
    pub fn edges(&self) -> &[CoauthorEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&AuthorNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.index.get(id).map(|&i| self.adjacency[i].len())
    }

    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.index
            .get(id)
            .map(|&i| self.adjacency[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&(j, _)| self.nodes[j].id.as_str())
    }

    /// Weight of the edge between `a` and `b`, in either order
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let (&i, &j) = (self.index.get(a)?, self.index.get(b)?);
        // scan the shorter adjacency list
        let (from, to) = if self.adjacency[i].len() <= self.adjacency[j].len() {
            (i, j)
        } else {
            (j, i)
        };
        self.adjacency[from]
            .iter()
            .find(|&&(n, _)| n == to)
            .map(|&(_, w)| w)
    }

    /// Degree per node, in `nodes()` order
    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(Vec::len).collect()
    }

    pub(crate) fn adjacency(&self) -> &[Vec<(usize, u32)>] {
        &self.adjacency
    }

    /// Edges with `weight >= threshold`, and only the nodes they touch.
    pub fn filter_by_min_weight(&self, threshold: u32) -> CoauthorGraph {
        let edges: Vec<CoauthorEdge> = self
            .edges
            .iter()
            .filter(|e| e.weight >= threshold)
            .cloned()
            .collect();
        let touched: FxHashSet<&str> = edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|n| touched.contains(n.id.as_str()))
            .cloned()
            .collect();
        Self::assemble(nodes, edges)
    }

    /// The `n` highest-ranked nodes by `metric` (ties by id ascending), the
    /// subgraph they induce, minus edges lighter than `min_weight`.
    ///
    /// Selected nodes are kept even when all their edges are removed.
    pub fn top_n_by_metric(&self, n: usize, metric: NodeMetric, min_weight: u32) -> CoauthorGraph {
        let mut ranked: Vec<usize> = (0..self.nodes.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.metric(b, metric)
                .cmp(&self.metric(a, metric))
                .then_with(|| self.nodes[a].id.cmp(&self.nodes[b].id))
        });
        ranked.truncate(n);

        let selected: FxHashSet<&str> = ranked.iter().map(|&i| self.nodes[i].id.as_str()).collect();
        let nodes = ranked.iter().map(|&i| self.nodes[i].clone()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| {
                e.weight >= min_weight
                    && selected.contains(e.source.as_str())
                    && selected.contains(e.target.as_str())
            })
            .cloned()
            .collect();
        Self::assemble(nodes, edges)
    }

    fn metric(&self, i: usize, metric: NodeMetric) -> usize {
        match metric {
            NodeMetric::Publications => self.nodes[i].publications as usize,
            NodeMetric::Degree => self.adjacency[i].len(),
        }
    }

    /// Edge lookup with endpoints in any order
    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.edge_weight(a, b).is_some()
    }
}
