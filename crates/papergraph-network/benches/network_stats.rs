use papergraph_network::{
    Accumulate, BetweennessMode, CoauthorAccumulator, CoauthorGraph, StatsOptions,
    betweenness_centrality, compute_stats,
};
use papergraph_openalex::{Authorship, WorkRecord};

/// Deterministic co-authorship graph: `works` papers of 2-6 authors drawn from a pool.
fn synthetic_graph(works: usize, pool: usize) -> CoauthorGraph {
    let records: Vec<WorkRecord> = (0..works)
        .map(|w| {
            let team = 2 + w % 5;
            WorkRecord {
                id: format!("W{w}"),
                title: None,
                publication_year: Some(2020),
                authorships: (0..team)
                    .map(|k| {
                        let a = (w * 7 + k * 13) % pool;
                        Authorship {
                            author_id: format!("A{a}"),
                            display_name: format!("Author {a}"),
                            orcid: None,
                            institutions: Vec::new(),
                        }
                    })
                    .collect(),
                unattributed_institutions: Vec::new(),
            }
        })
        .collect();
    let mut acc = CoauthorAccumulator::new();
    acc.accumulate(&records);
    CoauthorGraph::build(&acc)
}

#[divan::bench(args = [200, 1000])]
fn betweenness_exact(bencher: divan::Bencher, nodes: usize) {
    let graph = synthetic_graph(nodes * 2, nodes);
    bencher.bench(|| betweenness_centrality(&graph, BetweennessMode::Exact));
}

#[divan::bench(args = [1000, 5000])]
fn betweenness_sampled(bencher: divan::Bencher, nodes: usize) {
    let graph = synthetic_graph(nodes * 2, nodes);
    let mode = BetweennessMode::Sampled {
        fraction: 0.1,
        seed: 42,
    };
    bencher.bench(|| betweenness_centrality(&graph, mode));
}

#[divan::bench]
fn stats_default(bencher: divan::Bencher) {
    let graph = synthetic_graph(4000, 2000);
    bencher.bench(|| compute_stats(&graph, &StatsOptions::default()).unwrap());
}

fn main() {
    divan::main();
}
