//! Coauthors subcommand - co-authorship network of one institution

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use papergraph_core::{SharedProgress, fmt_num};
use papergraph_network::export::{self, files};
use papergraph_network::{
    Accumulate, BetweennessMode, Centralities, Centrality, CoauthorAccumulator, CoauthorGraph,
    NetworkStats, NodeMetric, StatsOptions, compute_stats, compute_stats_ranked,
};
use papergraph_openalex::{OpenAlexClient, WorksQuery, short_id};

use super::{drain, finish, institution_name, prepare_output_dir, print_summary, print_table};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CoauthorsArgs {
    /// OpenAlex institution id (e.g. I97018004) or URL
    #[arg(short, long)]
    pub institution: String,

    /// First publication year
    #[arg(long)]
    pub from: i32,

    /// Last publication year (inclusive)
    #[arg(long)]
    pub to: i32,

    /// Stop after this many works
    #[arg(long, default_value_t = 1000)]
    pub max_papers: usize,

    /// Drop edges with fewer shared works from the graph views (data files keep every edge)
    #[arg(long, default_value_t = 1)]
    pub min_weight: u32,

    /// Sizes of the top-N subgraph files (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "10,20,50")]
    pub top: Vec<usize>,

    /// Add degree and betweenness centrality columns to the node table
    #[arg(long)]
    pub centrality: bool,

    /// Always compute exact betweenness, even on large graphs
    #[arg(long)]
    pub exact_betweenness: bool,

    /// Rank top authors by betweenness instead of degree
    #[arg(long)]
    pub rank_by_betweenness: bool,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CoauthorsArgs {
    fn stats_options(&self) -> StatsOptions {
        StatsOptions {
            ranking: if self.rank_by_betweenness {
                Centrality::Betweenness
            } else {
                Centrality::Degree
            },
            betweenness: if self.exact_betweenness {
                BetweennessMode::Exact
            } else {
                BetweennessMode::Auto
            },
        }
    }
}

/// `coauthors_<id>_<Name>`: directory kind for one institution
pub fn dir_kind(prefix: &str, id: &str, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if slug.is_empty() || name == id {
        format!("{prefix}_{id}")
    } else {
        format!("{prefix}_{id}_{slug}")
    }
}

pub fn run(
    args: CoauthorsArgs,
    config: &Config,
    client: &OpenAlexClient,
    progress: &SharedProgress,
) -> Result<()> {
    if args.from > args.to {
        anyhow::bail!("--from {} is after --to {}", args.from, args.to);
    }
    let institution_id = short_id(&args.institution).to_string();
    let name = institution_name(client, &institution_id);
    let output_dir = prepare_output_dir(
        args.output.clone(),
        config.timestamped_dir(&dir_kind("coauthors", &institution_id, &name)),
    )?;

    log::info!(
        "Building co-authorship network for {name} ({institution_id}), {}-{}",
        args.from,
        args.to
    );

    let mut query = WorksQuery::new(institution_id.as_str(), args.from, args.to);
    query.per_page = config.openalex.per_page;
    query.max_items = Some(args.max_papers);

    let mut acc = CoauthorAccumulator::new();
    let outcome = drain(
        client.works(&query),
        "works",
        query.max_items,
        progress,
        |batch| acc.accumulate(&batch),
    );

    let graph = CoauthorGraph::build(&acc);

    let mut rows = outcome.summary_rows("works");
    rows.push(("Works without authors", acc.works_without_authors().to_string()));
    rows.push(("Authors", fmt_num(graph.node_count())));
    rows.push(("Co-authorship links", fmt_num(graph.edge_count())));

    if graph.is_empty() {
        log::warn!("No co-authorships found; nothing to export");
        print_summary("Co-authorship network", &rows);
        return finish(outcome, &output_dir);
    }

    let options = args.stats_options();
    let centralities = args
        .centrality
        .then(|| Centralities::compute(&graph, options.betweenness));
    let stats = match &centralities {
        Some(c) => compute_stats_ranked(&graph, c.scores(options.ranking))?,
        None => compute_stats(&graph, &options)?,
    };
    rows.push(("Density", format!("{:.3}", stats.density)));
    rows.push(("Average degree", format!("{:.2}", stats.avg_degree)));
    rows.push(("Average clustering", format!("{:.3}", stats.avg_clustering)));
    print_summary("Co-authorship network", &rows);

    let ranking = match options.ranking {
        Centrality::Degree => "Degree centrality",
        Centrality::Betweenness => "Betweenness",
    };
    print_table(
        &["Author", ranking, "Publications"],
        stats.top_authors.iter().map(|a| {
            vec![
                a.name.clone(),
                format!("{:.4}", a.centrality),
                a.publications.to_string(),
            ]
        }),
    );

    let description = format!(
        "Co-authorship network of {name} ({institution_id}), {}-{}",
        args.from, args.to
    );
    let views = Views {
        top: &args.top,
        min_weight: args.min_weight,
    };
    write_network_files(
        &output_dir,
        &graph,
        &stats,
        centralities.as_ref(),
        &description,
        &views,
    )?;

    finish(outcome, &output_dir)
}

/// GEXF views written next to the full network
struct Views<'a> {
    top: &'a [usize],
    min_weight: u32,
}

/// Data files and the full GEXF cover every edge; `min_weight` only thins the views.
fn write_network_files(
    dir: &Path,
    graph: &CoauthorGraph,
    stats: &NetworkStats,
    centralities: Option<&Centralities>,
    description: &str,
    views: &Views,
) -> Result<()> {
    export::write_author_nodes(&dir.join(files::AUTHOR_NODES), graph, centralities)?;
    export::write_coauthor_edges(&dir.join(files::COAUTHOR_EDGES), graph)?;
    let generated_on = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    export::write_network_metadata(&dir.join(files::NETWORK_METADATA), graph, stats, &generated_on)?;
    export::write_gexf(&dir.join(files::COAUTHOR_GEXF), graph, description)?;

    if views.min_weight > 1 {
        let filtered = graph.filter_by_min_weight(views.min_weight);
        export::write_gexf(
            &dir.join(files::min_weight_gexf(views.min_weight)),
            &filtered,
            &format!("Links with at least {} shared works: {description}", views.min_weight),
        )?;
    }
    for &n in views.top {
        let view = graph.top_n_by_metric(n, NodeMetric::Publications, views.min_weight);
        export::write_gexf(
            &dir.join(files::top_n_gexf(n)),
            &view,
            &format!("Top {n} authors by publications: {description}"),
        )?;
    }
    Ok(())
}
