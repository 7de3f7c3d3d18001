//! Collaborations subcommand - which institutions one institution publishes with

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use papergraph_core::{SharedProgress, fmt_num};
use papergraph_network::export::{self, files};
use papergraph_network::{Accumulate, CollaborationAccumulator};
use papergraph_openalex::{OpenAlexClient, WorksQuery, short_id};

use super::coauthors::dir_kind;
use super::{drain, finish, institution_name, prepare_output_dir, print_summary, print_table};
use crate::config::Config;

/// Rows shown in the per-country table
const TOP_COUNTRIES: usize = 10;

#[derive(Args, Debug)]
pub struct CollaborationsArgs {
    /// OpenAlex institution id (e.g. I97018004) or URL
    #[arg(short, long)]
    pub institution: String,

    /// First publication year
    #[arg(long)]
    pub from: i32,

    /// Last publication year (inclusive)
    #[arg(long)]
    pub to: i32,

    /// Stop after this many works (default: all)
    #[arg(long)]
    pub max_papers: Option<usize>,

    /// Collaborating institutions in the star network and summary table
    #[arg(long, default_value_t = 50)]
    pub top: usize,

    /// Country codes left out of the country views (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_country: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(
    args: CollaborationsArgs,
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
        config.timestamped_dir(&dir_kind("collaborations", &institution_id, &name)),
    )?;

    log::info!(
        "Collecting collaborations of {name} ({institution_id}), {}-{}",
        args.from,
        args.to
    );

    let mut query = WorksQuery::new(institution_id.as_str(), args.from, args.to);
    query.per_page = config.openalex.per_page;
    query.max_items = args.max_papers;

    let mut acc = CollaborationAccumulator::new(institution_id.as_str()).with_source_name(name.as_str());
    let outcome = drain(
        client.works(&query),
        "works",
        query.max_items,
        progress,
        |batch| acc.accumulate(&batch),
    );

    let institutions = acc.by_institution();
    let countries = acc.by_country(&args.exclude_country);

    let mut rows = outcome.summary_rows("works");
    rows.push(("Collaborations", fmt_num(acc.records().len())));
    rows.push(("Institutions", fmt_num(institutions.len())));
    rows.push(("Countries", fmt_num(countries.len())));
    print_summary("Collaborations", &rows);

    if !institutions.is_empty() {
        print_table(
            &["Institution", "Country", "Collaborations"],
            institutions.iter().take(args.top).map(|i| {
                vec![
                    i.name.clone(),
                    i.country.clone().unwrap_or_default(),
                    fmt_num(i.count),
                ]
            }),
        );
        print_table(
            &["Year", "Collaborations"],
            acc.by_year()
                .into_iter()
                .map(|(year, count)| vec![year.to_string(), fmt_num(count)]),
        );
        print_table(
            &["Country", "Collaborations"],
            countries
                .iter()
                .take(TOP_COUNTRIES)
                .map(|(code, count)| vec![code.clone(), fmt_num(*count)]),
        );
        // entries are most frequent first within each year
        let mut leading = acc.by_year_country(&args.exclude_country);
        leading.dedup_by_key(|entry| entry.year);
        print_table(
            &["Year", "Leading country", "Collaborations"],
            leading
                .into_iter()
                .map(|e| vec![e.year.to_string(), e.country, fmt_num(e.count)]),
        );
    }

    export::write_collaborations(&output_dir.join(files::COLLABORATION_DATA), acc.records())?;
    let star = acc.star_graph(args.top);
    export::write_gexf(
        &output_dir.join(files::COLLABORATION_GEXF),
        &star,
        &format!(
            "Top {} collaborators of {name} ({institution_id}), {}-{}",
            args.top, args.from, args.to
        ),
    )?;

    finish(outcome, &output_dir)
}
