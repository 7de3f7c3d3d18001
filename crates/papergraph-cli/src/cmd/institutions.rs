//! Institutions subcommand - the OpenAlex institution listing

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use papergraph_core::{SharedProgress, fmt_num};
use papergraph_network::export::{self, files};
use papergraph_openalex::{InstitutionsQuery, OpenAlexClient, PAGE_PAGING_LIMIT};

use super::{drain, finish, prepare_output_dir, print_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct InstitutionsArgs {
    /// Results per page (max 200; default from config)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Stop after this many pages (default: all)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Extra OpenAlex filter expression, e.g. country_code:GB
    #[arg(long)]
    pub filter: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(
    args: InstitutionsArgs,
    config: &Config,
    client: &OpenAlexClient,
    progress: &SharedProgress,
) -> Result<()> {
    let output_dir = prepare_output_dir(args.output, config.timestamped_dir("institutions"))?;

    let query = InstitutionsQuery {
        per_page: args.per_page.unwrap_or(config.openalex.per_page),
        max_pages: args.max_pages,
        filter: args.filter,
    };
    log::info!("Fetching institutions (per page: {})", query.per_page);

    // page paging never goes past PAGE_PAGING_LIMIT results
    let cap = query
        .max_pages
        .map(|pages| (pages as usize * query.per_page as usize).min(PAGE_PAGING_LIMIT as usize));
    let mut records = Vec::new();
    let outcome = drain(
        client.institutions(&query),
        "institutions",
        cap,
        progress,
        |batch| records.extend(batch),
    );

    let mut rows = outcome.summary_rows("institutions");
    rows.push(("Saved", fmt_num(records.len())));
    print_summary("Institutions", &rows);

    export::write_institutions_full(&output_dir.join(files::INSTITUTIONS_FULL), &records)?;
    export::write_institutions_simple(&output_dir.join(files::INSTITUTIONS_SIMPLE), &records)?;
    export::write_top_institutions(&output_dir.join(files::TOP_INSTITUTIONS), &records)?;
    export::write_institution_summary(&output_dir.join(files::INSTITUTIONS_SUMMARY), &records)?;

    finish(outcome, &output_dir)
}
