//! Example: Fetch works of one institution from the OpenAlex API
//!
//! Usage:
//!   cargo run -p papergraph-openalex --example fetch_openalex -- \
//!     --email me@example.org \
//!     --institution I97018004 \
//!     --from 2023 --to 2024 \
//!     --limit 50

use papergraph_openalex::{OpenAlexClient, WorksQuery};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let (email, query) = parse_args(&args)?;

    log::info!("Fetching works for {}", query.filter_expression());
    let client = OpenAlexClient::new(&email);
    let mut pages = client.works(&query);

    let mut authorships = 0usize;
    for batch in pages.by_ref() {
        for work in batch? {
            authorships += work.authorships.len();
        }
    }

    let stats = pages.decode_stats();
    log::info!("Fetch complete!");
    log::info!("  Works: {}", pages.items_yielded());
    log::info!("  Authorships: {authorships}");
    log::info!("  Pages: {}", pages.pages_fetched());
    if stats.skipped_records > 0 || stats.skipped_authorships > 0 {
        log::warn!(
            "  Skipped: {} works, {} authorships",
            stats.skipped_records,
            stats.skipped_authorships
        );
    }

    Ok(())
}

fn parse_args(args: &[String]) -> anyhow::Result<(String, WorksQuery)> {
    let mut email = None;
    let mut institution = None;
    let mut from = 2020;
    let mut to = 2024;
    let mut limit = None;

    let mut i = 1;
    while i < args.len() {
        let value = args
            .get(i + 1)
            .ok_or_else(|| anyhow::anyhow!("Missing value for {}", args[i]))?;
        match args[i].as_str() {
            "--email" => email = Some(value.clone()),
            "--institution" | "-i" => institution = Some(value.clone()),
            "--from" => from = value.parse()?,
            "--to" => to = value.parse()?,
            "--limit" | "-l" => limit = Some(value.parse()?),
            other => anyhow::bail!("Unknown argument: {other}"),
        }
        i += 2;
    }

    let email = email.ok_or_else(|| anyhow::anyhow!("--email is required"))?;
    let institution = institution.ok_or_else(|| anyhow::anyhow!("--institution is required"))?;
    let mut query = WorksQuery::new(institution, from, to);
    query.max_items = limit;
    Ok((email, query))
}
