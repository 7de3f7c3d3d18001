//! papergraph - bibliometric network builder for OpenAlex
//!
//! Fetches works and institutions from the OpenAlex API and turns them into
//! co-authorship and collaboration networks (CSV, GEXF and text reports).

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;
use papergraph_openalex::OpenAlexClient;

#[derive(Parser)]
#[command(name = "papergraph")]
#[command(about = "Co-authorship and collaboration networks from OpenAlex")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./papergraph.toml or ~/.config/papergraph/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Contact email sent to OpenAlex (polite pool)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the co-authorship network of an institution
    Coauthors(cmd::coauthors::CoauthorsArgs),
    /// Summarize which institutions an institution collaborates with
    Collaborations(cmd::collaborations::CollaborationsArgs),
    /// Export the institution listing
    Institutions(cmd::institutions::InstitutionsArgs),
    /// Show current configuration
    Config,
}

fn build_client(email: Option<&str>, max_retries: Option<u32>, config: &Config) -> Result<OpenAlexClient> {
    let email = config.email(email)?;
    Ok(OpenAlexClient::new(email)
        .with_base_url(config.openalex.base_url.as_str())
        .with_max_retries(max_retries.unwrap_or(config.http.max_retries)))
}

fn show_config(config: &Config, email: Option<&str>, max_retries: Option<u32>) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Output directory",
        &config.output.default_dir.display().to_string(),
    ]);
    table.add_row(vec!["OA base URL", &config.openalex.base_url]);
    table.add_row(vec!["OA email", config.email(email).unwrap_or("not set")]);
    table.add_row(vec!["Per page", &config.openalex.per_page.to_string()]);
    table.add_row(vec![
        "Max retries",
        &max_retries.unwrap_or(config.http.max_retries).to_string(),
    ]);

    eprintln!("\n{table}");
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(papergraph_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, progress bars show activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    papergraph_core::init_logging(quiet, cli.debug, multi);

    // Load configuration
    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // CLI flags override config file values
    let email = cli.email.as_deref();
    let client = || build_client(email, cli.max_retries, &config);

    match cli.command {
        Command::Coauthors(args) => cmd::coauthors::run(args, &config, &client()?, &progress),
        Command::Collaborations(args) => {
            cmd::collaborations::run(args, &config, &client()?, &progress)
        }
        Command::Institutions(args) => {
            cmd::institutions::run(args, &config, &client()?, &progress)
        }
        Command::Config => {
            show_config(&config, email, cli.max_retries);
            Ok(())
        }
    }
}
