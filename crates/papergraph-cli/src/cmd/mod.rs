//! Subcommands and the plumbing they share

pub mod coauthors;
pub mod collaborations;
pub mod institutions;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use papergraph_core::{FetchError, SharedProgress, fmt_num};
use papergraph_openalex::{ApiRecord, DecodeStats, OpenAlexClient, PageSource, Paginator};

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Print a multi-column table on stderr
pub fn print_table(header: &[&str], rows: impl IntoIterator<Item = Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    eprintln!("\n{table}");
}

/// Create the output directory (explicit or timestamped) and mirror logs into it.
pub fn prepare_output_dir(explicit: Option<PathBuf>, fallback: PathBuf) -> Result<PathBuf> {
    let dir = explicit.unwrap_or(fallback);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    papergraph_core::attach_log_file(&dir.join(papergraph_network::export::files::LOG))
        .with_context(|| format!("Failed to create log file in {}", dir.display()))?;
    log::info!("Output: {}", dir.display());
    Ok(dir)
}

/// Outcome of draining a paginated listing
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: usize,
    pub pages: u32,
    /// `meta.count` reported by the server
    pub total: Option<u64>,
    pub decode: DecodeStats,
    /// Set when the fetch was cut short; items before it were still consumed
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    /// Summary rows shared by every fetching subcommand
    pub fn summary_rows(&self, noun: &str) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            (
                "Fetched",
                match self.total {
                    Some(total) => format!("{} of {} {noun}", fmt_num(self.items), fmt_num(total as usize)),
                    None => format!("{} {noun}", fmt_num(self.items)),
                },
            ),
            ("Pages", self.pages.to_string()),
            (
                "Skipped",
                format!(
                    "{} records, {} authorships",
                    self.decode.skipped_records, self.decode.skipped_authorships
                ),
            ),
        ];
        if let Some(e) = &self.error {
            rows.push(("Aborted", e.to_string()));
        }
        rows
    }
}

/// Feed every batch of `pages` to `sink`, with a progress bar.
///
/// A failed page stops the fetch; batches already handed to `sink` stay there.
pub fn drain<S, R>(
    mut pages: Paginator<'_, S, R>,
    label: &str,
    cap: Option<usize>,
    progress: &SharedProgress,
    mut sink: impl FnMut(Vec<R::Record>),
) -> FetchOutcome
where
    S: PageSource + ?Sized,
    R: ApiRecord,
{
    let pb = progress.item_bar(label, cap.map(|n| n as u64));
    let mut error = None;
    while let Some(batch) = pages.next() {
        match batch {
            Ok(records) => {
                pb.inc(records.len() as u64);
                log::debug!("{label}: page {} ({} records)", pages.pages_fetched(), records.len());
                sink(records);
            }
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }
    pb.finish_and_clear();

    let outcome = FetchOutcome {
        items: pages.items_yielded(),
        pages: pages.pages_fetched(),
        total: pages.total_count(),
        decode: pages.decode_stats(),
        error,
    };
    match &outcome.error {
        Some(e) => log::error!(
            "{label}: fetch aborted after {} records: {e}",
            fmt_num(outcome.items)
        ),
        None => log::info!(
            "{label}: fetched {} records in {} pages",
            fmt_num(outcome.items),
            outcome.pages
        ),
    }
    outcome
}

/// Fail the command once outputs are written if the fetch was cut short
pub fn finish(outcome: FetchOutcome, output_dir: &Path) -> Result<()> {
    eprintln!("\nResults saved to {}", output_dir.display());
    match outcome.error {
        Some(e) => Err(anyhow::Error::new(e).context(format!(
            "fetch aborted after {} records; partial results were written",
            outcome.items
        ))),
        None => Ok(()),
    }
}

/// Institution display name, falling back to the id when the lookup fails
pub fn institution_name(client: &OpenAlexClient, id: &str) -> String {
    match client.institution(id) {
        Ok(inst) => inst.display_name,
        Err(e) => {
            log::warn!("could not look up institution {id}: {e}");
            id.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_rows_with_total() {
        let outcome = FetchOutcome {
            items: 1500,
            pages: 8,
            total: Some(12_000),
            ..Default::default()
        };
        let rows = outcome.summary_rows("works");
        assert_eq!(rows[0], ("Fetched", "1,500 of 12,000 works".to_string()));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn summary_rows_report_abort() {
        let outcome = FetchOutcome {
            error: Some(FetchError::Decode("bad".into())),
            ..Default::default()
        };
        let rows = outcome.summary_rows("works");
        assert_eq!(rows.last().unwrap().0, "Aborted");
    }

    #[test]
    fn output_dir_created() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("a").join("b");
        let dir = prepare_output_dir(Some(target.clone()), PathBuf::from("unused")).unwrap();
        assert_eq!(dir, target);
        assert!(target.is_dir());
    }

    #[test]
    fn finish_propagates_abort() {
        let tmp = tempfile::TempDir::new().unwrap();
        let outcome = FetchOutcome {
            items: 10,
            error: Some(FetchError::Decode("bad".into())),
            ..Default::default()
        };
        let err = finish(outcome, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("after 10 records"));
        assert!(finish(FetchOutcome::default(), tmp.path()).is_ok());
    }
}
