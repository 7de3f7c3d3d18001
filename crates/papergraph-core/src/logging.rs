//! Logging utilities with indicatif integration and an optional log file

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use indicatif::MultiProgress;

/// Log file shared by both logger flavours, attached once the output directory exists.
static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

/// ANSI color code and padded label for a log level.
fn level_style(level: log::Level, color: bool) -> (&'static str, &'static str, &'static str) {
    let label = match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    if !color {
        return ("", label, "");
    }
    let ansi = match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    };
    (ansi, label, "\x1b[0m")
}

/// Line written to the log file: `2024-05-01 12:00:00 - INFO - message`
fn file_line(record: &log::Record) -> String {
    format!(
        "{} - {} - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

fn write_to_file(record: &log::Record) {
    if let Some(file) = LOG_FILE.get() {
        if let Ok(mut f) = file.lock() {
            let _ = writeln!(f, "{}", file_line(record));
        }
    }
}

/// Mirror every subsequent log record into `path` (created or truncated).
///
/// Only the first call takes effect; later calls are ignored with a warning.
pub fn attach_log_file(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    if LOG_FILE.set(Mutex::new(file)).is_err() {
        log::warn!("log file already attached, ignoring {}", path.display());
    }
    Ok(())
}

/// Least severe level mirrored to the log file, whatever the console shows
const FILE_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Whether a record at `level` goes to the log file when the console filter is `console`.
fn file_accepts(level: log::Level, console: log::LevelFilter) -> bool {
    level <= console.max(FILE_LEVEL)
}

/// Console logger that also mirrors records to the log file.
///
/// On a TTY, lines print through indicatif MultiProgress to avoid mixing with
/// progress bars. Otherwise env_logger writes plain lines to stderr.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: Option<MultiProgress>,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: Option<MultiProgress>) -> Self {
        Self { inner, multi }
    }

    /// Max level the `log` facade must let through for console and file
    pub fn max_level(&self) -> log::LevelFilter {
        self.inner.filter().max(FILE_LEVEL)
    }

    fn mirrors_to_file(&self, level: log::Level) -> bool {
        LOG_FILE.get().is_some() && file_accepts(level, self.inner.filter())
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || self.mirrors_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            match &self.multi {
                Some(multi) => {
                    let (pre, label, post) = level_style(record.level(), true);
                    let line = format!("[{pre}{label}{post}] {}", record.args());
                    multi.suspend(|| eprintln!("{line}"));
                }
                None => self.inner.log(record),
            }
        }
        if self.mirrors_to_file(record.level()) {
            write_to_file(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
        if let Some(file) = LOG_FILE.get() {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Default filter when `RUST_LOG` is unset.
fn default_level(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Initialize logging with optional TTY mode (indicatif integration).
///
/// The console follows `RUST_LOG` or the quiet/debug flags; the log file
/// always receives info and above.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    let env = env_logger::Env::default().default_filter_or(default_level(quiet, debug));
    let mut builder = env_logger::Builder::from_env(env);
    if multi.is_none() {
        // Non-TTY: no ANSI colors
        builder.format(|buf, record| {
            let (_, label, _) = level_style(record.level(), false);
            writeln!(buf, "[{label}] {}", record.args())
        });
    }

    let logger = IndicatifLogger::new(builder.build(), multi.cloned());
    let max_level = logger.max_level();
    log::set_boxed_logger(Box::new(logger)).expect("failed to init logger");
    log::set_max_level(max_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_precedence() {
        assert_eq!(default_level(true, true), "debug");
        assert_eq!(default_level(true, false), "warn");
        assert_eq!(default_level(false, false), "info");
    }

    #[test]
    fn plain_style_has_no_ansi() {
        let (pre, label, post) = level_style(log::Level::Warn, false);
        assert_eq!((pre, label, post), ("", "WARN ", ""));
    }

    #[test]
    fn colored_style_resets() {
        let (pre, _, post) = level_style(log::Level::Error, true);
        assert_eq!(pre, "\x1b[31m");
        assert_eq!(post, "\x1b[0m");
    }

    #[test]
    fn file_gets_info_under_quiet_console() {
        // --quiet console is warn-only; the file still takes info
        assert!(file_accepts(log::Level::Info, log::LevelFilter::Warn));
        assert!(file_accepts(log::Level::Warn, log::LevelFilter::Warn));
        assert!(!file_accepts(log::Level::Debug, log::LevelFilter::Warn));
        assert!(file_accepts(log::Level::Info, log::LevelFilter::Off));
    }

    #[test]
    fn file_follows_debug_console() {
        assert!(file_accepts(log::Level::Debug, log::LevelFilter::Debug));
        assert!(!file_accepts(log::Level::Trace, log::LevelFilter::Debug));
    }

    #[test]
    fn max_level_covers_file() {
        let quiet = IndicatifLogger::new(
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .build(),
            None,
        );
        assert_eq!(quiet.max_level(), log::LevelFilter::Info);

        let debug = IndicatifLogger::new(
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Debug)
                .build(),
            None,
        );
        assert_eq!(debug.max_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn file_line_format() {
        let line = file_line(
            &log::Record::builder()
                .args(format_args!("hello"))
                .level(log::Level::Info)
                .build(),
        );
        assert!(line.ends_with(" - INFO - hello"), "{line}");
    }
}
