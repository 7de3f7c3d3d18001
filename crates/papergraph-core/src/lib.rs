//! Papergraph Core - Common infrastructure for bibliometric network tools
//!
//! This crate provides the HTTP plumbing, error type, opt-in retry,
//! logging and progress reporting shared by the OpenAlex client and the CLI.

pub mod error;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod stream;

// Re-exports for convenience
pub use error::FetchError;
pub use logging::{IndicatifLogger, attach_log_file, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::retry_with_backoff;
pub use stream::{SHARED_RUNTIME, contact_user_agent, get_text};
