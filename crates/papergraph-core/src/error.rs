//! Error type for paginated API fetches

/// Error from a single API request (transport, status or body decoding).
///
/// A fetch aborts on the first `FetchError`; batches yielded before the
/// failure stay with the caller.
#[derive(Debug)]
pub enum FetchError {
    /// Transport failure or non-2xx response, with the status when known
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response body was not the expected JSON envelope
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Decode(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create HTTP error from reqwest error.
    ///
    /// The URL is stripped so the contact email in query strings never ends up in logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    /// Rate limiting, server errors and status-less transport failures may
    /// succeed on a later attempt. Client errors and bad bodies won't.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status: None, .. } => true,
            Self::Http {
                status: Some(s), ..
            } => matches!(s, 429 | 500..=599),
            Self::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            Self::Decode(_) => None,
        }
    }
}
