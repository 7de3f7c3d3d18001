//! Blocking HTTP GET on top of a shared async client.
//!
//! Uses async reqwest internally, but presents a sync interface: every call
//! blocks until the response body has arrived.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole-request timeout (connect + headers + body)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// `User-Agent` value identifying the caller to the API operator.
pub fn contact_user_agent(email: &str) -> String {
    format!("mailto:{email}")
}

/// HTTP GET with query parameters → response body as text.
///
/// Non-2xx statuses are errors. Must not be called from inside an async context.
pub fn get_text(
    url: &str,
    query: &[(&str, String)],
    user_agent: &str,
) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .query(query)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(FetchError::from_reqwest)?;
        response.text().await.map_err(FetchError::from_reqwest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn user_agent_format() {
        assert_eq!(contact_user_agent("me@example.org"), "mailto:me@example.org");
    }

    #[test]
    fn get_text_sends_query_and_header() {
        let server = SHARED_RUNTIME.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/works"))
                .and(query_param("per-page", "25"))
                .and(header("user-agent", "mailto:me@example.org"))
                .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
                .mount(&server)
                .await;
            server
        });

        let body = get_text(
            &format!("{}/works", server.uri()),
            &[("per-page", "25".to_string())],
            "mailto:me@example.org",
        )
        .unwrap();
        assert_eq!(body, "ok");
    }

    #[test]
    fn get_text_maps_status() {
        let server = SHARED_RUNTIME.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;
            server
        });

        let err = get_text(&server.uri(), &[], "mailto:x").unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());
    }
}
