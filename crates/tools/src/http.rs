//! Shared HTTP client for the handlers that call public REST APIs.
//!
//! One pooled `reqwest::Client` is built from `[endpoints]` configuration and
//! cloned into each handler. Every request either yields parsed JSON or a
//! classified [`HandlerError`].

use std::time::Duration;

use datadesk_config::EndpointsConfig;
use datadesk_core::HandlerError;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTP client setup failed, falling back to defaults without a timeout");
                reqwest::Client::new()
            });
        Self { client }
    }

    pub fn from_config(endpoints: &EndpointsConfig) -> Self {
        Self::new(Duration::from_secs(endpoints.timeout_secs))
    }

    /// GET `url` with query parameters and decode the body as JSON.
    ///
    /// - unreachable host or timeout → [`HandlerError::Connection`]
    /// - non-2xx status → [`HandlerError::RemoteStatus`] with the body text
    /// - undecodable body → [`HandlerError::Failed`]
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, HandlerError> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HandlerError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| HandlerError::Failed(format!("Invalid JSON from {url}: {e}")))
    }
}

fn classify(url: &str, error: reqwest::Error) -> HandlerError {
    if error.is_connect() || error.is_timeout() {
        HandlerError::Connection(format!("{url} ({error})"))
    } else {
        HandlerError::Failed(format!("Request to {url} failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend() -> HttpBackend {
        HttpBackend::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn decodes_json_and_sends_query() {
        let app = Router::new().route(
            "/echo",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(serde_json::json!({ "name": q.get("name") }))
            }),
        );
        let base = serve(app).await;

        let value = backend()
            .get_json(&format!("{base}/echo"), &[("name", "Tokyo")])
            .await
            .unwrap();
        assert_eq!(value["name"], "Tokyo");
    }

    #[tokio::test]
    async fn non_success_status_is_remote_status() {
        let app = Router::new().route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(app).await;

        let err = backend()
            .get_json(&format!("{base}/down"), &[])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HandlerError::RemoteStatus {
                status: 503,
                body: "maintenance".into()
            }
        );
        assert_eq!(err.to_string(), "API returned HTTP 503: maintenance");
    }

    #[tokio::test]
    async fn invalid_json_is_failure() {
        let app = Router::new().route("/html", get(|| async { "<html>nope</html>" }));
        let base = serve(app).await;

        let err = backend()
            .get_json(&format!("{base}/html"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Failed(msg) if msg.starts_with("Invalid JSON")));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend()
            .get_json(&format!("http://{addr}/"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Connection(_)));
        assert!(err.to_string().starts_with("Could not connect to API: "));
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
        let base = serve(app).await;

        let err = HttpBackend::new(Duration::from_millis(200))
            .get_json(&format!("{base}/slow"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Connection(_)));
    }
}
