//! Best-effort link shortening through a GPLinks-compatible HTTP API.
//!
//! The service is never a hard dependency: every failure mode collapses into
//! a [`ShortenError`], and [`Shortener::shorten_or_original`] turns that into
//! the untouched input URL.

use std::time::Duration;

use futures_util::future::join_all;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.gplinks.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ShortenerConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShortenError {
    #[error("link shortener API key is not configured")]
    MissingApiKey,

    /// Carries no request URL, which would contain the API key.
    #[error("request to shortening service failed: {0}")]
    Request(reqwest::Error),

    #[error("shortening service answered {0}")]
    Status(StatusCode),

    #[error("shortening service did not shorten the URL: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ShortenError {
    fn from(e: reqwest::Error) -> Self {
        ShortenError::Request(e.without_url())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: Option<String>,
    #[serde(rename = "shortenedUrl")]
    shortened_url: Option<String>,
    message: Option<serde_json::Value>,
}

/// The URL to store for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenOutcome {
    pub url: String,
    /// Set only when `url` is a substitute for this original.
    pub original_url: Option<String>,
}

impl ShortenOutcome {
    fn unchanged(url: &str) -> Self {
        Self {
            url: url.to_string(),
            original_url: None,
        }
    }
}

#[derive(Clone)]
pub struct Shortener {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl Shortener {
    pub fn new(config: ShortenerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn shorten(&self, url: &str) -> Result<String, ShortenError> {
        let api_key = self.api_key.as_deref().ok_or(ShortenError::MissingApiKey)?;

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("api", api_key), ("url", url)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShortenError::Status(resp.status()));
        }

        let body: ApiResponse = resp.json().await?;
        match (body.status.as_deref(), body.shortened_url) {
            (Some("success"), Some(short)) if is_http_url(&short) => Ok(short),
            (_, _) => Err(ShortenError::Rejected(
                body.message
                    .map(|m| match m {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| "unexpected response".into()),
            )),
        }
    }

    pub async fn shorten_or_original(&self, enabled: bool, url: &str) -> ShortenOutcome {
        if !enabled {
            return ShortenOutcome::unchanged(url);
        }

        match self.shorten(url).await {
            Ok(short) => {
                debug!("Shortened {} -> {}", url, short);
                ShortenOutcome {
                    url: short,
                    original_url: Some(url.to_string()),
                }
            }
            Err(e) => {
                warn!("Keeping original URL {}: {}", url, e);
                ShortenOutcome::unchanged(url)
            }
        }
    }

    /// Shortens every URL concurrently. Output order matches input order.
    pub async fn shorten_all(&self, enabled: bool, urls: &[String]) -> Vec<ShortenOutcome> {
        join_all(urls.iter().map(|url| self.shorten_or_original(enabled, url))).await
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// A local stand-in for the shortening API.
#[cfg(test)]
pub(crate) mod fake_api {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;

    pub const API_KEY: &str = "test-key";

    /// Spawns the fake service and returns its base URL.
    ///
    /// `/api` shortens to `https://gplinks.co/<n>` where `n` is the input
    /// length, or reports an error for a wrong key. `/broken` answers 500,
    /// `/garbage` answers non-JSON, `/slow` stalls for two seconds.
    pub async fn spawn() -> String {
        let app = Router::new()
            .route(
                "/api",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("api").map(String::as_str) != Some(API_KEY) {
                        return Json(json!({ "status": "error", "message": "Invalid API key" }));
                    }
                    let len = q.get("url").map(String::len).unwrap_or(0);
                    Json(json!({ "status": "success", "shortenedUrl": format!("https://gplinks.co/{len}") }))
                }),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/garbage", get(|| async { "<html>not json</html>" }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(json!({ "status": "success", "shortenedUrl": "https://gplinks.co/slow" }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}
