//! Ranked URL discovery through a search backend.
//!
//! The backend is asked once per query. Its answer is either a JSON result
//! list or an HTML page; both are reduced to candidate URLs in backend order,
//! filtered, deduplicated and capped.

use crate::types::RankedUrl;
use freshquery_core::config::SearchConfig;
use freshquery_core::{AppError, AppResult};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Raw response from a search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// Value of the `Content-Type` header, empty when absent
    pub content_type: String,
    pub body: String,
}

impl SearchResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            content_type: "application/json".to_string(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }
}

/// A search engine reachable by the pipeline.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one search and return the raw response.
    async fn search(&self, query: &str) -> AppResult<SearchResponse>;

    /// `host:port` of the backend itself, whose links are never candidates.
    fn host(&self) -> Option<&str>;
}

/// Search backend speaking the Whoogle/SearXNG `?q=<query>&format=json` convention.
pub struct HttpSearchBackend {
    client: reqwest::Client,
    endpoint: String,
    host: Option<String>,
}

impl HttpSearchBackend {
    /// Build the backend client from configuration.
    pub fn new(config: &SearchConfig) -> AppResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            AppError::Config(format!(
                "Invalid search endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Search(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: authority(&endpoint),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &str) -> AppResult<SearchResponse> {
        tracing::debug!(endpoint = %self.endpoint, "Querying search backend");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("Search backend HTTP error: {}", e)))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read search response: {}", e)))?;

        tracing::debug!(bytes = body.len(), content_type = %content_type, "Search response received");

        Ok(SearchResponse { content_type, body })
    }

    fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}

/// Allow/deny rules applied to candidate URLs.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    allow: Vec<String>,
    deny: Vec<String>,
    excluded_host: Option<String>,
}

impl UrlFilter {
    pub fn new(allow: Vec<String>, deny: Vec<String>) -> Self {
        Self {
            allow,
            deny,
            excluded_host: None,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.allow_patterns.clone(), config.deny_patterns.clone())
    }

    /// Reject every URL on this `host:port` (the search backend's own links).
    pub fn excluding_host(mut self, host: Option<&str>) -> Self {
        self.excluded_host = host.map(|h| h.to_ascii_lowercase());
        self
    }

    /// Whether a candidate URL may be used.
    ///
    /// Only absolute http(s) URLs pass. Patterns are plain substrings.
    pub fn accepts(&self, candidate: &str) -> bool {
        let Ok(parsed) = Url::parse(candidate) else {
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        let Some(origin) = authority(&parsed) else {
            return false;
        };

        if self.excluded_host.as_deref() == Some(origin.as_str()) {
            return false;
        }

        if self.deny.iter().any(|p| candidate.contains(p.as_str())) {
            return false;
        }

        self.allow.is_empty() || self.allow.iter().any(|p| candidate.contains(p.as_str()))
    }
}

/// Lowercase `host:port`, using the scheme's default port when none is given.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Extract candidate URLs from a backend response, in backend order.
pub fn parse_search_response(response: &SearchResponse) -> AppResult<Vec<String>> {
    if response.content_type.contains("application/json") {
        parse_json_results(&response.body)
    } else {
        parse_html_links(&response.body)
    }
}

/// Accepts `{"results": [...]}` or a bare array; each item yields `url`, else `href`.
fn parse_json_results(body: &str) -> AppResult<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::Search(format!("Invalid JSON from search backend: {}", e)))?;

    let items = match &value {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => map
            .get("results")
            .and_then(|r| r.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            item.get("url")
                .and_then(|u| u.as_str())
                .or_else(|| item.get("href").and_then(|h| h.as_str()))
        })
        .map(|u| u.trim().to_string())
        .collect())
}

fn parse_html_links(body: &str) -> AppResult<Vec<String>> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("a[href]")
        .map_err(|e| AppError::Search(format!("Invalid link selector: {:?}", e)))?;

    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|h| h.trim().to_string())
        .collect())
}

/// Stable dedup: keep the first occurrence of every URL, in order.
pub fn dedup_stable<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Filter, dedup, cap to `max_results` and assign ranks starting at 1.
pub fn rank_candidates(
    candidates: Vec<String>,
    filter: &UrlFilter,
    max_results: usize,
) -> Vec<RankedUrl> {
    dedup_stable(candidates.into_iter().filter(|url| filter.accepts(url)))
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(i, url)| RankedUrl::new(url, i + 1))
        .collect()
}

/// Discovery stage: query to ranked candidate URLs.
pub struct Discovery {
    backend: std::sync::Arc<dyn SearchBackend>,
    filter: UrlFilter,
    max_results: usize,
}

impl Discovery {
    pub fn new(
        backend: std::sync::Arc<dyn SearchBackend>,
        filter: UrlFilter,
        max_results: usize,
    ) -> Self {
        let filter = filter.excluding_host(backend.host());
        Self {
            backend,
            filter,
            max_results,
        }
    }

    /// Discovery over the HTTP backend and URL patterns named in `config`.
    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        let backend = std::sync::Arc::new(HttpSearchBackend::new(config)?);
        Ok(Self::new(
            backend,
            UrlFilter::from_config(config),
            config.max_results,
        ))
    }

    /// Find up to `max_results` ranked URLs for a query.
    ///
    /// Network and parse failures are logged and yield an empty list.
    pub async fn discover(&self, query: &str) -> Vec<RankedUrl> {
        let response = match self.backend.search(query).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Discovery failed: {}", e);
                return Vec::new();
            }
        };

        let candidates = match parse_search_response(&response) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Could not parse search response: {}", e);
                return Vec::new();
            }
        };

        let ranked = rank_candidates(candidates, &self.filter, self.max_results);
        tracing::info!(urls = ranked.len(), "Discovered candidate URLs");
        ranked
    }
}
