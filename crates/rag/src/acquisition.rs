//! Concurrent page acquisition.

use crate::content::{clean_plain_text, extract_text};
use crate::types::{Document, RankedUrl};
use freshquery_core::config::CrawlConfig;
use freshquery_core::{AppError, AppResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Fetches a page and returns its readable text.
#[async_trait::async_trait]
pub trait Crawler: Send + Sync {
    /// Fetch one URL and return extracted text (possibly empty).
    async fn fetch(&self, url: &str) -> AppResult<String>;

    /// Fetch all URLs concurrently, each bounded by `timeout`.
    ///
    /// Results come back in input order. A slow or failing URL only affects
    /// its own slot.
    async fn fetch_many(
        &self,
        urls: &[RankedUrl],
        timeout: Duration,
    ) -> Vec<(RankedUrl, AppResult<String>)> {
        let fetches = urls.iter().map(|ranked| async move {
            let result = match tokio::time::timeout(timeout, self.fetch(&ranked.url)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Crawl(format!(
                    "Timed out after {}s fetching {}",
                    timeout.as_secs_f32(),
                    ranked.url
                ))),
            };
            (ranked.clone(), result)
        });

        join_all(fetches).await
    }
}

/// Crawler backed by reqwest and HTML text extraction.
pub struct HttpCrawler {
    client: reqwest::Client,
    max_chars: usize,
}

impl HttpCrawler {
    pub fn new(config: &CrawlConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| AppError::Crawl(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_chars: config.max_chars,
        })
    }
}

#[async_trait::async_trait]
impl Crawler for HttpCrawler {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        tracing::debug!(url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Crawl(format!("Request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| AppError::Crawl(format!("HTTP error from {}: {}", url, e)))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();

        if !content_type.contains("html") && !content_type.starts_with("text/") {
            return Err(AppError::Crawl(format!(
                "Unsupported content type '{}' at {}",
                content_type, url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Crawl(format!("Failed to read body of {}: {}", url, e)))?;

        let text = if content_type.contains("html") {
            extract_text(&body, self.max_chars)
        } else {
            clean_plain_text(&body, self.max_chars)
        };

        tracing::debug!(url, chars = text.chars().count(), "Extracted page text");
        Ok(text)
    }
}

/// Acquisition stage: ranked URLs to documents.
pub struct Acquisition {
    crawler: Arc<dyn Crawler>,
    timeout: Duration,
}

impl Acquisition {
    pub fn new(crawler: Arc<dyn Crawler>, timeout: Duration) -> Self {
        Self { crawler, timeout }
    }

    /// Fetch every URL concurrently and keep the readable ones.
    ///
    /// Output keeps discovery order and each URL's rank. Failed, timed out
    /// and empty pages are logged and dropped.
    pub async fn acquire(&self, urls: &[RankedUrl]) -> Vec<Document> {
        let results = self.crawler.fetch_many(urls, self.timeout).await;

        let documents: Vec<Document> = results
            .into_iter()
            .filter_map(|(ranked, result)| match result {
                Ok(text) if !text.trim().is_empty() => Some(Document {
                    url: ranked.url,
                    text,
                    rank: ranked.rank,
                }),
                Ok(_) => {
                    tracing::debug!(url = %ranked.url, "Page had no readable text");
                    None
                }
                Err(e) => {
                    tracing::warn!(url = %ranked.url, "Skipping page: {}", e);
                    None
                }
            })
            .collect();

        tracing::info!(
            requested = urls.len(),
            acquired = documents.len(),
            "Acquired documents"
        );

        documents
    }
}
