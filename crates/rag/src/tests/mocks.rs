//! In-process stand-ins for the pipeline's network collaborators.

use crate::discovery::{SearchBackend, SearchResponse};
use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::Crawler;
use freshquery_core::{AppError, AppResult};
use freshquery_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Search backend returning a canned response or error.
pub struct StaticSearch {
    pub response: Result<SearchResponse, String>,
}

impl StaticSearch {
    pub fn with_urls(urls: &[&str]) -> Arc<Self> {
        let results: Vec<_> = urls
            .iter()
            .map(|u| serde_json::json!({ "url": u, "title": "result" }))
            .collect();
        let body = serde_json::json!({ "results": results }).to_string();
        Arc::new(Self {
            response: Ok(SearchResponse::json(body)),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
        })
    }
}

#[async_trait::async_trait]
impl SearchBackend for StaticSearch {
    async fn search(&self, _query: &str) -> AppResult<SearchResponse> {
        self.response.clone().map_err(AppError::Search)
    }

    fn host(&self) -> Option<&str> {
        Some("search.local:80")
    }
}

/// What the mock crawler does for one URL.
#[derive(Clone)]
pub enum Page {
    Text(String),
    Fail,
    Slow(Duration, String),
}

/// Crawler serving pages from a map; unknown URLs fail.
#[derive(Default)]
pub struct MapCrawler {
    pages: HashMap<String, Page>,
}

impl MapCrawler {
    pub fn page(mut self, url: &str, page: Page) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn text(self, url: &str, text: &str) -> Self {
        self.page(url, Page::Text(text.to_string()))
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl Crawler for MapCrawler {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        match self.pages.get(url).cloned() {
            Some(Page::Text(text)) => Ok(text),
            Some(Page::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Page::Fail) | None => Err(AppError::Crawl(format!("{} unreachable", url))),
        }
    }
}

/// Trigram embeddings, or a failure on every call.
#[derive(Debug)]
pub struct TestEmbedder {
    inner: TrigramProvider,
    fail: bool,
}

impl TestEmbedder {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            inner: TrigramProvider::new(256),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            inner: TrigramProvider::new(256),
            fail: true,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TestEmbedder {
    fn provider_name(&self) -> &str {
        "test"
    }

    fn model_name(&self) -> &str {
        "test"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.fail {
            return Err(AppError::Embedding("embedding backend offline".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

/// LLM that records prompts and returns a fixed reply or error.
pub struct RecordingLlm {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<LlmRequest>>,
}

impl RecordingLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 5),
                done: true,
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}

/// Readable text comfortably above the chunk threshold.
pub fn article(topic: &str) -> String {
    format!(
        "Updated 2 hours ago. Reports about {topic} say the latest figure was confirmed by officials \
         this morning, and several outlets repeated the same number with minor differences in wording. "
    )
    .repeat(3)
}
