//! End-to-end pipeline outcomes with in-process collaborators.

use super::mocks::{article, MapCrawler, Page, RecordingLlm, StaticSearch, TestEmbedder};
use crate::acquisition::Acquisition;
use crate::chunker::Indexer;
use crate::discovery::{Discovery, SearchBackend, UrlFilter};
use crate::embeddings::EmbeddingProvider;
use crate::synthesizer::{SynthesisSettings, Synthesizer};
use crate::types::{
    AnswerStatus, NOT_ENOUGH_TEXT_MESSAGE, NO_RESULTS_MESSAGE, UNREADABLE_MESSAGE,
};
use crate::{Crawler, Pipeline};
use freshquery_core::config::{GenerationConfig, IndexConfig};
use freshquery_llm::LlmClient;
use freshquery_prompt::consensus_prompt;
use std::sync::Arc;
use std::time::{Duration, Instant};

const A: &str = "https://a.example/news";
const B: &str = "https://b.example/report";
const C: &str = "https://c.example/story";

fn pipeline(
    search: Arc<dyn SearchBackend>,
    crawler: Arc<dyn Crawler>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
) -> Pipeline {
    pipeline_with_timeout(search, crawler, embedder, llm, Duration::from_secs(5))
}

fn pipeline_with_timeout(
    search: Arc<dyn SearchBackend>,
    crawler: Arc<dyn Crawler>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
    page_timeout: Duration,
) -> Pipeline {
    Pipeline::new(
        Discovery::new(search, UrlFilter::default(), 5),
        Acquisition::new(crawler, page_timeout),
        Indexer::new(Arc::clone(&embedder), IndexConfig::default()),
        Synthesizer::new(
            embedder,
            llm,
            consensus_prompt(),
            SynthesisSettings::from(&GenerationConfig::default()),
        ),
    )
}

#[tokio::test]
async fn test_no_urls() {
    let llm = RecordingLlm::replying("unused");
    let p = pipeline(
        StaticSearch::with_urls(&[]),
        MapCrawler::default().build(),
        TestEmbedder::working(),
        llm.clone(),
    );

    let (answer, sources) = p.run_pair("anything").await;
    assert_eq!(answer, NO_RESULTS_MESSAGE);
    assert!(sources.is_empty());
    assert!(llm.last_request().is_none());
}

#[tokio::test]
async fn test_search_failure_is_no_results() {
    let p = pipeline(
        StaticSearch::failing("connection refused"),
        MapCrawler::default().build(),
        TestEmbedder::working(),
        RecordingLlm::replying("unused"),
    );

    let answer = p.run("anything").await;
    assert_eq!(answer.status, AnswerStatus::NoResults);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn test_all_pages_unreadable() {
    let crawler = MapCrawler::default()
        .page(A, Page::Fail)
        .text(B, "   ")
        .build();
    let p = pipeline(
        StaticSearch::with_urls(&[A, B]),
        crawler,
        TestEmbedder::working(),
        RecordingLlm::replying("unused"),
    );

    let (answer, sources) = p.run_pair("anything").await;
    assert_eq!(answer, UNREADABLE_MESSAGE);
    assert!(sources.is_empty());
}

#[tokio::test]
async fn test_not_enough_text() {
    let crawler = MapCrawler::default()
        .text(A, "Too short to be useful.")
        .text(B, "Also short.")
        .build();
    let p = pipeline(
        StaticSearch::with_urls(&[A, B]),
        crawler,
        TestEmbedder::working(),
        RecordingLlm::replying("unused"),
    );

    let (answer, sources) = p.run_pair("anything").await;
    assert_eq!(answer, NOT_ENOUGH_TEXT_MESSAGE);
    assert!(sources.is_empty());
}

#[tokio::test]
async fn test_chunk_embedding_failure() {
    let crawler = MapCrawler::default().text(A, &article("bitcoin")).build();
    let llm = RecordingLlm::replying("unused");
    let p = pipeline(
        StaticSearch::with_urls(&[A]),
        crawler,
        TestEmbedder::failing(),
        llm.clone(),
    );

    let answer = p.run("bitcoin price").await;
    assert_eq!(answer.status, AnswerStatus::EmbeddingFailed);
    assert!(answer.text.starts_with("I could not embed the live results"));
    assert!(answer.sources.is_empty());
    assert!(llm.last_request().is_none());
}

#[tokio::test]
async fn test_answer_with_sources() {
    let crawler = MapCrawler::default()
        .text(A, &article("the bitcoin price"))
        .page(B, Page::Fail)
        .text(C, &article("bitcoin mining"))
        .build();
    let llm = RecordingLlm::replying("  Bitcoin trades at 61,000 USD.  ");
    let p = pipeline(
        StaticSearch::with_urls(&[A, B, C]),
        crawler,
        TestEmbedder::working(),
        llm.clone(),
    );

    let answer = p.run("bitcoin price").await;
    assert_eq!(answer.status, AnswerStatus::Answered);
    assert_eq!(answer.text, "Bitcoin trades at 61,000 USD.");
    assert!(!answer.sources.is_empty());
    assert!(answer.sources.iter().all(|s| s == A || s == C));

    let request = llm.last_request().unwrap();
    assert_eq!(request.model, "mistral:7b-instruct");
    assert_eq!(request.temperature, Some(0.0));
    assert_eq!(request.context_window, Some(2048));
    assert!(request.prompt.contains("USER QUESTION: bitcoin price"));
    assert!(request.prompt.contains("CURRENT SYSTEM DATE:"));
    assert!(request.prompt.contains("[Search Rank: #1 | Source: https://a.example/news]"));
    assert!(request.prompt.contains("[Search Rank: #3 | Source: https://c.example/story]"));
}

#[tokio::test]
async fn test_generation_failure_keeps_sources() {
    let crawler = MapCrawler::default()
        .text(A, &article("the election"))
        .text(B, &article("the election results"))
        .build();
    let p = pipeline(
        StaticSearch::with_urls(&[A, B]),
        crawler,
        TestEmbedder::working(),
        RecordingLlm::failing("backend unreachable"),
    );

    let answer = p.run("election results").await;
    assert_eq!(answer.status, AnswerStatus::GenerationFailed);
    assert!(answer.text.contains("LLM Generation Error"));
    assert!(answer.text.contains("backend unreachable"));

    let mut sources = answer.sources.clone();
    sources.sort();
    assert_eq!(sources, vec![A.to_string(), B.to_string()]);
}

#[tokio::test]
async fn test_duplicate_urls_fetched_once() {
    let crawler = MapCrawler::default()
        .text(A, &article("storms"))
        .text(B, &article("storms"))
        .text(C, &article("storms"))
        .build();
    let search = StaticSearch::with_urls(&[A, B, A, C]);
    let discovery = Discovery::new(search, UrlFilter::default(), 5);

    let ranked = discovery.discover("storms").await;
    let urls: Vec<_> = ranked.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![A, B, C]);
    assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

    let documents = Acquisition::new(crawler, Duration::from_secs(1))
        .acquire(&ranked)
        .await;
    assert_eq!(documents.len(), 3);
}

#[tokio::test]
async fn test_backend_self_links_dropped() {
    let search = StaticSearch::with_urls(&["http://search.local/search?q=next", A]);
    let ranked = Discovery::new(search, UrlFilter::default(), 5)
        .discover("q")
        .await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].url, A);
    assert_eq!(ranked[0].rank, 1);
}

#[tokio::test]
async fn test_slow_page_does_not_block_others() {
    let crawler = MapCrawler::default()
        .page(A, Page::Slow(Duration::from_secs(30), article("slow")))
        .text(B, &article("fast"))
        .text(C, &article("fast too"))
        .build();

    let started = Instant::now();
    let documents = Acquisition::new(crawler, Duration::from_millis(100))
        .acquire(&[
            crate::RankedUrl::new(A, 1),
            crate::RankedUrl::new(B, 2),
            crate::RankedUrl::new(C, 3),
        ])
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].url, B);
    assert_eq!(documents[0].rank, 2);
    assert_eq!(documents[1].url, C);
    assert_eq!(documents[1].rank, 3);
}

#[tokio::test]
async fn test_fetches_run_concurrently() {
    let delay = Duration::from_millis(300);
    let crawler = MapCrawler::default()
        .page(A, Page::Slow(delay, article("one")))
        .page(B, Page::Slow(delay, article("two")))
        .page(C, Page::Slow(delay, article("three")))
        .page("https://d.example/", Page::Slow(delay, article("four")))
        .build();

    let urls = [A, B, C, "https://d.example/"];
    let ranked: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, u)| crate::RankedUrl::new(*u, i + 1))
        .collect();

    let started = Instant::now();
    let documents = Acquisition::new(crawler, Duration::from_secs(5))
        .acquire(&ranked)
        .await;

    assert_eq!(documents.len(), 4);
    assert!(started.elapsed() < delay * 3);
}

#[tokio::test]
async fn test_slow_page_timeout_in_full_run() {
    let crawler = MapCrawler::default()
        .page(A, Page::Slow(Duration::from_secs(30), article("weather")))
        .text(B, &article("weather forecast"))
        .build();
    let p = pipeline_with_timeout(
        StaticSearch::with_urls(&[A, B]),
        crawler,
        TestEmbedder::working(),
        RecordingLlm::replying("Sunny."),
        Duration::from_millis(100),
    );

    let answer = p.run("weather forecast").await;
    assert_eq!(answer.status, AnswerStatus::Answered);
    assert_eq!(answer.sources, vec![B.to_string()]);
}
