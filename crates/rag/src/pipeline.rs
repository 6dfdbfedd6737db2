//! End-to-end orchestration of one query.

use crate::acquisition::{Acquisition, HttpCrawler};
use crate::chunker::Indexer;
use crate::discovery::Discovery;
use crate::embeddings::create_provider;
use crate::synthesizer::{SynthesisSettings, Synthesizer};
use crate::types::Answer;
use freshquery_core::{AppConfig, AppResult};
use freshquery_prompt::resolve_prompt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// The four pipeline stages, run strictly in order for every query.
///
/// Shared collaborators (embedding provider, LLM client) are built once and
/// read concurrently; everything produced during a run is owned by that run.
pub struct Pipeline {
    discovery: Discovery,
    acquisition: Acquisition,
    indexer: Indexer,
    synthesizer: Synthesizer,
}

impl Pipeline {
    pub fn new(
        discovery: Discovery,
        acquisition: Acquisition,
        indexer: Indexer,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            discovery,
            acquisition,
            indexer,
            synthesizer,
        }
    }

    /// Build a pipeline backed by the HTTP collaborators named in `config`.
    ///
    /// # Example
    /// ```no_run
    /// use freshquery_core::AppConfig;
    /// use freshquery_rag::Pipeline;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = AppConfig::load()?;
    /// let pipeline = Pipeline::from_config(&config)?;
    /// let (answer, sources) = pipeline.run_pair("Who won the match last night?").await;
    /// println!("{}\n{:?}", answer, sources);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let discovery = Discovery::from_config(&config.search)?;

        let crawler = Arc::new(HttpCrawler::new(&config.crawl)?);
        let acquisition = Acquisition::new(crawler, Duration::from_secs(config.crawl.timeout_secs));

        let embedder = create_provider(&config.embedding)?;
        let indexer = Indexer::new(Arc::clone(&embedder), config.index.clone());

        let llm = freshquery_llm::create_client(
            &config.generation.provider,
            Some(config.generation.endpoint.as_str()),
        )?;
        let prompt = resolve_prompt(
            &config.prompts_dir(),
            &config.generation.prompt_id,
            config.generation.prompt_file.as_deref(),
        )?;
        let synthesizer = Synthesizer::new(
            embedder,
            llm,
            prompt,
            SynthesisSettings::from(&config.generation),
        );

        tracing::debug!(
            search = %config.search.endpoint,
            embedding = %config.embedding.provider,
            model = %config.generation.model,
            "Pipeline ready"
        );

        Ok(Self::new(discovery, acquisition, indexer, synthesizer))
    }

    /// Answer a query from live web content.
    ///
    /// Always returns a well-formed answer; every stage failure maps to an
    /// answer status.
    pub async fn run(&self, query: &str) -> Answer {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id);

        async {
            tracing::info!(query, "Starting pipeline run");
            let answer = self.run_stages(query).await;
            tracing::info!(
                status = %answer.status,
                sources = answer.sources.len(),
                "Pipeline run finished"
            );
            answer
        }
        .instrument(span)
        .await
    }

    /// Same as [`Pipeline::run`], returning `(answer_text, sources)`.
    pub async fn run_pair(&self, query: &str) -> (String, Vec<String>) {
        self.run(query).await.into_pair()
    }

    async fn run_stages(&self, query: &str) -> Answer {
        let urls = self.discovery.discover(query).await;
        if urls.is_empty() {
            return Answer::no_results();
        }

        let documents = self.acquisition.acquire(&urls).await;
        if documents.is_empty() {
            return Answer::unreadable();
        }

        let index = match self.indexer.build_index(&documents).await {
            Ok(Some(index)) => index,
            Ok(None) => return Answer::not_enough_text(),
            Err(e) => {
                tracing::warn!("Index build failed: {}", e);
                return Answer::embedding_failed(format!(
                    "I could not embed the live results: {}",
                    e
                ));
            }
        };

        self.synthesizer.answer(query, &index).await
    }
}
