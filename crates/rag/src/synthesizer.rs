//! Retrieval and consensus-aware answer generation.

use crate::embeddings::EmbeddingProvider;
use crate::index::{FlatIndex, Neighbor};
use crate::types::{Answer, Chunk};
use freshquery_core::config::GenerationConfig;
use freshquery_core::{AppError, AppResult};
use freshquery_llm::{LlmClient, LlmRequest};
use freshquery_prompt::{build_prompt, PromptDefinition};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Separator placed between annotated chunks in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Format of the date handed to the prompt.
const DATE_FORMAT: &str = "%A, %B %d, %Y %H:%M";

/// Generation settings taken from configuration.
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub model: String,
    pub temperature: f32,
    pub context_window: u32,
    pub top_k: usize,
    pub timeout: Duration,
}

impl From<&GenerationConfig> for SynthesisSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            context_window: config.context_window,
            top_k: config.top_k,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Synthesizer stage: index plus query to answer.
pub struct Synthesizer {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    settings: SynthesisSettings,
}

impl Synthesizer {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            embedder,
            llm,
            prompt,
            settings,
        }
    }

    /// Retrieve the nearest chunks and generate an answer from them.
    ///
    /// Never fails: embedding and generation errors become answers with the
    /// matching status.
    pub async fn answer(&self, query: &str, index: &FlatIndex) -> Answer {
        let neighbors = match self.retrieve(query, index).await {
            Ok(neighbors) => neighbors,
            Err(e) => {
                tracing::warn!("Retrieval failed: {}", e);
                return Answer::embedding_failed(format!("I could not embed the question: {}", e));
            }
        };

        let chunks: Vec<&Chunk> = neighbors.iter().map(|n| n.chunk).collect();
        let context = build_context(&chunks);
        let sources = unique_sources(&chunks);

        tracing::info!(
            retrieved = chunks.len(),
            sources = sources.len(),
            "Retrieved context"
        );

        match self.generate(query, &context).await {
            Ok(text) => Answer::answered(text, sources),
            Err(e) => {
                tracing::warn!("Generation failed: {}", e);
                Answer::generation_failed(e, sources)
            }
        }
    }

    async fn retrieve<'a>(&self, query: &str, index: &'a FlatIndex) -> AppResult<Vec<Neighbor<'a>>> {
        let query_embedding = self.embedder.embed(query).await?;
        index.search(&query_embedding, self.settings.top_k)
    }

    async fn generate(&self, query: &str, context: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("context".to_string(), context.to_string());
        variables.insert("currentDate".to_string(), current_date());

        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, self.settings.model.clone())
            .with_temperature(self.settings.temperature)
            .with_context_window(self.settings.context_window);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            model = %self.settings.model,
            provider = self.llm.provider_name(),
            prompt_len = request.prompt.len(),
            "Generating answer"
        );

        let response = tokio::time::timeout(self.settings.timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                AppError::Llm(format!(
                    "Generation timed out after {}s",
                    self.settings.timeout.as_secs()
                ))
            })??;

        Ok(response.content.trim().to_string())
    }
}

/// Annotate each chunk with its rank and source, joined by the separator.
pub fn build_context(chunks: &[&Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "[Search Rank: #{} | Source: {}]\n{}",
                chunk.rank, chunk.source_url, chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Distinct source URLs in the order they were first retrieved.
pub fn unique_sources(chunks: &[&Chunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(|chunk| chunk.source_url.clone())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Local date and time, computed on every call.
fn current_date() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
