//! Embedding provider trait and factory.

use freshquery_core::config::EmbeddingConfig;
use freshquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// One provider is created per process and shared read-only between the
/// indexer (chunk texts) and the synthesizer (query text), so both live in
/// the same vector space.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Generate embeddings for multiple texts in one call, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    tracing::debug!(
        provider = %config.provider,
        model = %config.model,
        "Creating embedding provider"
    );

    match config.provider.as_str() {
        "ollama" => {
            let provider = super::providers::OllamaEmbeddingProvider::new(config)?;
            Ok(Arc::new(provider))
        }

        "trigram" => {
            let provider = super::providers::TrigramProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            config.provider
        ))),
    }
}
