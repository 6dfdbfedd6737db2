//! Sliding-window chunking and per-query index construction.

use crate::embeddings::EmbeddingProvider;
use crate::index::FlatIndex;
use crate::types::{Chunk, Document};
use freshquery_core::config::IndexConfig;
use freshquery_core::{AppError, AppResult};
use std::sync::Arc;

/// Split one document into overlapping character windows.
///
/// Windows start every `stride` characters and span `window` characters.
/// Each window is trimmed, and kept only when the trimmed text is longer than
/// `min_chars`. Offsets point at the first character kept after trimming and
/// count characters, not bytes.
pub fn chunk_document(document: &Document, config: &IndexConfig) -> Vec<Chunk> {
    let text = document.text.as_str();

    // Byte offset of every char start, plus the end of the text
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;

    if config.stride == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    for start in (0..char_len).step_by(config.stride) {
        let end = (start + config.window).min(char_len);
        let window = &text[bounds[start]..bounds[end]];
        let trimmed = window.trim();

        if trimmed.chars().count() > config.min_chars {
            let leading = window.chars().take_while(|c| c.is_whitespace()).count();
            chunks.push(Chunk {
                text: trimmed.to_string(),
                source_url: document.url.clone(),
                rank: document.rank,
                offset: start + leading,
            });
        }
    }

    chunks
}

/// Builds the ephemeral index for one query.
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
    config: IndexConfig,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: IndexConfig) -> Self {
        Self { embedder, config }
    }

    /// Chunk all documents, embed the chunks in one batch and index them.
    ///
    /// Returns `Ok(None)` when no chunk survives filtering.
    pub async fn build_index(&self, documents: &[Document]) -> AppResult<Option<FlatIndex>> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| chunk_document(doc, &self.config))
            .collect();

        tracing::info!(
            documents = documents.len(),
            chunks = chunks.len(),
            "Chunked documents"
        );

        if chunks.is_empty() {
            return Ok(None);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned {} embeddings for {} chunks",
                self.embedder.provider_name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 || embeddings.iter().any(|e| e.len() != dimension) {
            return Err(AppError::Embedding(format!(
                "Provider '{}' returned inconsistent embedding dimensions",
                self.embedder.provider_name()
            )));
        }

        FlatIndex::new(chunks, embeddings).map(Some)
    }
}
