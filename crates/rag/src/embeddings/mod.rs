//! Embedding providers shared by the indexer and the synthesizer.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
