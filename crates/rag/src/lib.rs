//! Live-web retrieval-augmented answering.
//!
//! A query runs through four stages, each owned by one module:
//! - [`discovery`]: search backend to ranked, deduplicated URLs
//! - [`acquisition`]: concurrent page fetches to readable documents
//! - [`chunker`]: overlapping chunks, embedded into a per-query [`index::FlatIndex`]
//! - [`synthesizer`]: nearest chunks plus the consensus prompt to an answer
//!
//! [`Pipeline`] wires them together. Nothing is kept between queries.

pub mod acquisition;
pub mod chunker;
pub mod content;
pub mod discovery;
pub mod embeddings;
pub mod index;
pub mod pipeline;
pub mod synthesizer;
pub mod types;

#[cfg(test)]
mod tests;

pub use acquisition::{Acquisition, Crawler, HttpCrawler};
pub use chunker::{chunk_document, Indexer};
pub use discovery::{Discovery, HttpSearchBackend, SearchBackend, SearchResponse, UrlFilter};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::FlatIndex;
pub use pipeline::Pipeline;
pub use synthesizer::{SynthesisSettings, Synthesizer};
pub use types::{Answer, AnswerStatus, Chunk, Document, RankedUrl};
