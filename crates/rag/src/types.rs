//! Per-query data types flowing through the pipeline.
//!
//! Nothing here outlives a single `Pipeline::run` call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer text used when discovery produced no candidate URLs.
pub const NO_RESULTS_MESSAGE: &str = "I couldn't find any relevant web links.";

/// Answer text used when every candidate page failed or was empty.
pub const UNREADABLE_MESSAGE: &str =
    "I found links but was unable to read their current content.";

/// Answer text used when no chunk survived filtering.
pub const NOT_ENOUGH_TEXT_MESSAGE: &str = "No usable text was extracted from the live results.";

/// Prefix of every answer produced by a failed generation call.
pub const GENERATION_ERROR_PREFIX: &str = "LLM Generation Error:";

/// A candidate URL with its 1-based discovery position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedUrl {
    pub url: String,
    pub rank: usize,
}

impl RankedUrl {
    pub fn new(url: impl Into<String>, rank: usize) -> Self {
        Self {
            url: url.into(),
            rank,
        }
    }
}

/// Extracted text of one successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub url: String,
    pub text: String,
    pub rank: usize,
}

/// A bounded window of one document's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed window text
    pub text: String,

    /// URL of the originating document
    pub source_url: String,

    /// Discovery rank of the originating document
    pub rank: usize,

    /// Character offset of the chunk's first character within the document
    pub offset: usize,
}

/// Which pipeline outcome produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    NoResults,
    Unreadable,
    NotEnoughText,
    EmbeddingFailed,
    GenerationFailed,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Answered => "answered",
            AnswerStatus::NoResults => "no_results",
            AnswerStatus::Unreadable => "unreadable",
            AnswerStatus::NotEnoughText => "not_enough_text",
            AnswerStatus::EmbeddingFailed => "embedding_failed",
            AnswerStatus::GenerationFailed => "generation_failed",
        }
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of one pipeline run.
///
/// `sources` lists the distinct URLs whose chunks made it into the prompt,
/// in the order they were first retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "answer")]
    pub text: String,
    pub sources: Vec<String>,
    pub status: AnswerStatus,
}

impl Answer {
    /// A generated answer with its grounding sources.
    pub fn answered(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            text: text.into(),
            sources,
            status: AnswerStatus::Answered,
        }
    }

    /// Discovery found nothing.
    pub fn no_results() -> Self {
        Self::empty(NO_RESULTS_MESSAGE, AnswerStatus::NoResults)
    }

    /// URLs were found but none could be read.
    pub fn unreadable() -> Self {
        Self::empty(UNREADABLE_MESSAGE, AnswerStatus::Unreadable)
    }

    /// Pages were read but produced no usable chunk.
    pub fn not_enough_text() -> Self {
        Self::empty(NOT_ENOUGH_TEXT_MESSAGE, AnswerStatus::NotEnoughText)
    }

    /// Embedding the live results or the question failed.
    pub fn embedding_failed(message: impl Into<String>) -> Self {
        Self::empty(message, AnswerStatus::EmbeddingFailed)
    }

    /// Generation failed; the already computed sources are kept.
    pub fn generation_failed(error: impl fmt::Display, sources: Vec<String>) -> Self {
        Self {
            text: format!("{} {}", GENERATION_ERROR_PREFIX, error),
            sources,
            status: AnswerStatus::GenerationFailed,
        }
    }

    /// Split into the `(answer_text, sources)` pair.
    pub fn into_pair(self) -> (String, Vec<String>) {
        (self.text, self.sources)
    }

    fn empty(text: impl Into<String>, status: AnswerStatus) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
            status,
        }
    }
}
