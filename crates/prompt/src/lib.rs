//! Prompt system for FreshQuery.
//!
//! This crate provides structured prompt management with:
//! - A built-in consensus-and-recency answering prompt
//! - YAML-based prompt definition overrides
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{consensus_prompt, CONSENSUS_PROMPT_ID};
pub use loader::{load_prompt, load_prompt_file, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
