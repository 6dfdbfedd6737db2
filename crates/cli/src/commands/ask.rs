//! Ask command handler.
//!
//! Runs the full pipeline for one question and prints the answer with its
//! numbered sources.

use anyhow::Context;
use clap::Args;
use freshquery_core::config::AppConfig;
use freshquery_rag::{Answer, Pipeline};

/// Answer a question from live web results
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of chunks retrieved for the prompt
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, mut config: AppConfig) -> anyhow::Result<()> {
        let query = self.query.join(" ");
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        if let Some(top_k) = self.top_k {
            config.generation.top_k = top_k;
        }

        let pipeline = Pipeline::from_config(&config).context("Failed to set up pipeline")?;
        let answer = pipeline.run(&query).await;

        if self.json {
            let json =
                serde_json::to_string_pretty(&answer).context("Failed to serialize answer")?;
            println!("{}", json);
        } else {
            print!("{}", render_answer(&answer));
        }

        Ok(())
    }
}

/// Plain-text rendering: answer, then a numbered source list when present.
fn render_answer(answer: &Answer) -> String {
    let mut output = format!("{}\n", answer.text);

    if !answer.sources.is_empty() {
        output.push_str("\nSources:\n");
        for (i, source) in answer.sources.iter().enumerate() {
            output.push_str(&format!("  [{}] {}\n", i + 1, source));
        }
    }

    output
}
