//! Search command handler.

use anyhow::Context;
use clap::Args;
use freshquery_core::config::AppConfig;
use freshquery_rag::Discovery;

/// Show the ranked URLs discovery finds for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    /// Execute the search command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let query = self.query.join(" ");
        tracing::info!("Executing search command");

        let discovery =
            Discovery::from_config(&config.search).context("Failed to create search backend")?;

        let ranked = discovery.discover(&query).await;

        if self.json {
            let json = serde_json::to_string_pretty(&ranked).context("Failed to serialize URLs")?;
            println!("{}", json);
        } else if ranked.is_empty() {
            println!("No results.");
        } else {
            for url in &ranked {
                println!("#{} {}", url.rank, url.url);
            }
        }

        Ok(())
    }
}
