//! Crawl command handler.
//!
//! Fetches a single page the same way the pipeline does, useful for checking
//! that a site can be read at all.

use anyhow::Context;
use clap::Args;
use freshquery_core::config::AppConfig;
use freshquery_rag::{Crawler, HttpCrawler};
use std::time::Duration;

/// Fetch one page and show the extracted text
#[derive(Args, Debug)]
pub struct CrawlCommand {
    /// URL to fetch
    pub url: String,

    /// Number of characters of extracted text to show
    #[arg(long, default_value_t = 100)]
    pub chars: usize,
}

impl CrawlCommand {
    /// Execute the crawl command.
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing crawl command");

        let crawler = HttpCrawler::new(&config.crawl).context("Failed to create crawler")?;
        let timeout = Duration::from_secs(config.crawl.timeout_secs);

        let result = match tokio::time::timeout(timeout, crawler.fetch(&self.url)).await {
            Ok(result) => result,
            Err(_) => {
                println!("Success: false");
                println!("Error: timed out after {}s", timeout.as_secs());
                return Ok(());
            }
        };

        match result {
            Ok(text) if !text.is_empty() => {
                println!("Success: true");
                println!("Characters: {}", text.chars().count());
                println!("{}", snippet(&text, self.chars));
            }
            Ok(_) => {
                println!("Success: false");
                println!("Error: no readable text");
            }
            Err(e) => {
                println!("Success: false");
                println!("Error: {}", e);
            }
        }

        Ok(())
    }
}

fn snippet(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}
