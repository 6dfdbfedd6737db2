//! FreshQuery CLI
//!
//! Main entry point for the freshquery command-line tool.
//! Answers questions from live web content with source attribution.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, CrawlCommand, SearchCommand};
use freshquery_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// FreshQuery - answers grounded in live web results
#[derive(Parser, Debug)]
#[command(name = "freshquery")]
#[command(about = "Answer questions from live web content", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FRESHQUERY_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FRESHQUERY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generation model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Search backend endpoint
    #[arg(long, global = true)]
    search_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from live web results
    Ask(AskCommand),

    /// Show the ranked URLs discovery finds for a query
    Search(SearchCommand),

    /// Fetch one page and show the extracted text
    Crawl(CrawlCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Defaults < config file < environment
    let config = AppConfig::load_from(cli.workspace, cli.config)
        .context("Failed to load configuration")?;

    // < command-line flags
    let config = config.with_overrides(
        cli.model,
        cli.search_url,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)
        .context("Failed to initialize logging")?;

    tracing::info!("FreshQuery CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Search endpoint: {}", config.search.endpoint);
    tracing::debug!("Model: {}", config.generation.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Crawl(_) => "crawl",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Crawl(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
