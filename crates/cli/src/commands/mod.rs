//! Command handlers for the FreshQuery CLI.

pub mod ask;
pub mod crawl;
pub mod search;

pub use ask::AskCommand;
pub use crawl::CrawlCommand;
pub use search::SearchCommand;
