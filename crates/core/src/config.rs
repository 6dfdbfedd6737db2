//! Configuration management for FreshQuery.
//!
//! Configuration is assembled from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.freshquery/config.yaml` in the workspace, or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! Nothing here is persisted by the pipeline; the config file is read-only input.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers understood by the embedding and generation factories.
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];
const KNOWN_GENERATION_PROVIDERS: [&str; 1] = ["ollama"];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.freshquery/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Discovery settings
    pub search: SearchConfig,

    /// Acquisition settings
    pub crawl: CrawlConfig,

    /// Chunking settings
    pub index: IndexConfig,

    /// Embedding backend settings
    pub embedding: EmbeddingConfig,

    /// Generation backend and retrieval settings
    pub generation: GenerationConfig,
}

/// Search backend configuration used by discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// Search endpoint accepting `?q=<query>&format=json`
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Number of URLs kept after filtering and dedup
    pub max_results: usize,

    /// User-Agent sent to the search backend
    pub user_agent: String,

    /// When non-empty, a URL must contain at least one of these substrings
    pub allow_patterns: Vec<String>,

    /// URLs containing any of these substrings are dropped
    pub deny_patterns: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/search".to_string(),
            timeout_secs: 20,
            max_results: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_patterns: Vec::new(),
            deny_patterns: vec!["google.".to_string(), "whoogle".to_string()],
        }
    }
}

/// Page acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CrawlConfig {
    /// Per-page timeout in seconds
    pub timeout_secs: u64,

    /// Maximum characters of extracted text kept per page
    pub max_chars: usize,

    /// User-Agent sent when fetching pages
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_chars: 100_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Sliding-window chunking configuration (all values in characters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexConfig {
    /// Window size
    pub window: usize,

    /// Distance between consecutive window starts
    pub stride: usize,

    /// Chunks whose trimmed length is not above this are dropped
    pub min_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            window: 500,
            stride: 450,
            min_chars: 100,
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Provider endpoint (ollama only)
    pub endpoint: String,

    /// Vector dimensions (used by providers that do not report their own)
    pub dimensions: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            dimensions: 384,
            timeout_secs: 60,
        }
    }
}

/// Generation backend and retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Provider name
    pub provider: String,

    /// Provider endpoint
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Context window passed to the backend (tokens)
    pub context_window: u32,

    /// Number of nearest chunks retrieved for the prompt
    pub top_k: usize,

    /// Generation timeout in seconds
    pub timeout_secs: u64,

    /// Prompt definition id
    pub prompt_id: String,

    /// Explicit prompt definition file (overrides `prompt_id` lookup)
    pub prompt_file: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            model: "mistral:7b-instruct".to_string(),
            temperature: 0.0,
            context_window: 2048,
            top_k: 5,
            timeout_secs: 120,
            prompt_id: "freshquery.answer.consensus".to_string(),
            prompt_file: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    search: Option<SearchConfig>,
    crawl: Option<CrawlConfig>,
    index: Option<IndexConfig>,
    embedding: Option<EmbeddingConfig>,
    generation: Option<GenerationConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            search: SearchConfig::default(),
            crawl: CrawlConfig::default(),
            index: IndexConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment and the default config file.
    ///
    /// Environment variables:
    /// - `FRESHQUERY_WORKSPACE`: Override workspace path
    /// - `FRESHQUERY_CONFIG`: Path to config file
    /// - `FRESHQUERY_SEARCH_URL`: Search backend endpoint
    /// - `FRESHQUERY_MODEL`: Generation model
    /// - `FRESHQUERY_EMBEDDING_MODEL`: Embedding model
    /// - `OLLAMA_URL`: Endpoint for both Ollama backends
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use freshquery_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Search endpoint: {}", config.search.endpoint);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit arguments take precedence over `FRESHQUERY_WORKSPACE` and
    /// `FRESHQUERY_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("FRESHQUERY_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("FRESHQUERY_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!("Config file not found: {:?}", cf)));
                }
                cf.clone()
            }
            None => config.config_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        config.apply_env();

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merged config file {:?}", path);

        let mut result = self.clone();

        if let Some(search) = config_file.search {
            result.search = search;
        }
        if let Some(crawl) = config_file.crawl {
            result.crawl = crawl;
        }
        if let Some(index) = config_file.index {
            result.index = index;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("FRESHQUERY_SEARCH_URL") {
            self.search.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("FRESHQUERY_MODEL") {
            self.generation.model = model;
        }

        if let Ok(model) = std::env::var("FRESHQUERY_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.embedding.endpoint = url.clone();
            self.generation.endpoint = url;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over everything else.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        search_url: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = model {
            self.generation.model = model;
        }

        if let Some(search_url) = search_url {
            self.search.endpoint = search_url;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the `.freshquery` directory.
    pub fn config_dir(&self) -> PathBuf {
        self.workspace.join(".freshquery")
    }

    /// Get the directory holding prompt definition overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.config_dir().join("prompts")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.search.endpoint.trim().is_empty() {
            return Err(AppError::Config("search endpoint cannot be empty".to_string()));
        }
        if self.search.max_results == 0 {
            return Err(AppError::Config(
                "search.maxResults must be greater than 0".to_string(),
            ));
        }
        if self.search.timeout_secs == 0
            || self.crawl.timeout_secs == 0
            || self.embedding.timeout_secs == 0
            || self.generation.timeout_secs == 0
        {
            return Err(AppError::Config(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        if self.crawl.max_chars == 0 {
            return Err(AppError::Config(
                "crawl.maxChars must be greater than 0".to_string(),
            ));
        }

        let index = &self.index;
        if index.stride == 0 || index.stride > index.window {
            return Err(AppError::Config(format!(
                "index.stride must be in 1..={} (got {})",
                index.window, index.stride
            )));
        }
        if index.min_chars >= index.window {
            return Err(AppError::Config(format!(
                "index.minChars ({}) must be below index.window ({})",
                index.min_chars, index.window
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }
        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }

        if !KNOWN_GENERATION_PROVIDERS.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generation provider: {}. Supported: {}",
                self.generation.provider,
                KNOWN_GENERATION_PROVIDERS.join(", ")
            )));
        }
        if self.generation.top_k == 0 {
            return Err(AppError::Config(
                "generation.topK must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}
