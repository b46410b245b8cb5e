//! Configuration management for the LTIPP assistant.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.ltipp/config.yaml` in the workspace, or `LTIPP_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Relative paths in the config file are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers understood by the knowledge crate.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .ltipp/ and the catalog data)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub catalog: CatalogSettings,
    pub retrieval: RetrievalSettings,
    pub server: ServerSettings,
}

/// Language model endpoint and the two models the pipeline talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Ollama base URL
    pub endpoint: String,

    /// Model used to pick catalog keys out of a question
    pub extraction_model: String,

    /// Model used to write the final answer
    pub answer_model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            extraction_model: "llama3".to_string(),
            answer_model: "llama3:70b".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout_secs: 30,
        }
    }
}

/// Where the entity catalog lives and the reference document always included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogSettings {
    /// JSON object mapping entity key to a list of source URLs
    pub map_path: PathBuf,

    /// Newline-separated list of valid entity keys
    pub keys_path: PathBuf,

    /// URL appended to every resolved URL set
    pub reference_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("data/ltipp.json"),
            keys_path: PathBuf::from("data/ltipp_keys"),
            reference_url:
                "https://www.openblocklabs.com/research/arbitrum-ltipp-efficacy-analysis"
                    .to_string(),
        }
    }
}

/// Corpus building and retrieval knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalSettings {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks of one document
    pub chunk_overlap: usize,

    /// Number of chunks handed to the answer model
    pub top_k: usize,

    /// Fuzzy scores at or below this value count as "no match" (0-100 scale)
    pub fuzzy_floor: u8,

    /// Maximum number of documents fetched at once
    pub fetch_concurrency: usize,

    /// Per-document fetch timeout in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
            top_k: 20,
            fuzzy_floor: 0,
            fetch_concurrency: 4,
            fetch_timeout_secs: 30,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    /// Address to bind (host:port)
    pub bind: String,

    /// Directory holding pre-generated `report{n}.txt` files
    pub report_cache_dir: PathBuf,

    /// Number of cached reports (`report0.txt` .. `report{count-1}.txt`)
    pub report_count: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8086".to_string(),
            report_cache_dir: PathBuf::from("reports_cache"),
            report_count: 5,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSettings>,
    embedding: Option<EmbeddingSettings>,
    catalog: Option<CatalogSettings>,
    retrieval: Option<RetrievalSettings>,
    server: Option<ServerSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            json_logs: false,
            llm: LlmSettings::default(),
            embedding: EmbeddingSettings::default(),
            catalog: CatalogSettings::default(),
            retrieval: RetrievalSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `LTIPP_WORKSPACE`: Override workspace path
    /// - `LTIPP_CONFIG`: Path to config file
    /// - `OLLAMA_URL`: Ollama base URL
    /// - `LTIPP_EXTRACTION_MODEL`: Model for key extraction
    /// - `LTIPP_ANSWER_MODEL`: Model for answer synthesis
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ltipp_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Catalog: {:?}", config.catalog_map_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        let workspace = std::env::var("LTIPP_WORKSPACE").ok().map(PathBuf::from);
        let config_file = std::env::var("LTIPP_CONFIG").ok().map(PathBuf::from);

        Self::load_from(workspace, config_file)
    }

    /// Like [`load`](Self::load), with the workspace and config file chosen by the caller.
    pub fn load_from(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
    ) -> AppResult<Self> {
        let mut config = Self::from_workspace(workspace, config_file)?;

        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            config.llm.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("LTIPP_EXTRACTION_MODEL") {
            config.llm.extraction_model = model;
        }

        if let Ok(model) = std::env::var("LTIPP_ANSWER_MODEL") {
            config.llm.answer_model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Build a configuration for a workspace, merging its config file when present.
    pub fn from_workspace(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
    ) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.ltipp_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(catalog) = config_file.catalog {
            result.catalog = catalog;
        }
        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }
        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.json_logs = json;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the config file and environment variables.
    ///
    /// Workspace and config file are set by [`load_from`](Self::load_from).
    pub fn with_overrides(
        mut self,
        extraction_model: Option<String>,
        answer_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(model) = extraction_model {
            self.llm.extraction_model = model;
        }

        if let Some(model) = answer_model {
            self.llm.answer_model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .ltipp directory.
    pub fn ltipp_dir(&self) -> PathBuf {
        self.workspace.join(".ltipp")
    }

    /// Directory searched for prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.ltipp_dir().join("prompts")
    }

    /// Absolute path of the catalog map file.
    pub fn catalog_map_path(&self) -> PathBuf {
        self.resolve_path(&self.catalog.map_path)
    }

    /// Absolute path of the catalog keys file.
    pub fn catalog_keys_path(&self) -> PathBuf {
        self.resolve_path(&self.catalog.keys_path)
    }

    /// Absolute path of the report cache directory.
    pub fn report_cache_dir(&self) -> PathBuf {
        self.resolve_path(&self.server.report_cache_dir)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate value ranges that would otherwise fail deep inside a request.
    pub fn validate(&self) -> AppResult<()> {
        let retrieval = &self.retrieval;

        if retrieval.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }

        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                retrieval.chunk_overlap, retrieval.chunk_size
            )));
        }

        if retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be positive".to_string()));
        }

        if retrieval.fetch_concurrency == 0 {
            return Err(AppError::Config(
                "fetchConcurrency must be positive".to_string(),
            ));
        }

        if retrieval.fuzzy_floor > 100 {
            return Err(AppError::Config(format!(
                "fuzzyFloor must be within 0-100, got {}",
                retrieval.fuzzy_floor
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
                "embedding dimensions must be positive".to_string(),
            ));
        }

        if self.catalog.reference_url.trim().is_empty() {
            return Err(AppError::Config("referenceUrl must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.extraction_model, "llama3");
        assert_eq!(config.llm.answer_model, "llama3:70b");
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.retrieval.chunk_size, 2000);
        assert_eq!(config.retrieval.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 20);
        assert_eq!(config.retrieval.fuzzy_floor, 0);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ltipp_dir() {
        let config = AppConfig::default();
        assert!(config.ltipp_dir().ends_with(".ltipp"));
        assert!(config.prompts_dir().ends_with(".ltipp/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let workspace = config.workspace.clone();
        let overridden = config.with_overrides(
            Some("mistral".to_string()),
            Some("llama3.1:405b".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.extraction_model, "mistral");
        assert_eq!(overridden.llm.answer_model, "llama3.1:405b");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
        assert_eq!(overridden.workspace, workspace);
    }

    #[test]
    fn test_explicit_log_level_wins_over_verbose() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("warn".to_string()),
            true,
            true,
        );

        assert_eq!(overridden.log_level, Some("warn".to_string()));
        assert!(overridden.no_color);
        assert_eq!(overridden.llm.extraction_model, "llama3");
    }

    #[test]
    fn test_missing_workspace_is_error() {
        let result = AppConfig::from_workspace(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_yaml_sections_merge_with_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".ltipp")).unwrap();
        std::fs::write(
            temp.path().join(".ltipp/config.yaml"),
            r#"
llm:
  answerModel: llama3.1:405b
retrieval:
  topK: 8
  fuzzyFloor: 40
catalog:
  mapPath: catalog/map.json
logging:
  level: warn
  color: false
"#,
        )
        .unwrap();

        let config = AppConfig::from_workspace(Some(temp.path().to_path_buf()), None).unwrap();

        assert_eq!(config.llm.answer_model, "llama3.1:405b");
        assert_eq!(config.llm.extraction_model, "llama3");
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.fuzzy_floor, 40);
        assert_eq!(config.retrieval.chunk_size, 2000);
        assert_eq!(config.catalog_map_path(), temp.path().join("catalog/map.json"));
        assert_eq!(config.catalog_keys_path(), temp.path().join("data/ltipp_keys"));
        assert_eq!(config.log_level, Some("warn".to_string()));
        assert!(config.no_color);
    }

    #[test]
    fn test_explicit_missing_config_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::from_workspace(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_overlap_must_be_smaller_than_chunk() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_overlap = config.retrieval.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_embedding_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());

        config.embedding.provider = "trigram".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }
}
