//! Configuration loading
//!
//! Figment merges three sources, later overriding earlier: built-in
//! defaults, a `cortex.toml` at the project root, and `CORTEX_*`
//! environment variables (underscore-separated nesting, e.g.
//! `CORTEX_EMBEDDING_ENDPOINT`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use cortex_domain::constants::{
    DOC_CHUNK_OVERLAP_BYTES, DOC_CHUNK_TARGET_BYTES, EMBEDDING_BATCH_MAX_BYTES,
    EMBEDDING_BATCH_MAX_TEXTS, EMBEDDING_DIMENSION, EMBEDDING_MAX_CONCURRENCY,
    INDEXING_FAILURE_TOLERANCE, INDEXING_WORKERS, WATCH_DEBOUNCE_MS,
};
use cortex_domain::error::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "CORTEX";

/// Default configuration file name at the project root
pub const CONFIG_FILE_NAME: &str = "cortex.toml";

/// Discovery patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Globs classified as code
    pub code_patterns: Vec<String>,
    /// Globs classified as docs
    pub docs_patterns: Vec<String>,
    /// Globs excluded from traversal entirely
    pub ignore_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let code = [
            "**/*.go", "**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx", "**/*.py", "**/*.rs",
            "**/*.c", "**/*.h", "**/*.cpp", "**/*.cc", "**/*.hpp", "**/*.java", "**/*.php",
            "**/*.rb",
        ];
        let docs = ["**/*.md", "**/*.markdown", "**/*.rst"];
        let ignore = [
            "**/.git/**",
            "**/node_modules/**",
            "**/target/**",
            "**/__pycache__/**",
            "**/vendor/**",
            "**/dist/**",
            "**/build/**",
            "**/.venv/**",
        ];
        Self {
            code_patterns: code.iter().map(|s| s.to_string()).collect(),
            docs_patterns: docs.iter().map(|s| s.to_string()).collect(),
            ignore_patterns: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Embedding service connection and batching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service
    pub endpoint: String,
    /// Vector dimensionality the store is created with
    pub dimension: usize,
    /// Maximum texts per request
    pub batch_max_texts: usize,
    /// Maximum payload bytes per request
    pub batch_max_bytes: usize,
    /// In-flight request cap
    pub concurrency: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8765".to_string(),
            dimension: EMBEDDING_DIMENSION,
            batch_max_texts: EMBEDDING_BATCH_MAX_TEXTS,
            batch_max_bytes: EMBEDDING_BATCH_MAX_BYTES,
            concurrency: EMBEDDING_MAX_CONCURRENCY,
        }
    }
}

/// Indexer worker tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Parallel file workers
    pub workers: usize,
    /// Tolerated fraction of per-file failures
    pub failure_tolerance: f64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: INDEXING_WORKERS,
            failure_tolerance: INDEXING_FAILURE_TOLERANCE,
        }
    }
}

/// Doc chunk window geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Target chunk size in bytes
    pub target_bytes: usize,
    /// Overlap carried between consecutive chunks
    pub overlap_bytes: usize,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            target_bytes: DOC_CHUNK_TARGET_BYTES,
            overlap_bytes: DOC_CHUNK_OVERLAP_BYTES,
        }
    }
}

/// Watcher tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: WATCH_DEBOUNCE_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `CORTEX_LOG` is unset
    pub level: String,
    /// Emit JSON instead of text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Root configuration type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Use an explicit configuration file
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration for a project root, merging defaults, the
    /// project's `cortex.toml` (when present), and environment overrides
    pub fn load(&self, project_root: &Path) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let config_path = self
            .config_path
            .clone()
            .unwrap_or_else(|| project_root.join(CONFIG_FILE_NAME));
        if config_path.exists() {
            figment = figment.merge(Toml::file(&config_path));
            tracing::debug!(path = %config_path.display(), "loaded configuration file");
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        figment
            .extract()
            .map_err(|e| Error::config(format!("failed to load configuration: {e}")))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new().load(dir.path()).unwrap();
        assert_eq!(config.embedding.dimension, EMBEDDING_DIMENSION);
        assert!(config.discovery.code_patterns.iter().any(|p| p == "**/*.go"));
        assert_eq!(config.watch.debounce_ms, WATCH_DEBOUNCE_MS);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[embedding]\ndimension = 768\n\n[watch]\ndebounce_ms = 250\n",
        )
        .unwrap();
        let config = ConfigLoader::new().load(dir.path()).unwrap();
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.watch.debounce_ms, 250);
        // Untouched sections keep their defaults
        assert_eq!(config.indexing.workers, INDEXING_WORKERS);
    }
}
