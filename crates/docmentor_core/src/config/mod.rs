use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chunker::{DEFAULT_MAX_LENGTH, DEFAULT_OVERLAP};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocMentorConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./docmentor-data")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,
    #[serde(default = "default_generate_timeout_secs")]
    pub generate_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            embed_timeout_secs: default_embed_timeout_secs(),
            generate_timeout_secs: default_generate_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_embed_model() -> String {
    "all-minilm".to_string()
}
fn default_embed_timeout_secs() -> u64 {
    10
}
fn default_generate_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}
fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

/// Distance used by the embedding store. Larger always means less similar.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared euclidean distance.
    #[default]
    L2,
    /// `1 - cosine_similarity`.
    Cosine,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Best-match distances above this value count as "no good match".
    /// Empirical, and only meaningful for the embedding model + metric it was tuned on.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    #[serde(default)]
    pub metric: DistanceMetric,
    #[serde(default = "default_suggest_sample")]
    pub suggest_sample: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            metric: DistanceMetric::default(),
            suggest_sample: default_suggest_sample(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_relevance_threshold() -> f32 {
    0.85
}
fn default_suggest_sample() -> usize {
    5
}

impl DocMentorConfig {
    pub fn store_path(&self) -> PathBuf {
        self.storage.data_dir.join("embeddings.sqlite")
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.storage.data_dir.join("glossary.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage.data_dir.join("query_history.json")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.storage.data_dir.join("exports")
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: &str| AppError::new("CONFIG_INVALID", msg.to_string());

        if self.chunking.max_length == 0 {
            return Err(invalid("chunking.max_length must be > 0"));
        }
        if self.retrieval.top_k == 0 {
            return Err(invalid("retrieval.top_k must be >= 1"));
        }
        if self.retrieval.suggest_sample == 0 {
            return Err(invalid("retrieval.suggest_sample must be >= 1"));
        }
        let t = self.retrieval.relevance_threshold;
        if !t.is_finite() || t < 0.0 {
            return Err(invalid("retrieval.relevance_threshold must be a finite value >= 0")
                .with_details(format!("relevance_threshold={t}")));
        }
        if self.ollama.embed_timeout_secs == 0 || self.ollama.generate_timeout_secs == 0 {
            return Err(invalid("ollama timeouts must be > 0"));
        }
        if self.ollama.embed_model.trim().is_empty() {
            return Err(invalid("ollama.embed_model must not be empty"));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<DocMentorConfig, AppError> {
    let config: DocMentorConfig = toml::from_str(content).map_err(|e| {
        AppError::new("CONFIG_INVALID", "Failed to parse config file").with_details(e.to_string())
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<DocMentorConfig, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::new("CONFIG_INVALID", "Failed to read config file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    parse_config(&content)
}
