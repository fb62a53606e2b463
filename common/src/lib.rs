/*!
common/src/lib.rs

Shared configuration types for newswire.

This file provides:
- Config data structures (deserialized from JSON)
- An async loader for the JSON config file
- Path resolution for the config file (CLI flag, `IS_CONFIG`, then `config.json`)
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "IS_CONFIG";

/// What to do with items whose `matched` list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Every item is kept; `matched` is informational only.
    #[default]
    KeepAll,
    /// Only items with at least one keyword match are kept.
    MatchedOnly,
}

/// One heuristic tagging rule: if `pattern` occurs in the lowercased
/// title + summary, the item gets `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub pattern: String,
    pub label: String,
}

/// Remote LLM config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key. Unset means no auth header.
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
}

/// Summarization service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    /// Maximum number of items (from the front of the sorted list) sent for summarization.
    pub summary_limit: Option<usize>,
    pub remote: Option<RemoteLlmConfig>,
}

/// RSS channel metadata for the generated feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: "Industrial Strategy News".to_string(),
            link: "index.html".to_string(),
            description: "Keyword-annotated industrial strategy news, refreshed each run".to_string(),
        }
    }
}

/// Top-level application configuration (deserialized from config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub rss_sources: Vec<String>,
    #[serde(default)]
    pub html_sources: Vec<String>,
    #[serde(default, alias = "enableHtmlScraping")]
    pub enable_html_scraping: bool,
    #[serde(default, alias = "filterMode")]
    pub filter_mode: FilterMode,
    /// Replaces the built-in tag table when present.
    #[serde(default)]
    pub tag_rules: Option<Vec<TagRule>>,
    #[serde(default)]
    pub channel: ChannelConfig,
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Load configuration from a JSON file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.json").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_json_str(&data)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("Failed to parse JSON configuration")
    }

    /// Effective summarization cap.
    pub fn summary_limit(&self) -> usize {
        self.llm
            .as_ref()
            .and_then(|l| l.summary_limit)
            .unwrap_or(50)
    }
}

/// Resolve the config path: explicit path first, then `IS_CONFIG`, then `config.json`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
