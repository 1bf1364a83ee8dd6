// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// OpenAI-compatible endpoint shared by all three sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Environment variable holding the API key. `API_KEY` is tried as a fallback.
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".into(),
            api_key_env: "OPENROUTER_API_KEY".into(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key from the environment.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Model identifiers for the two primaries and the judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub first: String,
    pub second: String,
    pub judge: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            first: "meta-llama/llama-3.3-70b-instruct:free".into(),
            second: "google/gemma-3-27b-it:free".into(),
            judge: "mistralai/devstral-2512:free".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub primary_max_tokens: u32,
    pub judge_max_tokens: u32,
    pub timeout_seconds: u64,
    pub system_prompt: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary_max_tokens: 200,
            judge_max_tokens: 500,
            timeout_seconds: 120,
            system_prompt: "You are a useful assistant.".into(),
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Overrides the default database location under the data dir.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            default_limit: 10,
            max_limit: 1000,
        }
    }
}

impl HistoryConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(paths::db_path)
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history.default_limit == 0 || self.history.max_limit == 0 {
            anyhow::bail!("history limits must be positive");
        }
        if self.history.default_limit > self.history.max_limit {
            anyhow::bail!(
                "history.default_limit ({}) exceeds history.max_limit ({})",
                self.history.default_limit,
                self.history.max_limit
            );
        }
        if self.generation.timeout_seconds == 0 {
            anyhow::bail!("generation.timeout_seconds must be positive");
        }
        Ok(())
    }

    /// Model identifiers as advertised by the info endpoint.
    pub fn available_models(&self) -> Vec<String> {
        vec![
            self.sources.first.clone(),
            self.sources.second.clone(),
            format!("{} (judge)", self.sources.judge),
        ]
    }
}
