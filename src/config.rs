//! Settings loaded from an optional config file and the environment.
//!
//! Config file: `<config_dir>/fcc-manuals/config.toml`. A value set in the
//! file wins over the matching environment variable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fcc::DEFAULT_USER_AGENT;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const SERPAPI_API_KEY_ENV: &str = "SERPAPI_API_KEY";
pub const MODEL_ENV: &str = "FCC_MANUALS_MODEL";
pub const EMBEDDING_MODEL_ENV: &str = "FCC_MANUALS_EMBEDDING_MODEL";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk config file layout. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    openai_api_key: Option<String>,
    serpapi_api_key: Option<String>,
    model: Option<String>,
    embedding_model: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    openai_base_url: Option<String>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
    pub model: String,
    pub embedding_model: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Alternate OpenAI-compatible endpoint
    pub openai_base_url: Option<String>,
}

impl Settings {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fcc-manuals")
            .join("config.toml")
    }

    /// Load settings from the default config file (if present) and env vars.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path(), |key| env::var(key).ok())
    }

    /// Load settings from `path` with a custom environment lookup.
    pub fn load_from<F>(path: &Path, env_lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            FileConfig::default()
        };

        let pick = |from_file: Option<String>, key: &str| {
            non_empty(from_file).or_else(|| non_empty(env_lookup(key)))
        };

        Ok(Self {
            openai_api_key: pick(file.openai_api_key, OPENAI_API_KEY_ENV),
            serpapi_api_key: pick(file.serpapi_api_key, SERPAPI_API_KEY_ENV),
            model: pick(file.model, MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_model: pick(file.embedding_model, EMBEDDING_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            user_agent: non_empty(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            openai_base_url: non_empty(file.openai_base_url),
        })
    }

    /// The OpenAI key, or an error explaining where to set it.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().with_context(|| {
            format!(
                "No OpenAI API key configured. Set {} or add openai_api_key to {}",
                OPENAI_API_KEY_ENV,
                Self::default_path().display()
            )
        })
    }

    /// The SerpAPI key, or an error explaining where to set it.
    pub fn require_serpapi_key(&self) -> Result<&str> {
        self.serpapi_api_key.as_deref().with_context(|| {
            format!(
                "No SerpAPI key configured. Set {} or add serpapi_api_key to {}",
                SERPAPI_API_KEY_ENV,
                Self::default_path().display()
            )
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
