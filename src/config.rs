//! Configuration management for Recroute
//!
//! Parses TOML configuration files and provides typed access to settings.
//! The backend routing table is part of configuration: one `[[backends]]`
//! entry per supported model identifier.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub backends: Vec<BackendConfig>,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

/// Fixed generation parameters sent with every model invocation
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f64 {
    0.7
}

/// Which wire protocol a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Managed-inference invoke API (Bedrock-style)
    Bedrock,
    /// Chat completions API (OpenAI-style)
    Openai,
}

/// One routing-table entry: an inbound model identifier bound to a backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Model identifier as it appears in inbound requests (e.g. "GPT-4o")
    pub model_id: String,
    pub kind: BackendKind,
    /// Backend-native model key (e.g. "meta.llama3-8b-instruct-v1:0")
    pub model_key: String,
    pub base_url: String,
    /// Environment variable checked for the API key before the defaults
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Fallback API key file, used when the key env vars are unset
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants not expressible in serde
    pub fn validate(&self) -> AppResult<()> {
        if self.backends.is_empty() {
            return Err(AppError::Config(
                "at least one [[backends]] entry is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for backend in &self.backends {
            if backend.model_id.trim().is_empty() {
                return Err(AppError::Config(
                    "backend model_id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(backend.model_id.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate backend model_id: {}",
                    backend.model_id
                )));
            }
            if !backend.base_url.starts_with("http://") && !backend.base_url.starts_with("https://")
            {
                return Err(AppError::Config(format!(
                    "backend {} base_url must start with http:// or https://, got: {}",
                    backend.model_id, backend.base_url
                )));
            }
            if backend.base_url.ends_with('/') {
                return Err(AppError::Config(format!(
                    "backend {} base_url must not end with a trailing slash: {}",
                    backend.model_id, backend.base_url
                )));
            }
        }

        if self.generation.max_tokens == 0 {
            return Err(AppError::Config(
                "generation.max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature)
            || self.generation.temperature.is_nan()
        {
            return Err(AppError::Config(format!(
                "generation.temperature must be between 0.0 and 2.0, got: {}",
                self.generation.temperature
            )));
        }

        Ok(())
    }

    /// Inbound model identifiers in configuration order
    pub fn model_ids(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.model_id.clone()).collect()
    }
}
