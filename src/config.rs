//! # Configuration Module
//!
//! Environment-driven settings for the bot, the API clients and the message
//! janitor. Missing required credentials are fatal at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "data/pulseforge.db";
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Retry policy for LLM calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between attempts in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 4000,
        }
    }
}

/// Settings for the natural-language query parser.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_LLM_API_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 300,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub sports_api_key: String,
    pub sports_api_timeout: Duration,
    /// `None` disables free-text search
    pub llm: Option<LlmConfig>,
    pub database_path: PathBuf,
    /// How long transient bot messages stay in the chat
    pub ephemeral_ttl: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let sports_api_key = get("API_SPORTS_KEY").ok_or(ConfigError::Missing("API_SPORTS_KEY"))?;

        let llm = match get("LLM_API_KEY") {
            Some(key) => {
                let mut llm = LlmConfig::new(key);
                if let Some(url) = get("LLM_API_URL") {
                    llm.api_url = url;
                }
                if let Some(model) = get("LLM_MODEL") {
                    llm.model = model;
                }
                llm.timeout = Duration::from_secs(parse_number(&get, "LLM_TIMEOUT_SECS", 30)?);
                let attempts = parse_number(&get, "LLM_MAX_ATTEMPTS", 3)?;
                llm.retry.max_attempts = u32::try_from(attempts)
                    .map_err(|_| ConfigError::Invalid {
                        name: "LLM_MAX_ATTEMPTS",
                        value: attempts.to_string(),
                    })?
                    .max(1);
                Some(llm)
            }
            None => None,
        };

        Ok(Self {
            telegram_token,
            sports_api_key,
            sports_api_timeout: Duration::from_secs(parse_number(&get, "SPORTS_API_TIMEOUT_SECS", 10)?),
            llm,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            ephemeral_ttl: Duration::from_secs(parse_number(&get, "EPHEMERAL_MESSAGE_TTL_SECS", 30)?),
        })
    }
}

fn parse_number<G>(get: &G, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
