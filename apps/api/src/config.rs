use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-5";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_PROVIDER_ORDER: &str = "openai,anthropic";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;
const MAX_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// Remote LLM providers the service knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => bail!("Unknown provider '{other}' in PROVIDER_ORDER (expected openai, anthropic)"),
        }
    }
}

/// Credentials and endpoint for one provider. `api_key: None` means the provider is skipped.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres storage when set, in-memory otherwise.
    pub database_url: Option<String>,
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    /// Fixed priority order for the fallback chain.
    pub provider_order: Vec<ProviderKind>,
    pub provider_timeout: Duration,
    /// Pins the synthesizer's random source when set.
    pub synthesizer_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider_order = var("PROVIDER_ORDER")
            .unwrap_or_else(|| DEFAULT_PROVIDER_ORDER.to_string())
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(ProviderKind::from_str)
            .collect::<Result<Vec<_>>>()?;
        for (i, kind) in provider_order.iter().enumerate() {
            if provider_order[..i].contains(kind) {
                bail!("Provider {kind:?} listed more than once in PROVIDER_ORDER");
            }
        }

        let timeout_secs = match var("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("PROVIDER_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };
        if timeout_secs == 0 || timeout_secs > MAX_PROVIDER_TIMEOUT_SECS {
            bail!("PROVIDER_TIMEOUT_SECS must be between 1 and {MAX_PROVIDER_TIMEOUT_SECS}");
        }

        let synthesizer_seed = var("SYNTHESIZER_SEED")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .context("SYNTHESIZER_SEED must be an unsigned integer")?;

        Ok(Config {
            database_url: var("DATABASE_URL"),
            openai: ProviderConfig {
                api_key: var("OPENAI_API_KEY").or_else(|| var("OPENAI_KEY")),
                base_url: base_url(var("OPENAI_BASE_URL"), DEFAULT_OPENAI_BASE_URL),
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            },
            anthropic: ProviderConfig {
                api_key: var("ANTHROPIC_API_KEY"),
                base_url: base_url(var("ANTHROPIC_BASE_URL"), DEFAULT_ANTHROPIC_BASE_URL),
                model: var("ANTHROPIC_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            },
            provider_order,
            provider_timeout: Duration::from_secs(timeout_secs),
            synthesizer_seed,
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .trim_end_matches('/')
        .to_string()
}
