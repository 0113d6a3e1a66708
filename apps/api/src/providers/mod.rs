//! LLM providers — one adapter per remote model API, all behind `RecommendationProvider`.
//!
//! An adapter renders the questionnaire into a request, performs exactly one call, and
//! decodes the reply into a candidate JSON object. It does NOT check the candidate's shape:
//! that is `recommendation::validator`'s job. Transport and decode failures stay distinct
//! so the orchestrator can log them under different categories.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, ProviderKind};
use crate::models::questionnaire::Questionnaire;

pub mod anthropic;
pub mod openai;
pub mod prompts;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Provider returned empty content")]
    EmptyResponse,

    #[error("Could not decode provider output: {0}")]
    Decode(String),
}

/// Why a provider attempt was abandoned. Used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Transport,
    Decode,
    Validation,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Transport => "transport",
            FailureCategory::Decode => "decode",
            FailureCategory::Validation => "validation",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProviderError {
    pub fn category(&self) -> FailureCategory {
        match self {
            ProviderError::NotConfigured
            | ProviderError::Network(_)
            | ProviderError::Timeout { .. }
            | ProviderError::Upstream { .. } => FailureCategory::Transport,
            ProviderError::EmptyResponse | ProviderError::Decode(_) => FailureCategory::Decode,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Network(e.to_string())
    }
}

/// Uniform contract for every remote recommendation source.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Stable name used in logs and in `PROVIDER_ORDER`.
    fn name(&self) -> &str;

    /// False when credentials are missing. Unconfigured providers are skipped, not failed.
    fn is_configured(&self) -> bool;

    /// Performs one request and returns the decoded, not yet validated, candidate object.
    async fn generate(&self, questionnaire: &Questionnaire) -> Result<Value, ProviderError>;
}

/// Instantiates providers in the configured priority order.
pub fn build_providers(config: &Config, client: Client) -> Vec<Arc<dyn RecommendationProvider>> {
    config
        .provider_order
        .iter()
        .map(|kind| -> Arc<dyn RecommendationProvider> {
            match kind {
                ProviderKind::OpenAi => {
                    Arc::new(OpenAiProvider::new(client.clone(), config.openai.clone()))
                }
                ProviderKind::Anthropic => {
                    Arc::new(AnthropicProvider::new(client.clone(), config.anthropic.clone()))
                }
            }
        })
        .collect()
}

/// Decodes raw model text into a JSON object candidate.
pub fn decode_candidate(text: &str) -> Result<Value, ProviderError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if !value.is_object() {
        return Err(ProviderError::Decode(
            "expected a JSON object at the top level".to_string(),
        ));
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Builds an `Upstream` error from a non-2xx response, preferring the API's own `error.message`.
pub(crate) async fn upstream_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    ProviderError::Upstream { status, message }
}

/// Strips a leading ```json (or bare ```) fence and its closing fence, if present.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_from;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_decode_candidate_object() {
        let value = decode_candidate("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_decode_candidate_empty_is_empty_response() {
        assert!(matches!(
            decode_candidate("   "),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_decode_candidate_prose_is_decode_error() {
        let err = decode_candidate("Sure! Here is your recommendation.").unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
        assert_eq!(err.category(), FailureCategory::Decode);
    }

    #[test]
    fn test_decode_candidate_rejects_array() {
        assert!(matches!(
            decode_candidate("[1, 2, 3]"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn test_transport_categories() {
        let errors = [
            ProviderError::NotConfigured,
            ProviderError::Network("refused".to_string()),
            ProviderError::Timeout { secs: 20 },
            ProviderError::Upstream {
                status: 503,
                message: "overloaded".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.category(), FailureCategory::Transport, "{err}");
        }
        assert_eq!(
            ProviderError::EmptyResponse.category(),
            FailureCategory::Decode
        );
    }

    #[test]
    fn test_build_providers_follows_configured_order() {
        let config = config_from(&[("PROVIDER_ORDER", "anthropic,openai")]);
        let providers = build_providers(&config, Client::new());
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["anthropic", "openai"]);
        assert!(providers.iter().all(|p| !p.is_configured()));
    }
}
