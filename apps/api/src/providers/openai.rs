//! OpenAI Chat Completions adapter using a strict JSON-schema response format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::questionnaire::Questionnaire;
use crate::providers::prompts::SCHEMA_DESCRIPTION;
use crate::providers::{decode_candidate, upstream_error, ProviderError, RecommendationProvider};
use crate::recommendation::prompts::{
    recommendation_schema, render_prompt, system_prompt, SCHEMA_NAME,
};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn response_format() -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": SCHEMA_NAME,
                "description": SCHEMA_DESCRIPTION,
                "strict": true,
                "schema": recommendation_schema()
            }
        })
    }
}

#[async_trait]
impl RecommendationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(&self, questionnaire: &Questionnaire) -> Result<Value, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured)?;

        let system = system_prompt();
        let prompt = render_prompt(questionnaire);
        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: Self::response_format(),
        };

        let response = self
            .client
            .post(format!("{}{CHAT_COMPLETIONS_PATH}", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("unexpected completion envelope: {e}")))?;

        if let Some(usage) = &completion.usage {
            debug!(
                "OpenAI call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(ProviderError::EmptyResponse)?;

        if let Some(refusal) = message.refusal {
            return Err(ProviderError::Decode(format!("model refused: {refusal}")));
        }

        let content = message.content.ok_or(ProviderError::EmptyResponse)?;
        decode_candidate(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questionnaire::tests::sample;
    use crate::models::questionnaire::{CareerGoal, EducationLevel, LearningPreference};
    use crate::recommendation::validator::tests::valid_candidate;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, api_key: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(
            Client::new(),
            ProviderConfig {
                api_key: api_key.map(str::to_string),
                base_url: base_url.to_string(),
                model: "gpt-test".to_string(),
            },
        )
    }

    fn questionnaire() -> Questionnaire {
        sample(
            EducationLevel::Bachelor,
            CareerGoal::Leadership,
            LearningPreference::FullTime,
        )
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 400, "completion_tokens": 300, "total_tokens": 700}
        })
    }

    #[tokio::test]
    async fn test_generate_returns_decoded_content() {
        let server = MockServer::start().await;
        let content = valid_candidate().to_string();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "response_format": {"type": "json_schema"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(&content)))
            .expect(1)
            .mount(&server)
            .await;

        let value = provider(&server.uri(), Some("sk-test"))
            .generate(&questionnaire())
            .await
            .unwrap();
        assert_eq!(value, valid_candidate());
    }

    #[tokio::test]
    async fn test_non_2xx_is_upstream_error_with_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": {"message": "Rate limit reached"}})),
            )
            .mount(&server)
            .await;

        let err = provider(&server.uri(), Some("sk-test"))
            .generate(&questionnaire())
            .await
            .unwrap_err();
        match err {
            ProviderError::Upstream { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prose_content_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion("I recommend an MBA.")),
            )
            .mount(&server)
            .await;

        let err = provider(&server.uri(), Some("sk-test"))
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_null_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri(), Some("sk-test"))
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let err = provider("http://127.0.0.1:1", Some("sk-test"))
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let p = provider("http://127.0.0.1:1", None);
        assert!(!p.is_configured());
        assert!(matches!(
            p.generate(&questionnaire()).await,
            Err(ProviderError::NotConfigured)
        ));
    }
}
