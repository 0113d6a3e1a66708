//! Anthropic adapter — Messages API with the recommendation schema passed as a forced tool.
//!
//! The tool's `input` is the structured candidate. If the model answers with a text block
//! instead, the text is decoded as JSON.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::questionnaire::Questionnaire;
use crate::providers::prompts::SCHEMA_DESCRIPTION;
use crate::providers::{decode_candidate, upstream_error, ProviderError, RecommendationProvider};
use crate::recommendation::prompts::{
    recommendation_schema, render_prompt, system_prompt, SCHEMA_NAME,
};

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Picks the forced tool's input, falling back to the first text block.
    fn into_candidate(self) -> Result<Value, ProviderError> {
        let mut text = None;
        for block in self.content {
            match (block.block_type.as_str(), block.input, block.text) {
                ("tool_use", Some(input), _) => {
                    return if input.is_object() {
                        Ok(input)
                    } else {
                        Err(ProviderError::Decode(
                            "tool input is not a JSON object".to_string(),
                        ))
                    };
                }
                ("text", _, Some(t)) if text.is_none() => text = Some(t),
                _ => {}
            }
        }

        match text {
            Some(t) => decode_candidate(&t),
            None => Err(ProviderError::EmptyResponse),
        }
    }
}

pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RecommendationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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
        let request_body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            system: &system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &prompt,
            }],
            tools: vec![Tool {
                name: SCHEMA_NAME,
                description: SCHEMA_DESCRIPTION,
                input_schema: recommendation_schema(),
            }],
            tool_choice: ToolChoice {
                choice_type: "tool",
                name: SCHEMA_NAME,
            },
        };

        let response = self
            .client
            .post(format!("{}{MESSAGES_PATH}", self.config.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let llm_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("unexpected messages envelope: {e}")))?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "Anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        llm_response.into_candidate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questionnaire::tests::sample;
    use crate::models::questionnaire::{CareerGoal, EducationLevel, LearningPreference};
    use crate::recommendation::validator::tests::valid_candidate;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> AnthropicProvider {
        AnthropicProvider::new(
            Client::new(),
            ProviderConfig {
                api_key: Some("sk-ant-test".to_string()),
                base_url: base_url.to_string(),
                model: "claude-test".to_string(),
            },
        )
    }

    fn questionnaire() -> Questionnaire {
        sample(
            EducationLevel::Master,
            CareerGoal::Research,
            LearningPreference::PartTime,
        )
    }

    #[tokio::test]
    async fn test_tool_use_input_is_the_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "model": "claude-test",
                "tool_choice": {"type": "tool", "name": "submit_recommendation"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "tool_use", "id": "toolu_1", "name": "submit_recommendation", "input": valid_candidate()}
                ],
                "usage": {"input_tokens": 500, "output_tokens": 250}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let value = provider(&server.uri())
            .generate(&questionnaire())
            .await
            .unwrap();
        assert_eq!(value, valid_candidate());
    }

    #[tokio::test]
    async fn test_text_block_fallback_is_decoded() {
        let server = MockServer::start().await;
        let fenced = format!("```json\n{}\n```", valid_candidate());
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": fenced}]
            })))
            .mount(&server)
            .await;

        let value = provider(&server.uri())
            .generate(&questionnaire())
            .await
            .unwrap();
        assert_eq!(value, valid_candidate());
    }

    #[tokio::test]
    async fn test_no_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Upstream { status: 529, ref message } if message == "Overloaded"
        ));
    }

    #[tokio::test]
    async fn test_garbage_envelope_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .generate(&questionnaire())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
