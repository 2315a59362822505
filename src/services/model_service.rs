use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

/// Raw completion plus whatever usage data the provider reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub model_id: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_usd_per_million: f64,
    pub output_usd_per_million: f64,
}

impl ModelPricing {
    pub fn estimate(&self, input_tokens: Option<u32>, output_tokens: Option<u32>) -> Option<f64> {
        let (input, output) = (input_tokens?, output_tokens?);
        Some(
            f64::from(input) * self.input_usd_per_million / 1_000_000.0
                + f64::from(output) * self.output_usd_per_million / 1_000_000.0,
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<CompletionResponse>;
}

pub struct OpenAiCompletionModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiCompletionModel {
    pub fn new(config: &Config) -> Self {
        let mut openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret());
        if let Some(base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(base);
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.openai_model.clone(),
            temperature: config.openai_temperature,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

/// Pulls content, model id and token usage out of a chat completion body.
pub fn parse_chat_completion(body: &Value, fallback_model: &str) -> AppResult<CompletionResponse> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::ExternalServiceError("Completion response has no message content".to_string())
        })?;

    let usage = body.get("usage");
    let token_count = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };

    Ok(CompletionResponse {
        content: content.to_string(),
        model_id: body
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(fallback_model)
            .to_string(),
        input_tokens: token_count("prompt_tokens"),
        output_tokens: token_count("completion_tokens"),
    })
}

#[async_trait]
impl CompletionModel for OpenAiCompletionModel {
    async fn complete(&self, prompt: &str) -> AppResult<CompletionResponse> {
        log::debug!(
            "Requesting completion from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let body: Value = self
            .client
            .chat()
            .create_byot(self.request_body(prompt))
            .await?;

        parse_chat_completion(&body, &self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_usage() {
        let body = json!({
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{ "message": { "role": "assistant", "content": "[{}]" } }],
            "usage": { "prompt_tokens": 1200, "completion_tokens": 300 }
        });

        let response = parse_chat_completion(&body, "gpt-4o-mini").expect("body should parse");
        assert_eq!(response.content, "[{}]");
        assert_eq!(response.model_id, "gpt-4o-mini-2024-07-18");
        assert_eq!(response.input_tokens, Some(1200));
        assert_eq!(response.output_tokens, Some(300));
    }

    #[test]
    fn missing_usage_and_model_are_optional() {
        let body = json!({ "choices": [{ "message": { "content": "" } }] });

        let response = parse_chat_completion(&body, "fallback").expect("body should parse");
        assert_eq!(response.content, "");
        assert_eq!(response.model_id, "fallback");
        assert_eq!(response.input_tokens, None);
    }

    #[test]
    fn missing_content_is_an_external_error() {
        let body = json!({ "choices": [] });
        assert!(matches!(
            parse_chat_completion(&body, "m"),
            Err(AppError::ExternalServiceError(_))
        ));
    }

    #[test]
    fn request_body_carries_model_and_prompt() {
        let model = OpenAiCompletionModel::new(&Config::test_config());
        let body = model.request_body("hello");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn pricing_needs_both_token_counts() {
        let pricing = ModelPricing {
            input_usd_per_million: 0.15,
            output_usd_per_million: 0.60,
        };
        let cost = pricing.estimate(Some(1_000_000), Some(500_000)).unwrap();
        assert!((cost - 0.45).abs() < 1e-9);
        assert_eq!(pricing.estimate(Some(10), None), None);
    }
}
