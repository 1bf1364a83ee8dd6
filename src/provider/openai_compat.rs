// src/provider/openai_compat.rs — Generic OpenAI-compatible provider
//
// Speaks the `/chat/completions` dialect shared by OpenRouter, Together,
// Groq, local Ollama and friends. All three sources of an aggregation go
// through one instance; the model id travels in each request.

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::AggregatorError;

pub struct OpenAICompatProvider {
    id_str: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(id: impl Into<String>, api_key: String, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            id_str: id.into(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        for m in &request.messages {
            messages.push(serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        body
    }

    fn unavailable(&self, model: &str, message: impl Into<String>) -> AggregatorError {
        AggregatorError::SourceUnavailable {
            source_id: model.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AggregatorError> {
        let body = Self::request_body(&request);
        let model = request.model.as_str();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "User-Agent",
                format!("aggregator/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AggregatorError::SourceTimeout {
                        source_id: model.to_string(),
                        timeout_ms: 0,
                    }
                } else {
                    self.unavailable(model, e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.unavailable(model, format!("HTTP {status}: {error_body}")));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.unavailable(model, format!("Invalid response body: {e}")))?;

        // OpenRouter reports upstream failures inside a 200 response.
        if let Some(err) = resp.get("error") {
            let message = err["message"].as_str().unwrap_or("unknown upstream error");
            return Err(self.unavailable(model, message));
        }

        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| self.unavailable(model, "Response contained no message content"))?
            .to_string();

        let usage = TokenUsage {
            input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        tracing::debug!(
            provider = %self.id_str,
            model,
            tokens = usage.total(),
            "chat completion received"
        );

        Ok(ChatResponse { content, usage })
    }
}
